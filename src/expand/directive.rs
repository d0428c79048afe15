//! Directive parsing: `#define`, `#undef`, and recovery for everything else.

use crate::token::{Punct, Token, TokenKind};

use super::diagnostics::{macro_redefined, unsupported_directive};
use super::engine::Expander;
use super::table::{Macro, VA_ARGS};

impl Expander {
    /// Handle one directive line; the introducing `#` has already been
    /// consumed. Malformed directives are discarded whole, so recovery is
    /// always "skip to the end of the line".
    pub(super) fn directive(&mut self) {
        let line = self.read_directive_line();
        let Some(keyword) = line.first() else {
            // A bare `#` on its own line is a null directive.
            return;
        };
        if !keyword.is_ident() {
            self.diagnostics
                .error(&keyword.location, "invalid preprocessor directive");
            return;
        }
        match keyword.text.as_str() {
            "define" => self.define_directive(keyword, &line[1..]),
            "undef" => self.undef_directive(keyword, &line[1..]),
            other => {
                self.diagnostics.push(unsupported_directive(other, keyword));
            }
        }
    }

    /// Collect the remaining tokens of the current directive line. The first
    /// token of the following line is pushed back untouched.
    fn read_directive_line(&mut self) -> Vec<Token> {
        let mut line = Vec::new();
        loop {
            let token = self.read_token();
            if token.is_eof() {
                break;
            }
            if token.at_line_start {
                self.pending.push(token);
                break;
            }
            line.push(token);
        }
        line
    }

    fn define_directive(&mut self, keyword: &Token, rest: &[Token]) {
        let Some(name) = rest.first() else {
            self.diagnostics
                .error(&keyword.location, "macro name missing in `#define`");
            return;
        };
        if !name.is_ident() {
            self.diagnostics
                .error(&name.location, "macro name must be an identifier");
            return;
        }

        // Function-like only when `(` hugs the macro name.
        let function_like = rest
            .get(1)
            .is_some_and(|token| token.is_punct(Punct::LParen) && token.leading_space == 0);

        let definition = if function_like {
            let Some((params, variadic, consumed)) = self.parse_macro_params(name, &rest[2..])
            else {
                return;
            };
            let body = &rest[2 + consumed..];
            if !self.check_body(name, body) {
                return;
            }
            Macro::Function {
                params,
                body: body.to_vec(),
                variadic,
            }
        } else {
            let body = &rest[1..];
            if !self.check_body(name, body) {
                return;
            }
            Macro::Object { body: body.to_vec() }
        };

        tracing::debug!(target: "expand", name = %name.text, "macro defined");
        if self.table.define(name.text.clone(), definition).is_some() {
            self.diagnostics.push(macro_redefined(&name.text, name));
        }
    }

    /// Parse a parameter list starting just after the opening parenthesis.
    /// Returns the parameters, the variadic flag, and how many directive
    /// tokens were consumed (closing parenthesis included).
    fn parse_macro_params(
        &mut self,
        name: &Token,
        tokens: &[Token],
    ) -> Option<(Vec<Token>, bool, usize)> {
        let mut params: Vec<Token> = Vec::new();
        let mut variadic = false;
        let mut expect_name = true;
        let mut index = 0;
        loop {
            let Some(token) = tokens.get(index) else {
                self.diagnostics.error(
                    &name.location,
                    format!("missing `)` in parameter list of macro `{}`", name.text),
                );
                return None;
            };
            index += 1;
            match token.kind {
                TokenKind::Punct(Punct::RParen) => {
                    if expect_name && !params.is_empty() {
                        self.diagnostics
                            .error(&token.location, "expected parameter name before `)`");
                        return None;
                    }
                    break;
                }
                TokenKind::Punct(Punct::Comma) => {
                    if expect_name {
                        self.diagnostics
                            .error(&token.location, "expected parameter name before `,`");
                        return None;
                    }
                    if variadic {
                        self.diagnostics
                            .error(&token.location, "`...` must be the last parameter");
                        return None;
                    }
                    expect_name = true;
                }
                TokenKind::Ident => {
                    if !expect_name {
                        self.diagnostics.error(
                            &token.location,
                            "expected `,` between macro parameter names",
                        );
                        return None;
                    }
                    if params.iter().any(|param| param.text == token.text) {
                        self.diagnostics.error(
                            &token.location,
                            format!("duplicate macro parameter `{}`", token.text),
                        );
                        return None;
                    }
                    let mut param = token.clone();
                    // `name...` attaches the variadic capture to this
                    // parameter instead of the reserved name.
                    if tokens
                        .get(index)
                        .is_some_and(|next| next.is_punct(Punct::Ellipsis))
                    {
                        index += 1;
                        param.variadic_param = true;
                        variadic = true;
                    }
                    params.push(param);
                    expect_name = false;
                }
                TokenKind::Punct(Punct::Ellipsis) => {
                    if variadic {
                        self.diagnostics
                            .error(&token.location, "`...` must be the last parameter");
                        return None;
                    }
                    let mut param = Token::ident(VA_ARGS, token.location.clone());
                    param.variadic_param = true;
                    variadic = true;
                    params.push(param);
                    expect_name = false;
                }
                _ => {
                    self.diagnostics.error(
                        &token.location,
                        format!(
                            "unexpected `{}` in macro parameter list",
                            token.spelling()
                        ),
                    );
                    return None;
                }
            }
        }
        Some((params, variadic, index))
    }

    /// A replacement list may not begin or end with `##`.
    fn check_body(&mut self, name: &Token, body: &[Token]) -> bool {
        let boundary = body
            .first()
            .filter(|token| token.is_punct(Punct::HashHash))
            .or_else(|| body.last().filter(|token| token.is_punct(Punct::HashHash)));
        if let Some(token) = boundary {
            self.diagnostics.error(
                &token.location,
                format!(
                    "`##` cannot appear at either end of the body of macro `{}`",
                    name.text
                ),
            );
            return false;
        }
        true
    }

    fn undef_directive(&mut self, keyword: &Token, rest: &[Token]) {
        let Some(name) = rest.first() else {
            self.diagnostics
                .error(&keyword.location, "macro name missing in `#undef`");
            return;
        };
        if !name.is_ident() {
            self.diagnostics
                .error(&name.location, "macro name must be an identifier");
            return;
        }
        self.table.undefine(&name.text);
        if let Some(extra) = rest.get(1) {
            self.diagnostics
                .warning(&extra.location, "extra tokens after `#undef` directive");
        }
    }
}
