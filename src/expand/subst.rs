//! Parameter substitution: raw argument splicing plus the `#` and `##`
//! operators.

use crate::diagnostics::DiagnosticSink;
use crate::lexer::{LexOptions, Lexer};
use crate::token::{EncodingPrefix, Punct, Token, TokenKind};

use super::diagnostics::invalid_paste;

/// Captured, unexpanded arguments for one invocation, in parameter order.
/// Scoped to a single expansion step and discarded after substitution.
pub(super) struct Args {
    entries: Vec<(String, Vec<Token>)>,
}

impl Args {
    pub(super) fn new(entries: Vec<(String, Vec<Token>)>) -> Self {
        Self { entries }
    }

    fn lookup(&self, token: &Token) -> Option<&[Token]> {
        if !token.is_ident() {
            return None;
        }
        self.entries
            .iter()
            .find(|(name, _)| *name == token.text)
            .map(|(_, captured)| captured.as_slice())
    }
}

/// Walk the macro body left to right, producing the replacement sequence.
///
/// Parameters always substitute their raw captures; rescanning for nested
/// expansion happens only when the caller pushes the whole result back
/// through the expander. Returns `None` when the substitution is abandoned
/// (the diagnostic has already been reported).
pub(super) fn substitute(
    body: &[Token],
    args: &Args,
    sink: &mut DiagnosticSink,
) -> Option<Vec<Token>> {
    let mut out: Vec<Token> = Vec::new();
    let mut index = 0;
    while index < body.len() {
        let token = &body[index];

        // `#` followed by a parameter stringizes the raw capture.
        if token.is_punct(Punct::Hash) {
            let Some(captured) = body.get(index + 1).and_then(|next| args.lookup(next)) else {
                sink.error(
                    &token.location,
                    "`#` is not followed by a macro parameter",
                );
                return None;
            };
            out.push(stringize(token, captured));
            index += 2;
            continue;
        }

        // `##` glues the previous output token with the right operand.
        if token.is_punct(Punct::HashHash) {
            let (Some(rhs), Some(lhs)) = (body.get(index + 1), out.pop()) else {
                sink.error(
                    &token.location,
                    "`##` cannot appear at either end of a macro body",
                );
                return None;
            };
            if let Some(captured) = args.lookup(rhs) {
                match captured.split_first() {
                    // An empty argument contributes nothing; the glue is a
                    // no-op and the left token is kept unchanged.
                    None => out.push(lhs),
                    Some((first, rest)) => {
                        out.push(paste(&lhs, &first.spelling(), sink)?);
                        out.extend(rest.iter().cloned());
                    }
                }
            } else {
                out.push(paste(&lhs, &rhs.spelling(), sink)?);
            }
            index += 2;
            continue;
        }

        if let Some(captured) = args.lookup(token) {
            // A parameter with an empty capture on the left of `##` leaves no
            // stray token: the operator is skipped and the right operand
            // substitutes on its own.
            let next_is_paste = body
                .get(index + 1)
                .is_some_and(|next| next.is_punct(Punct::HashHash));
            if next_is_paste && captured.is_empty() {
                let Some(rhs) = body.get(index + 2) else {
                    sink.error(
                        &token.location,
                        "`##` cannot appear at either end of a macro body",
                    );
                    return None;
                };
                if let Some(rhs_captured) = args.lookup(rhs) {
                    out.extend(splice(rhs_captured, rhs.leading_space));
                } else {
                    out.push(rhs.clone());
                }
                index += 3;
                continue;
            }
            out.extend(splice(captured, token.leading_space));
            index += 1;
            continue;
        }

        out.push(token.clone());
        index += 1;
    }
    Some(out)
}

/// Freshly duplicate a captured argument, moving the parameter reference's
/// spacing onto the first inserted token.
fn splice(captured: &[Token], leading_space: usize) -> Vec<Token> {
    let mut tokens: Vec<Token> = captured.to_vec();
    if let Some(first) = tokens.first_mut() {
        first.leading_space = leading_space;
        first.at_line_start = false;
    }
    tokens
}

/// Concatenate the canonical spellings of a captured argument into a single
/// string token, inserting literal spaces per each token's recorded count.
fn stringize(hash: &Token, captured: &[Token]) -> Token {
    let mut text = String::new();
    for (index, token) in captured.iter().enumerate() {
        if index > 0 {
            for _ in 0..token.leading_space {
                text.push(' ');
            }
        }
        text.push_str(&token.spelling());
    }
    let mut token = Token::new(
        TokenKind::Str(EncodingPrefix::None),
        text,
        hash.location.clone(),
    );
    token.leading_space = hash.leading_space;
    token
}

/// Glue two spellings and re-tokenize the result. The concatenation must
/// form exactly one token; anything else is reported and the substitution
/// abandoned rather than silently split.
fn paste(lhs: &Token, rhs_spelling: &str, sink: &mut DiagnosticSink) -> Option<Token> {
    let text = format!("{}{}", lhs.spelling(), rhs_spelling);
    let mut lexer = Lexer::new(
        &text,
        &lhs.location.file,
        LexOptions {
            retain_comment_text: true,
        },
    );
    let mut glued = lexer.scan();
    let rest = lexer.scan();
    let clean = lexer.finish().is_empty();
    let single = rest.is_eof() && !glued.is_eof();
    let token_like = !matches!(glued.kind, TokenKind::Space | TokenKind::Comment);
    if !(clean && single && token_like) {
        sink.push(invalid_paste(&text, lhs));
        return None;
    }
    glued.location = lhs.location.clone();
    glued.hideset = lhs.hideset.clone();
    glued.leading_space = lhs.leading_space;
    glued.at_line_start = lhs.at_line_start;
    Some(glued)
}
