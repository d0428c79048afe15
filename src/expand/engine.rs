//! The macro expansion loop.

use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::lexer::{LexOptions, Lexer};
use crate::token::{Punct, Token, TokenKind};

use super::diagnostics::unterminated_invocation;
use super::subst::{Args, substitute};
use super::table::{Macro, MacroTable, NativeContext};

/// Expansion engine configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExpandOptions {
    pub lex: LexOptions,
    /// Error-count limit enforced by the diagnostic sinks; `None` is
    /// unlimited.
    pub error_limit: Option<usize>,
}

/// Pull-based macro expander over one source buffer.
///
/// Tokens come from the pushback buffer first, then the scanner; expansion
/// results are pushed back so they are rescanned ahead of the remaining
/// input. Driving everything from one loop bounds stack depth regardless of
/// how long an expansion chain runs.
pub struct Expander {
    lexer: Lexer,
    pub(super) table: MacroTable,
    pub(super) pending: Vec<Token>,
    pub(super) diagnostics: DiagnosticSink,
    at_line_start: bool,
    space_run: usize,
    counter: usize,
}

enum Expansion {
    /// Replacement tokens were pushed back; pull again.
    Rescan,
    /// Not an invocation (or a native result); emit as-is.
    Done(Token),
}

impl Expander {
    #[must_use]
    pub fn new(source: &str, file: &str) -> Self {
        Self::with_options(source, file, ExpandOptions::default())
    }

    #[must_use]
    pub fn with_options(source: &str, file: &str, options: ExpandOptions) -> Self {
        let mut lexer = Lexer::new(source, file, options.lex);
        lexer.diagnostics = DiagnosticSink::new("lex").with_error_limit(options.error_limit);
        Self {
            lexer,
            table: MacroTable::with_builtins(),
            pending: Vec::new(),
            diagnostics: DiagnosticSink::new("macro").with_error_limit(options.error_limit),
            at_line_start: true,
            space_run: 0,
            counter: 0,
        }
    }

    /// Direct access to the macro table, for predefining macros.
    pub fn table_mut(&mut self) -> &mut MacroTable {
        &mut self.table
    }

    /// Pull the next fully expanded, directive-free token. Yields `Eof`
    /// forever once the input is exhausted.
    pub fn next_token(&mut self) -> Token {
        loop {
            let token = self.read_token();
            match token.kind {
                TokenKind::Eof => return token,
                TokenKind::Punct(Punct::Hash)
                    if token.at_line_start && token.hideset.is_empty() =>
                {
                    self.directive();
                }
                TokenKind::Ident => match self.expand_ident(token) {
                    Expansion::Rescan => {}
                    Expansion::Done(token) => return token,
                },
                _ => return token,
            }
        }
    }

    /// Drain every diagnostic collected so far, scanner reports first.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        let mut all = self.lexer.diagnostics.drain();
        all.extend(self.diagnostics.drain());
        all
    }

    /// Raw pull: pushback buffer first, else the scanner, folding whitespace,
    /// newlines and comments into the next substantive token's spacing.
    pub(super) fn read_token(&mut self) -> Token {
        if let Some(token) = self.pending.pop() {
            return token;
        }
        loop {
            let mut token = self.lexer.scan();
            match token.kind {
                TokenKind::Space => self.space_run += token.leading_space,
                TokenKind::Comment => self.space_run += 1,
                TokenKind::Newline => {
                    self.at_line_start = true;
                    self.space_run = 0;
                }
                _ => {
                    token.leading_space = self.space_run;
                    token.at_line_start = self.at_line_start;
                    self.space_run = 0;
                    self.at_line_start = false;
                    return token;
                }
            }
        }
    }

    /// Push replacement tokens so the first is pulled next.
    fn push_pending(&mut self, tokens: Vec<Token>) {
        self.pending.extend(tokens.into_iter().rev());
    }

    fn expand_ident(&mut self, token: Token) -> Expansion {
        if token.hideset.contains(&token.text) {
            return Expansion::Done(token);
        }
        let Some(definition) = self.table.get(&token.text).cloned() else {
            return Expansion::Done(token);
        };
        match definition {
            Macro::Object { body } => {
                self.expand_object(&token, body);
                Expansion::Rescan
            }
            Macro::Function {
                params,
                body,
                variadic,
            } => self.expand_function(token, &params, &body, variadic),
            Macro::Native(handler) => {
                let mut token = token;
                let mut context = NativeContext {
                    counter: &mut self.counter,
                };
                handler(&mut context, &mut token);
                Expansion::Done(token)
            }
        }
    }

    /// Object-like: stamp the copied body with `hideset ∪ {name}` and push it
    /// back for rescanning.
    fn expand_object(&mut self, token: &Token, body: Vec<Token>) {
        let hideset = token.hideset.insert(&token.text);
        let mut copies = body;
        for copy in &mut copies {
            copy.hideset = copy.hideset.union(&hideset);
        }
        if let Some(first) = copies.first_mut() {
            first.leading_space = token.leading_space;
            first.at_line_start = token.at_line_start;
        }
        tracing::trace!(
            target: "expand",
            name = %token.text,
            kind = "object",
            tokens = copies.len(),
            "macro expanded"
        );
        self.push_pending(copies);
    }

    /// Function-like: only an invocation when `(` follows; the new hideset is
    /// `(T.hideset ∩ rparen.hideset) ∪ {T}` so invocations produced by prior
    /// expansions stay correctly suppressed.
    fn expand_function(
        &mut self,
        token: Token,
        params: &[Token],
        body: &[Token],
        variadic: bool,
    ) -> Expansion {
        let next = self.read_token();
        if !next.is_punct(Punct::LParen) {
            self.pending.push(next);
            return Expansion::Done(token);
        }
        let Some((args, rparen)) = self.capture_args(&token, params, variadic) else {
            return Expansion::Done(token);
        };
        let hideset = token
            .hideset
            .intersect(&rparen.hideset)
            .insert(&token.text);
        let Some(mut replacement) = substitute(body, &args, &mut self.diagnostics) else {
            return Expansion::Done(token);
        };
        for item in &mut replacement {
            item.hideset = item.hideset.union(&hideset);
        }
        if let Some(first) = replacement.first_mut() {
            first.leading_space = token.leading_space;
            first.at_line_start = token.at_line_start;
        }
        tracing::trace!(
            target: "expand",
            name = %token.text,
            kind = "function",
            tokens = replacement.len(),
            "macro expanded"
        );
        self.push_pending(replacement);
        Expansion::Rescan
    }

    /// Capture the parenthesized argument list, unexpanded. Top-level commas
    /// separate arguments, commas nested in parentheses do not, and a
    /// variadic final parameter absorbs every remaining top-level comma.
    fn capture_args(
        &mut self,
        name: &Token,
        params: &[Token],
        variadic: bool,
    ) -> Option<(Args, Token)> {
        let mut collected: Vec<Vec<Token>> = Vec::new();
        let mut current: Vec<Token> = Vec::new();
        let mut depth = 0usize;
        let rparen = loop {
            let token = self.read_token();
            match token.kind {
                TokenKind::Eof => {
                    self.diagnostics
                        .push(unterminated_invocation(&name.text, name));
                    return None;
                }
                TokenKind::Punct(Punct::LParen) => {
                    depth += 1;
                    current.push(flatten(token));
                }
                TokenKind::Punct(Punct::RParen) => {
                    if depth == 0 {
                        break token;
                    }
                    depth -= 1;
                    current.push(flatten(token));
                }
                TokenKind::Punct(Punct::Comma)
                    if depth == 0 && (!variadic || collected.len() + 1 < params.len()) =>
                {
                    collected.push(std::mem::take(&mut current));
                }
                _ => current.push(flatten(token)),
            }
        };
        collected.push(current);

        // Bind declared parameters only; missing arguments capture nothing
        // and surplus arguments are dropped with the consumed list.
        let entries = params
            .iter()
            .enumerate()
            .map(|(index, param)| {
                let captured = collected.get(index).cloned().unwrap_or_default();
                (param.text.clone(), captured)
            })
            .collect();
        Some((Args::new(entries), rparen))
    }
}

/// Arguments may span lines; a line break inside an argument list behaves as
/// ordinary spacing afterwards.
fn flatten(mut token: Token) -> Token {
    if token.at_line_start {
        token.at_line_start = false;
        token.leading_space = token.leading_space.max(1);
    }
    token
}
