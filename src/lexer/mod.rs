//! Character-level scanner producing preprocessing tokens.

mod state;
mod trivia;

pub use state::Lexer;

use crate::diagnostics::Diagnostic;
use crate::token::Token;

/// Scanner configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct LexOptions {
    /// Keep comment text on `Comment` tokens instead of dropping it.
    pub retain_comment_text: bool,
}

/// Scan an entire source string, returning every token up to and including
/// the end-of-input token.
#[must_use]
pub fn lex(source: &str, file: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut lexer = Lexer::new(source, file, LexOptions::default());
    let mut tokens = Vec::new();
    loop {
        let token = lexer.scan();
        let done = token.is_eof();
        tokens.push(token);
        if done {
            break;
        }
    }
    (tokens, lexer.finish())
}
