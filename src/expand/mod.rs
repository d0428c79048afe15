//! Macro table, directive parsing, and the expansion engine.

mod diagnostics;
mod directive;
mod engine;
mod subst;
mod table;

#[cfg(test)]
mod tests;

pub use engine::{ExpandOptions, Expander};
pub use table::{Macro, MacroTable, NativeContext, NativeHandler, VA_ARGS};

use crate::diagnostics::Diagnostic;
use crate::token::Token;

/// Expand an entire source buffer, returning the substantive token stream
/// (end-of-input token excluded) and the collected diagnostics.
#[must_use]
pub fn preprocess(source: &str, file: &str) -> (Vec<Token>, Vec<Diagnostic>) {
    let mut expander = Expander::new(source, file);
    let mut tokens = Vec::new();
    loop {
        let token = expander.next_token();
        if token.is_eof() {
            break;
        }
        tokens.push(token);
    }
    (tokens, expander.take_diagnostics())
}
