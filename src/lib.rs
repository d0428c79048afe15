#![deny(warnings)]
#![deny(clippy::all, clippy::perf, clippy::suspicious)]

//! Front end of a C-like macro preprocessor: a character-classification
//! tokenizer and a hideset-based macro expansion engine, exposed as a pull
//! API yielding fully expanded, directive-free tokens.

pub mod diagnostics;
pub mod expand;
pub mod hideset;
pub mod lexer;
pub mod literals;
pub mod logging;
pub mod source;
pub mod token;

pub use diagnostics::{Diagnostic, DiagnosticSink, Severity, SourceLocation};
pub use expand::{ExpandOptions, Expander, Macro, MacroTable, preprocess};
pub use hideset::HideSet;
pub use lexer::{LexOptions, Lexer, lex};
pub use token::{EncodingPrefix, Punct, Token, TokenKind};
