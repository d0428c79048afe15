//! Escape decoding shared by string/character literals and identifier
//! universal-character-names.

mod escape;

pub use escape::{LiteralError, LiteralErrorKind, decode_escape, decode_text, decode_ucn};
