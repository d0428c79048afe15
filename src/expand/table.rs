use std::collections::HashMap;

use crate::token::{EncodingPrefix, Token, TokenKind};

/// Reserved name the anonymous variadic parameter binds to.
pub const VA_ARGS: &str = "__VA_ARGS__";

/// State handed to native macro handlers.
pub struct NativeContext<'a> {
    pub counter: &'a mut usize,
}

/// Handler for a native macro; rewrites the invoking token in place.
pub type NativeHandler = fn(&mut NativeContext<'_>, &mut Token);

/// A registered macro definition.
///
/// Bodies and parameter lists are deep copies made at definition time; they
/// never alias the tokens of the defining directive.
#[derive(Clone, Debug)]
pub enum Macro {
    Object {
        body: Vec<Token>,
    },
    Function {
        params: Vec<Token>,
        body: Vec<Token>,
        variadic: bool,
    },
    Native(NativeHandler),
}

/// Name → definition table. Redefinition replaces unconditionally; the old
/// entry is returned so the caller can warn.
#[derive(Debug, Default)]
pub struct MacroTable {
    macros: HashMap<String, Macro>,
}

impl MacroTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        table.define("__LINE__", Macro::Native(native_line));
        table.define("__FILE__", Macro::Native(native_file));
        table.define("__COUNTER__", Macro::Native(native_counter));
        table
    }

    pub fn define(&mut self, name: impl Into<String>, definition: Macro) -> Option<Macro> {
        self.macros.insert(name.into(), definition)
    }

    pub fn undefine(&mut self, name: &str) -> bool {
        self.macros.remove(name).is_some()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Macro> {
        self.macros.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.macros.contains_key(name)
    }
}

fn native_line(_context: &mut NativeContext<'_>, token: &mut Token) {
    token.kind = TokenKind::Number;
    token.text = token.location.line.to_string();
}

fn native_file(_context: &mut NativeContext<'_>, token: &mut Token) {
    token.kind = TokenKind::Str(EncodingPrefix::None);
    token.text = token.location.file.to_string();
}

fn native_counter(context: &mut NativeContext<'_>, token: &mut Token) {
    token.kind = TokenKind::Number;
    token.text = context.counter.to_string();
    *context.counter += 1;
}
