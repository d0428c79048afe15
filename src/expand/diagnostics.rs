use crate::diagnostics::Diagnostic;
use crate::token::Token;

pub(super) fn unterminated_invocation(name: &str, at: &Token) -> Diagnostic {
    Diagnostic::error(
        format!("unterminated argument list invoking macro `{name}`"),
        Some(at.location.clone()),
    )
}

pub(super) fn invalid_paste(text: &str, at: &Token) -> Diagnostic {
    Diagnostic::error(
        format!("pasting forms `{text}`, an invalid preprocessing token"),
        Some(at.location.clone()),
    )
}

pub(super) fn macro_redefined(name: &str, at: &Token) -> Diagnostic {
    Diagnostic::warning(
        format!("macro `{name}` redefined"),
        Some(at.location.clone()),
    )
}

pub(super) fn unsupported_directive(name: &str, at: &Token) -> Diagnostic {
    Diagnostic::error(
        format!("unsupported preprocessor directive `#{name}`"),
        Some(at.location.clone()),
    )
}
