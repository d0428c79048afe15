use serde::Serialize;

use super::{Diagnostic, Severity, SourceLocation};

pub const JSON_SCHEMA_VERSION: &str = "1.0.0";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorFormat {
    Human,
    Json,
    Short,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatOptions {
    pub format: ErrorFormat,
    pub color: ColorMode,
    pub is_terminal: bool,
}

impl FormatOptions {
    #[must_use]
    pub fn use_color(self) -> bool {
        match self.color {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => self.is_terminal,
        }
    }
}

/// Render a collection of diagnostics to a single string.
#[must_use]
pub fn format_diagnostics(diagnostics: &[Diagnostic], options: FormatOptions) -> String {
    let mut rendered = String::new();
    let use_color = options.use_color();
    for (index, diagnostic) in diagnostics.iter().enumerate() {
        if index > 0 {
            rendered.push('\n');
        }
        let chunk = match options.format {
            ErrorFormat::Human => render_human(diagnostic, use_color),
            ErrorFormat::Short => render_short(diagnostic),
            ErrorFormat::Json => render_json(diagnostic),
        };
        rendered.push_str(&chunk);
    }
    rendered
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "\x1b[31m",
        Severity::Warning => "\x1b[33m",
        Severity::Note | Severity::Help => "\x1b[36m",
    }
}

fn format_header(diagnostic: &Diagnostic, color: bool) -> String {
    let code = diagnostic
        .code
        .as_ref()
        .map(|c| c.code.as_str())
        .unwrap_or("UNKNOWN");
    if color {
        format!(
            "{}{}[{code}]\x1b[0m: {}",
            severity_color(diagnostic.severity),
            diagnostic.severity.as_str(),
            diagnostic.message
        )
    } else {
        format!(
            "{}[{code}]: {}",
            diagnostic.severity.as_str(),
            diagnostic.message
        )
    }
}

fn render_snippet(location: &SourceLocation) -> String {
    let line_text = location.line_text.trim_end_matches('\n');
    let width = location.line.to_string().len().max(3);
    let caret_pad = " ".repeat(location.column.saturating_sub(1));
    format!(
        "{:>width$} |\n{:>width$} | {}\n{:>width$} | {}^",
        "",
        location.line,
        line_text,
        "",
        caret_pad,
        width = width
    )
}

fn render_human(diagnostic: &Diagnostic, color: bool) -> String {
    let mut out = String::new();
    out.push_str(&format_header(diagnostic, color));
    if let Some(location) = diagnostic.location.as_ref() {
        out.push_str(&format!("\n  --> {location}\n"));
        out.push_str(&render_snippet(location));
    }
    for note in &diagnostic.notes {
        out.push_str(&format!("\nnote: {note}"));
    }
    out
}

fn render_short(diagnostic: &Diagnostic) -> String {
    let severity = diagnostic.severity.as_str();
    let code = diagnostic
        .code
        .as_ref()
        .map(|c| c.code.as_str())
        .unwrap_or("UNKNOWN");
    let position = diagnostic
        .location
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "<unknown>:?:?".to_string());
    let mut out = format!("{position}: {severity}[{code}]: {}", diagnostic.message);
    if !diagnostic.notes.is_empty() {
        out.push_str(&format!(" (notes: {})", diagnostic.notes.len()));
    }
    out
}

#[derive(Serialize)]
struct JsonLocation<'a> {
    file: &'a str,
    line: usize,
    column: usize,
    line_text: &'a str,
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    schema: &'static str,
    severity: &'static str,
    code: Option<&'a str>,
    message: &'a str,
    location: Option<JsonLocation<'a>>,
    notes: &'a [String],
}

fn render_json(diagnostic: &Diagnostic) -> String {
    let entry = JsonDiagnostic {
        schema: JSON_SCHEMA_VERSION,
        severity: diagnostic.severity.as_str(),
        code: diagnostic.code.as_ref().map(|c| c.code.as_str()),
        message: &diagnostic.message,
        location: diagnostic.location.as_ref().map(|loc| JsonLocation {
            file: &loc.file,
            line: loc.line,
            column: loc.column,
            line_text: &loc.line_text,
        }),
        notes: &diagnostic.notes,
    };
    serde_json::to_string(&entry).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn sample() -> Diagnostic {
        Diagnostic::error(
            "unterminated string literal",
            Some(SourceLocation::new(
                2,
                5,
                Rc::from("demo.c"),
                Rc::from("x = \"abc"),
            )),
        )
    }

    #[test]
    fn human_format_includes_snippet_and_caret() {
        let rendered = format_diagnostics(
            &[sample()],
            FormatOptions {
                format: ErrorFormat::Human,
                color: ColorMode::Never,
                is_terminal: false,
            },
        );
        assert!(rendered.contains("--> demo.c:2:5"));
        assert!(rendered.contains("x = \"abc"));
        assert!(rendered.contains('^'), "caret missing: {rendered}");
    }

    #[test]
    fn short_format_is_one_line() {
        let rendered = format_diagnostics(
            &[sample()],
            FormatOptions {
                format: ErrorFormat::Short,
                color: ColorMode::Never,
                is_terminal: false,
            },
        );
        assert_eq!(rendered.lines().count(), 1);
        assert!(rendered.starts_with("demo.c:2:5: error"));
    }

    #[test]
    fn json_format_carries_location_fields() {
        let rendered = format_diagnostics(
            &[sample()],
            FormatOptions {
                format: ErrorFormat::Json,
                color: ColorMode::Never,
                is_terminal: false,
            },
        );
        assert!(rendered.contains("\"file\":\"demo.c\""));
        assert!(rendered.contains("\"line\":2"));
    }
}
