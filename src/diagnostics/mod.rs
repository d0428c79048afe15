//! Shared diagnostics model for the preprocessor front end.

mod formatter;

use blake3::Hasher;
pub use formatter::{ColorMode, ErrorFormat, FormatOptions, format_diagnostics};
use serde::Serialize;
use std::fmt;
use std::rc::Rc;

/// Position in a source stream, captured when a token scan starts.
///
/// Carries a snapshot of the surrounding source line so diagnostics can be
/// rendered without re-reading the input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
    pub file: Rc<str>,
    pub line_text: Rc<str>,
}

impl SourceLocation {
    #[must_use]
    pub fn new(line: usize, column: usize, file: Rc<str>, line_text: Rc<str>) -> Self {
        Self {
            line,
            column,
            file,
            line_text,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
    Help,
}

impl Severity {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Help => "help",
        }
    }

    #[must_use]
    pub fn is_error(self) -> bool {
        matches!(self, Severity::Error)
    }
}

/// Structured identifier for diagnostics.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagnosticCode {
    pub code: String,
    pub category: Option<String>,
}

impl DiagnosticCode {
    #[must_use]
    pub fn new(code: impl Into<String>, category: Option<String>) -> Self {
        Self {
            code: code.into(),
            category,
        }
    }
}

/// Diagnostic entry with an optional source location and follow-up notes.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: Option<DiagnosticCode>,
    pub message: String,
    pub location: Option<SourceLocation>,
    pub notes: Vec<String>,
}

impl Diagnostic {
    #[must_use]
    pub fn error(message: impl Into<String>, location: Option<SourceLocation>) -> Self {
        Self::new(Severity::Error, message, location)
    }

    #[must_use]
    pub fn warning(message: impl Into<String>, location: Option<SourceLocation>) -> Self {
        Self::new(Severity::Warning, message, location)
    }

    #[must_use]
    pub fn note(message: impl Into<String>, location: Option<SourceLocation>) -> Self {
        Self::new(Severity::Note, message, location)
    }

    #[must_use]
    pub fn with_code(mut self, code: DiagnosticCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn add_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    #[must_use]
    fn new(
        severity: Severity,
        message: impl Into<String>,
        location: Option<SourceLocation>,
    ) -> Self {
        Self {
            severity,
            code: None,
            message: message.into(),
            location,
            notes: Vec::new(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self
            .code
            .as_ref()
            .map(|c| c.code.as_str())
            .unwrap_or("UNKNOWN");
        write!(f, "{}[{code}]: {}", self.severity.as_str(), self.message)
    }
}

/// Collection helper used to accumulate diagnostics while scanning and
/// expanding.
///
/// The sink owns the error-count limit: once the number of errors reaches the
/// configured limit, the collected diagnostics are rendered once and the
/// process terminates. Call sites never branch on the outcome of a report.
#[derive(Debug)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    namespace: String,
    error_limit: Option<usize>,
    errors_seen: usize,
}

impl DiagnosticSink {
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            diagnostics: Vec::new(),
            namespace: namespace.into(),
            error_limit: None,
            errors_seen: 0,
        }
    }

    #[must_use]
    pub fn with_error_limit(mut self, limit: Option<usize>) -> Self {
        self.error_limit = limit;
        self
    }

    pub fn error(&mut self, location: &SourceLocation, message: impl Into<String>) {
        self.push(Diagnostic::error(message, Some(location.clone())));
    }

    pub fn warning(&mut self, location: &SourceLocation, message: impl Into<String>) {
        self.push(Diagnostic::warning(message, Some(location.clone())));
    }

    pub fn push(&mut self, mut diagnostic: Diagnostic) {
        if diagnostic.code.is_none() {
            diagnostic.code = Some(self.auto_code(&diagnostic));
        }
        if diagnostic.severity.is_error() {
            self.errors_seen += 1;
        }
        self.diagnostics.push(diagnostic);
        self.enforce_limit();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors_seen
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Move the collected diagnostics out, leaving the sink reusable.
    pub fn drain(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn enforce_limit(&mut self) {
        let Some(limit) = self.error_limit else {
            return;
        };
        if limit == 0 || self.errors_seen < limit {
            return;
        }
        let options = FormatOptions {
            format: ErrorFormat::Human,
            color: ColorMode::Never,
            is_terminal: false,
        };
        eprintln!("{}", format_diagnostics(&self.diagnostics, options));
        eprintln!("error: too many errors emitted, stopping now (limit: {limit})");
        std::process::exit(1);
    }

    fn auto_code(&self, diagnostic: &Diagnostic) -> DiagnosticCode {
        let mut hasher = Hasher::new();
        hasher.update(self.namespace.as_bytes());
        hasher.update(diagnostic.message.as_bytes());
        if let Some(location) = diagnostic.location.as_ref() {
            hasher.update(&location.line.to_le_bytes());
            hasher.update(&location.column.to_le_bytes());
        }
        let hash = hasher.finalize();
        let raw = u32::from_le_bytes(hash.as_bytes()[..4].try_into().unwrap_or([0, 0, 0, 0]));
        let suffix = raw % 100_000;
        let code = format!("{}{:05}", self.namespace.to_ascii_uppercase(), suffix);
        DiagnosticCode::new(code, Some(self.namespace.clone()))
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new("gen")
    }
}
