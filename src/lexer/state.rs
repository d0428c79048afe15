use crate::diagnostics::{Diagnostic, DiagnosticSink, SourceLocation};
use crate::literals;
use crate::source::SourceBuffer;
use crate::token::{EncodingPrefix, Punct, Token, TokenKind};

use super::LexOptions;

/// Character-classification state machine producing one token per call.
pub struct Lexer {
    pub(super) reader: SourceBuffer,
    pub(super) options: LexOptions,
    pub(crate) diagnostics: DiagnosticSink,
}

impl Lexer {
    #[must_use]
    pub fn new(source: &str, file: &str, options: LexOptions) -> Self {
        Self {
            reader: SourceBuffer::new(source, file),
            options,
            diagnostics: DiagnosticSink::new("lex"),
        }
    }

    #[must_use]
    pub fn finish(self) -> Vec<Diagnostic> {
        self.diagnostics.into_vec()
    }

    /// Scan one preprocessing token; yields `Eof` forever once exhausted.
    pub fn scan(&mut self) -> Token {
        let location = self.reader.location();
        let Some(ch) = self.reader.get() else {
            return Token::eof(location);
        };
        match ch {
            ' ' | '\t' | '\x0B' | '\x0C' => self.scan_space(location),
            '\n' => Token::new(TokenKind::Newline, "", location),
            '\r' => {
                if self.reader.peek() == Some('\n') {
                    self.reader.get();
                }
                Token::new(TokenKind::Newline, "", location)
            }
            '/' => match self.reader.peek() {
                Some('/') => self.scan_line_comment(location),
                Some('*') => self.scan_block_comment(location),
                Some('=') => {
                    self.reader.get();
                    Token::punct(Punct::SlashAssign, location)
                }
                _ => Token::punct(Punct::Slash, location),
            },
            '0'..='9' => self.scan_number(ch, location),
            '"' => self.scan_string(EncodingPrefix::None, location),
            '\'' => self.scan_char(EncodingPrefix::None, location),
            'u' | 'U' | 'L' => self.scan_prefix_or_ident(ch, location),
            '\\' => match self.reader.peek() {
                Some(marker @ ('u' | 'U')) => {
                    self.reader.get();
                    let mut text = String::new();
                    self.scan_ucn_into(marker, &mut text, &location);
                    self.scan_ident_tail(text, location)
                }
                _ => unclassifiable(ch, &location),
            },
            ch if is_ident_start(ch) => {
                let mut text = String::new();
                text.push(ch);
                self.scan_ident_tail(text, location)
            }
            ch => self.scan_punct(ch, location),
        }
    }

    fn scan_ident_tail(&mut self, mut text: String, location: SourceLocation) -> Token {
        loop {
            match self.reader.peek() {
                Some(ch) if is_ident_continue(ch) => {
                    self.reader.get();
                    text.push(ch);
                }
                Some('\\') => {
                    self.reader.get();
                    match self.reader.peek() {
                        Some(marker @ ('u' | 'U')) => {
                            self.reader.get();
                            self.scan_ucn_into(marker, &mut text, &location);
                        }
                        _ => {
                            self.reader.unget('\\');
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
        Token::new(TokenKind::Ident, text, location)
    }

    /// Decode the digits of an inline `\uXXXX`/`\UXXXXXXXX` escape and append
    /// the character as UTF-8.
    fn scan_ucn_into(&mut self, marker: char, text: &mut String, location: &SourceLocation) {
        let width = if marker == 'u' { 4 } else { 8 };
        let mut digits = String::with_capacity(width);
        while digits.len() < width {
            match self.reader.peek() {
                Some(ch) if ch.is_ascii_hexdigit() => {
                    self.reader.get();
                    digits.push(ch);
                }
                _ => break,
            }
        }
        match literals::decode_ucn(&digits, width) {
            Ok(decoded) => text.push(decoded),
            Err(kind) => self.diagnostics.error(location, kind.to_string()),
        }
    }

    /// Greedy preprocessing number: any alphanumeric/underscore/dot run, with
    /// a sign allowed immediately after an exponent marker. Radix and suffix
    /// validation belongs to a later stage.
    fn scan_number(&mut self, first: char, location: SourceLocation) -> Token {
        let mut text = String::new();
        text.push(first);
        loop {
            match self.reader.peek() {
                Some(ch) if ch.is_ascii_alphanumeric() || ch == '_' || ch == '.' => {
                    self.reader.get();
                    text.push(ch);
                }
                Some(sign @ ('+' | '-'))
                    if matches!(text.chars().last(), Some('e' | 'E' | 'p' | 'P')) =>
                {
                    self.reader.get();
                    text.push(sign);
                }
                _ => break,
            }
        }
        Token::new(TokenKind::Number, text, location)
    }

    /// `u`, `U` or `L` begins a literal only when a quote follows; the probe
    /// characters are pushed back when it does not.
    fn scan_prefix_or_ident(&mut self, first: char, location: SourceLocation) -> Token {
        let prefix = match first {
            'u' => EncodingPrefix::Char16,
            'U' => EncodingPrefix::Char32,
            _ => EncodingPrefix::Wide,
        };
        match self.reader.peek() {
            Some('"') => {
                self.reader.get();
                self.scan_string(prefix, location)
            }
            Some('\'') => {
                self.reader.get();
                self.scan_char(prefix, location)
            }
            Some('8') if first == 'u' => {
                self.reader.get();
                match self.reader.peek() {
                    Some('"') => {
                        self.reader.get();
                        self.scan_string(EncodingPrefix::Utf8, location)
                    }
                    Some('\'') => {
                        self.reader.get();
                        self.scan_char(EncodingPrefix::Utf8, location)
                    }
                    _ => {
                        self.reader.unget('8');
                        let mut text = String::new();
                        text.push(first);
                        self.scan_ident_tail(text, location)
                    }
                }
            }
            _ => {
                let mut text = String::new();
                text.push(first);
                self.scan_ident_tail(text, location)
            }
        }
    }

    fn scan_string(&mut self, prefix: EncodingPrefix, location: SourceLocation) -> Token {
        let raw = self.scan_quoted('"', &location, "unterminated string literal");
        let (decoded, errors) = literals::decode_text(&raw);
        self.report_literal_errors(&location, errors);
        Token::new(TokenKind::Str(prefix), decoded, location)
    }

    fn scan_char(&mut self, prefix: EncodingPrefix, location: SourceLocation) -> Token {
        let raw = self.scan_quoted('\'', &location, "unterminated character literal");
        let (decoded, errors) = literals::decode_text(&raw);
        self.report_literal_errors(&location, errors);
        Token::new(TokenKind::Char(prefix), decoded, location)
    }

    /// Collect raw literal content up to the closing delimiter. A newline or
    /// end of input before the delimiter reports the error and returns what
    /// was read; the newline is left for the next scan.
    fn scan_quoted(&mut self, delim: char, location: &SourceLocation, message: &str) -> String {
        let mut raw = String::new();
        let mut terminated = false;
        loop {
            match self.reader.get() {
                None => break,
                Some('\n') => {
                    self.reader.unget('\n');
                    break;
                }
                Some(ch) if ch == delim => {
                    terminated = true;
                    break;
                }
                Some('\\') => {
                    raw.push('\\');
                    match self.reader.get() {
                        None => break,
                        Some('\n') => {
                            self.reader.unget('\n');
                            break;
                        }
                        Some(next) => raw.push(next),
                    }
                }
                Some(ch) => raw.push(ch),
            }
        }
        if !terminated {
            self.diagnostics.error(location, message);
        }
        raw
    }

    fn report_literal_errors(
        &mut self,
        location: &SourceLocation,
        errors: Vec<literals::LiteralError>,
    ) {
        for error in errors {
            self.diagnostics.error(location, error.kind.to_string());
        }
    }

    /// Punctuators, built by greedy longest-match with explicit pushback on
    /// partial matches.
    fn scan_punct(&mut self, first: char, location: SourceLocation) -> Token {
        let punct = match first {
            '(' => Punct::LParen,
            ')' => Punct::RParen,
            '[' => Punct::LBracket,
            ']' => Punct::RBracket,
            '{' => Punct::LBrace,
            '}' => Punct::RBrace,
            ',' => Punct::Comma,
            ';' => Punct::Semi,
            '?' => Punct::Question,
            '~' => Punct::Tilde,
            '#' => match self.reader.peek() {
                Some('#') => {
                    self.reader.get();
                    Punct::HashHash
                }
                _ => Punct::Hash,
            },
            ':' => match self.reader.peek() {
                Some('>') => {
                    self.reader.get();
                    Punct::RBracket
                }
                _ => Punct::Colon,
            },
            '.' => match self.reader.peek() {
                Some('0'..='9') => {
                    return self.scan_number('.', location);
                }
                Some('.') => {
                    self.reader.get();
                    match self.reader.peek() {
                        Some('.') => {
                            self.reader.get();
                            Punct::Ellipsis
                        }
                        _ => {
                            self.reader.unget('.');
                            Punct::Dot
                        }
                    }
                }
                _ => Punct::Dot,
            },
            '+' => match self.reader.peek() {
                Some('+') => {
                    self.reader.get();
                    Punct::Inc
                }
                Some('=') => {
                    self.reader.get();
                    Punct::PlusAssign
                }
                _ => Punct::Plus,
            },
            '-' => match self.reader.peek() {
                Some('-') => {
                    self.reader.get();
                    Punct::Dec
                }
                Some('=') => {
                    self.reader.get();
                    Punct::MinusAssign
                }
                Some('>') => {
                    self.reader.get();
                    Punct::Arrow
                }
                _ => Punct::Minus,
            },
            '*' => match self.reader.peek() {
                Some('=') => {
                    self.reader.get();
                    Punct::StarAssign
                }
                _ => Punct::Star,
            },
            '%' => match self.reader.peek() {
                Some('=') => {
                    self.reader.get();
                    Punct::PercentAssign
                }
                Some('>') => {
                    self.reader.get();
                    Punct::RBrace
                }
                Some(':') => {
                    self.reader.get();
                    match self.reader.peek() {
                        Some('%') => {
                            self.reader.get();
                            match self.reader.peek() {
                                Some(':') => {
                                    self.reader.get();
                                    Punct::HashHash
                                }
                                _ => {
                                    self.reader.unget('%');
                                    Punct::Hash
                                }
                            }
                        }
                        _ => Punct::Hash,
                    }
                }
                _ => Punct::Percent,
            },
            '&' => match self.reader.peek() {
                Some('&') => {
                    self.reader.get();
                    Punct::LogAnd
                }
                Some('=') => {
                    self.reader.get();
                    Punct::AmpAssign
                }
                _ => Punct::Amp,
            },
            '|' => match self.reader.peek() {
                Some('|') => {
                    self.reader.get();
                    Punct::LogOr
                }
                Some('=') => {
                    self.reader.get();
                    Punct::PipeAssign
                }
                _ => Punct::Pipe,
            },
            '^' => match self.reader.peek() {
                Some('=') => {
                    self.reader.get();
                    Punct::CaretAssign
                }
                _ => Punct::Caret,
            },
            '!' => match self.reader.peek() {
                Some('=') => {
                    self.reader.get();
                    Punct::NotEq
                }
                _ => Punct::Bang,
            },
            '=' => match self.reader.peek() {
                Some('=') => {
                    self.reader.get();
                    Punct::Eq
                }
                _ => Punct::Assign,
            },
            '<' => match self.reader.peek() {
                Some('=') => {
                    self.reader.get();
                    Punct::Le
                }
                Some('<') => {
                    self.reader.get();
                    match self.reader.peek() {
                        Some('=') => {
                            self.reader.get();
                            Punct::ShlAssign
                        }
                        _ => Punct::Shl,
                    }
                }
                Some(':') => {
                    self.reader.get();
                    Punct::LBracket
                }
                Some('%') => {
                    self.reader.get();
                    Punct::LBrace
                }
                _ => Punct::Lt,
            },
            '>' => match self.reader.peek() {
                Some('=') => {
                    self.reader.get();
                    Punct::Ge
                }
                Some('>') => {
                    self.reader.get();
                    match self.reader.peek() {
                        Some('=') => {
                            self.reader.get();
                            Punct::ShrAssign
                        }
                        _ => Punct::Shr,
                    }
                }
                _ => Punct::Gt,
            },
            ch => return unclassifiable(ch, &location),
        };
        Token::punct(punct, location)
    }
}

/// Every byte a source can contain is claimed by some token class above;
/// reaching this is a scanner defect, not a recoverable input error.
fn unclassifiable(ch: char, location: &SourceLocation) -> Token {
    unreachable!("character `{ch}` at {location} does not begin any token class")
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || ch == '$' || !ch.is_ascii()
}

fn is_ident_continue(ch: char) -> bool {
    is_ident_start(ch) || ch.is_ascii_digit()
}
