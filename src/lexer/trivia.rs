use super::state::Lexer;
use crate::diagnostics::SourceLocation;
use crate::token::{Token, TokenKind};

impl Lexer {
    /// Coalesce a run of horizontal whitespace into one `Space` token; the
    /// run length rides in `leading_space`. The opening character has already
    /// been consumed.
    pub(super) fn scan_space(&mut self, location: SourceLocation) -> Token {
        let mut count = 1;
        while matches!(self.reader.peek(), Some(' ' | '\t' | '\x0B' | '\x0C')) {
            self.reader.get();
            count += 1;
        }
        let mut token = Token::new(TokenKind::Space, "", location);
        token.leading_space = count;
        token
    }

    /// `//` comment, running to (but not consuming) the end of the line.
    pub(super) fn scan_line_comment(&mut self, location: SourceLocation) -> Token {
        self.reader.get();
        let mut text = String::from("//");
        while let Some(ch) = self.reader.peek() {
            if ch == '\n' {
                break;
            }
            self.reader.get();
            text.push(ch);
        }
        self.comment_token(text, location)
    }

    /// `/* ... */` comment. Hitting end of input before `*/` reports the
    /// error and still yields the comment token.
    pub(super) fn scan_block_comment(&mut self, location: SourceLocation) -> Token {
        self.reader.get();
        let mut text = String::from("/*");
        let mut terminated = false;
        let mut last = '\0';
        while let Some(ch) = self.reader.get() {
            text.push(ch);
            if last == '*' && ch == '/' {
                terminated = true;
                break;
            }
            last = ch;
        }
        if !terminated {
            self.diagnostics.error(&location, "unterminated block comment");
        }
        self.comment_token(text, location)
    }

    fn comment_token(&self, text: String, location: SourceLocation) -> Token {
        let text = if self.options.retain_comment_text {
            text
        } else {
            String::new()
        };
        Token::new(TokenKind::Comment, text, location)
    }
}
