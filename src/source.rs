//! In-memory character source with line/column tracking and one-step pushback.

use std::rc::Rc;

use crate::diagnostics::SourceLocation;

/// Character-level view of one source buffer.
///
/// `get`/`peek`/`unget` drive the lexer; `unget` restores exactly the
/// characters consumed, so one-step lookahead (and the multi-character
/// literal-prefix probe) can always be undone.
#[derive(Debug)]
pub struct SourceBuffer {
    chars: Vec<char>,
    pos: usize,
    file: Rc<str>,
    line_starts: Vec<usize>,
    line_cache: Vec<Option<Rc<str>>>,
}

impl SourceBuffer {
    #[must_use]
    pub fn new(source: &str, file: &str) -> Self {
        let chars: Vec<char> = source.chars().collect();
        let line_starts = compute_line_starts(&chars);
        let line_cache = vec![None; line_starts.len()];
        Self {
            chars,
            pos: 0,
            file: Rc::from(file),
            line_starts,
            line_cache,
        }
    }

    /// Consume and return the next character, or `None` at end of input.
    pub fn get(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    #[must_use]
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Push the most recently consumed character back onto the stream.
    pub fn unget(&mut self, ch: char) {
        debug_assert!(
            self.pos > 0 && self.chars[self.pos - 1] == ch,
            "unget of a character that was not just read"
        );
        let _ = ch;
        self.pos -= 1;
    }

    /// 1-based line number of the next character to be read.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line_index() + 1
    }

    /// 1-based column number of the next character to be read.
    #[must_use]
    pub fn column(&self) -> usize {
        self.pos - self.line_starts[self.line_index()] + 1
    }

    #[must_use]
    pub fn filename(&self) -> Rc<str> {
        Rc::clone(&self.file)
    }

    /// Snapshot of the full text of the current line, without its newline.
    pub fn current_line_text(&mut self) -> Rc<str> {
        let index = self.line_index();
        if let Some(cached) = self.line_cache[index].as_ref() {
            return Rc::clone(cached);
        }
        let start = self.line_starts[index];
        let end = self
            .line_starts
            .get(index + 1)
            .copied()
            .unwrap_or(self.chars.len());
        let mut text: String = self.chars[start..end].iter().collect();
        if text.ends_with('\n') {
            text.pop();
        }
        let text: Rc<str> = Rc::from(text.as_str());
        self.line_cache[index] = Some(Rc::clone(&text));
        text
    }

    /// Stamp a location for a token whose scan starts at the current position.
    pub fn location(&mut self) -> SourceLocation {
        let line = self.line();
        let column = self.column();
        let file = self.filename();
        let line_text = self.current_line_text();
        SourceLocation::new(line, column, file, line_text)
    }

    fn line_index(&self) -> usize {
        match self.line_starts.binary_search(&self.pos) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        }
    }
}

fn compute_line_starts(chars: &[char]) -> Vec<usize> {
    let mut starts = vec![0];
    for (index, ch) in chars.iter().enumerate() {
        if *ch == '\n' {
            starts.push(index + 1);
        }
    }
    starts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_line_and_column_across_newlines() {
        let mut reader = SourceBuffer::new("ab\ncd", "t.c");
        assert_eq!((reader.line(), reader.column()), (1, 1));
        assert_eq!(reader.get(), Some('a'));
        assert_eq!(reader.get(), Some('b'));
        assert_eq!((reader.line(), reader.column()), (1, 3));
        assert_eq!(reader.get(), Some('\n'));
        assert_eq!((reader.line(), reader.column()), (2, 1));
        assert_eq!(reader.get(), Some('c'));
        assert_eq!((reader.line(), reader.column()), (2, 2));
    }

    #[test]
    fn unget_restores_position_across_lines() {
        let mut reader = SourceBuffer::new("a\nb", "t.c");
        reader.get();
        let newline = reader.get().unwrap_or(' ');
        assert_eq!(newline, '\n');
        reader.unget(newline);
        assert_eq!((reader.line(), reader.column()), (1, 2));
        assert_eq!(reader.get(), Some('\n'));
    }

    #[test]
    fn line_snapshot_excludes_newline() {
        let mut reader = SourceBuffer::new("int x;\nnext", "t.c");
        assert_eq!(&*reader.current_line_text(), "int x;");
        for _ in 0..7 {
            reader.get();
        }
        assert_eq!(&*reader.current_line_text(), "next");
    }

    #[test]
    fn exhausted_reader_keeps_returning_none() {
        let mut reader = SourceBuffer::new("x", "t.c");
        assert_eq!(reader.get(), Some('x'));
        assert_eq!(reader.get(), None);
        assert_eq!(reader.get(), None);
        assert_eq!(reader.peek(), None);
    }
}
