//! Byte-level and line-level cursors over the source buffer.
//!
//! [`Scanner`] is the character cursor the inline parser runs on: single-byte
//! lookahead, tab-aware column tracking and save/restore backtracking.
//! [`LineScanner`] decomposes the source into logical lines up front for the
//! block parser, with one-line lookahead for the table delimiter-row check.

/// Saved cursor position for backtracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannerState {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

/// Byte-oriented cursor with tab-aware line/column tracking.
#[derive(Debug)]
pub struct Scanner<'a> {
    src: &'a [u8],
    offset: usize,
    line: usize,
    column: usize,
    tab_width: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(src: &'a str, tab_width: usize) -> Self {
        Self {
            src: src.as_bytes(),
            offset: 0,
            line: 1,
            column: 1,
            tab_width: tab_width.max(1),
        }
    }

    pub fn eof(&self) -> bool {
        self.offset >= self.src.len()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Unconsumed remainder as a str. The cursor only ever stops on ASCII
    /// boundaries the callers dispatch on, so the slice stays valid UTF-8.
    pub fn rest(&self) -> &'a str {
        std::str::from_utf8(&self.src[self.offset..]).unwrap_or("")
    }

    pub fn peek(&self) -> Option<u8> {
        self.src.get(self.offset).copied()
    }

    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.src.get(self.offset + n).copied()
    }

    /// The next `n` bytes without consuming, or `None` near end of input.
    pub fn peek_slice(&self, n: usize) -> Option<&'a [u8]> {
        self.src.get(self.offset..self.offset + n)
    }

    /// Consumes one byte. Tabs advance the column to the next tab stop;
    /// newlines increment the line and reset the column.
    pub fn advance(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.offset += 1;
        match b {
            b'\n' => {
                self.line += 1;
                self.column = 1;
            }
            b'\t' => {
                let w = self.tab_width;
                self.column = ((self.column - 1) / w + 1) * w + 1;
            }
            _ => self.column += 1,
        }
        Some(b)
    }

    /// Consumes a run of spaces and tabs, returning the visual width
    /// consumed.
    pub fn skip_spaces(&mut self) -> usize {
        let before = self.column;
        while matches!(self.peek(), Some(b' ') | Some(b'\t')) {
            self.advance();
        }
        self.column - before
    }

    /// Accepts `\n`, `\r` or `\r\n` as one logical newline.
    pub fn consume_newline(&mut self) -> bool {
        match self.peek() {
            Some(b'\n') => {
                self.advance();
                true
            }
            Some(b'\r') => {
                self.offset += 1;
                if self.peek() == Some(b'\n') {
                    self.offset += 1;
                }
                self.line += 1;
                self.column = 1;
                true
            }
            _ => false,
        }
    }

    pub fn matches(&self, literal: &str) -> bool {
        self.src[self.offset..].starts_with(literal.as_bytes())
    }

    pub fn matches_ignore_case(&self, literal: &str) -> bool {
        let lit = literal.as_bytes();
        match self.src.get(self.offset..self.offset + lit.len()) {
            Some(ahead) => ahead.eq_ignore_ascii_case(lit),
            None => false,
        }
    }

    /// Consumes `literal` if it is next in the input.
    pub fn consume(&mut self, literal: &str) -> bool {
        if !self.matches(literal) {
            return false;
        }
        for _ in 0..literal.len() {
            self.advance();
        }
        true
    }

    /// Length of the run of `c` at the cursor, without consuming.
    pub fn count_char(&self, c: u8) -> usize {
        self.src[self.offset..]
            .iter()
            .take_while(|&&b| b == c)
            .count()
    }

    pub fn save_state(&self) -> ScannerState {
        ScannerState {
            offset: self.offset,
            line: self.line,
            column: self.column,
        }
    }

    pub fn restore_state(&mut self, state: ScannerState) {
        self.offset = state.offset;
        self.line = state.line;
        self.column = state.column;
    }
}

/// One logical line of the source.
#[derive(Debug, Clone, Copy)]
pub struct Line<'a> {
    /// Line content without the trailing newline.
    pub text: &'a str,
    /// Byte offset of the line start in the full source.
    pub start_offset: usize,
    /// 1-based line number.
    pub number: usize,
    /// Tab-expanded width of the leading whitespace.
    pub indent: usize,
    pub blank: bool,
}

/// Up-front decomposition of the source into logical lines.
#[derive(Debug)]
pub struct LineScanner<'a> {
    lines: Vec<Line<'a>>,
    next: usize,
}

impl<'a> LineScanner<'a> {
    pub fn new(src: &'a str, tab_width: usize) -> Self {
        let tab_width = tab_width.max(1);
        let mut lines = Vec::new();
        let mut start = 0;
        let mut number = 1;

        for segment in src.split_inclusive('\n') {
            let text = segment.trim_end_matches(['\n', '\r']);
            lines.push(Self::make_line(text, start, number, tab_width));
            start += segment.len();
            number += 1;
        }
        // split_inclusive drops a trailing empty segment only when the
        // source ends with a newline, which is what we want: "a\n" is one
        // line, "a\nb" is two.

        Self { lines, next: 0 }
    }

    fn make_line(text: &'a str, start_offset: usize, number: usize, tab_width: usize) -> Line<'a> {
        let mut indent = 0;
        for b in text.bytes() {
            match b {
                b' ' => indent += 1,
                b'\t' => indent = (indent / tab_width + 1) * tab_width,
                _ => break,
            }
        }
        Line {
            text,
            start_offset,
            number,
            indent,
            blank: text.trim().is_empty(),
        }
    }

    /// Consumes and returns the next line.
    pub fn next_line(&mut self) -> Option<Line<'a>> {
        let line = self.lines.get(self.next).copied()?;
        self.next += 1;
        Some(line)
    }

    /// The next unconsumed line, without consuming it.
    pub fn peek_line(&self) -> Option<Line<'a>> {
        self.lines.get(self.next).copied()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_peek_does_not_consume() {
        let s = Scanner::new("ab", 4);
        assert_eq!(s.peek(), Some(b'a'));
        assert_eq!(s.peek_at(1), Some(b'b'));
        assert_eq!(s.peek_at(2), None);
        assert_eq!(s.offset(), 0);
    }

    #[test]
    fn test_peek_slice_at_end_of_input() {
        let s = Scanner::new("ab", 4);
        assert_eq!(s.peek_slice(2), Some(&b"ab"[..]));
        assert_eq!(s.peek_slice(3), None);
    }

    #[test]
    fn test_advance_tracks_lines_and_columns() {
        let mut s = Scanner::new("a\nb", 4);
        s.advance();
        assert_eq!((s.line(), s.column()), (1, 2));
        s.advance(); // \n
        assert_eq!((s.line(), s.column()), (2, 1));
        s.advance();
        assert_eq!((s.line(), s.column()), (2, 2));
    }

    #[test]
    fn test_tab_advances_to_next_tab_stop() {
        let mut s = Scanner::new("a\tb", 4);
        s.advance(); // 'a' -> column 2
        s.advance(); // tab -> column 5
        assert_eq!(s.column(), 5);
        s.advance();
        assert_eq!(s.column(), 6);
    }

    #[test]
    fn test_skip_spaces_returns_visual_width() {
        let mut s = Scanner::new("\t  x", 4);
        assert_eq!(s.skip_spaces(), 6);
        assert_eq!(s.peek(), Some(b'x'));
    }

    #[test]
    fn test_consume_newline_accepts_all_forms() {
        for (input, rest) in [("\nx", Some(b'x')), ("\r\nx", Some(b'x')), ("\rx", Some(b'x'))] {
            let mut s = Scanner::new(input, 4);
            assert!(s.consume_newline(), "input {input:?}");
            assert_eq!(s.peek(), rest);
            assert_eq!(s.line(), 2);
        }
        let mut s = Scanner::new("x", 4);
        assert!(!s.consume_newline());
    }

    #[test]
    fn test_literal_matching() {
        let mut s = Scanner::new("Note: x", 4);
        assert!(s.matches("Note"));
        assert!(s.matches_ignore_case("nOtE"));
        assert!(!s.matches("note"));
        assert!(s.consume("Note:"));
        assert_eq!(s.peek(), Some(b' '));
    }

    #[test]
    fn test_count_char_run() {
        let s = Scanner::new("***a", 4);
        assert_eq!(s.count_char(b'*'), 3);
        assert_eq!(s.count_char(b'-'), 0);
    }

    #[test]
    fn test_save_restore_backtracks() {
        let mut s = Scanner::new("abc", 4);
        let saved = s.save_state();
        s.advance();
        s.advance();
        s.restore_state(saved);
        assert_eq!(s.offset(), 0);
        assert_eq!(s.peek(), Some(b'a'));
    }

    #[test]
    fn test_line_scanner_decomposes_lines() {
        let ls = LineScanner::new("# Title\n\n  body\n", 4);
        assert_eq!(ls.line_count(), 3);
    }

    #[test]
    fn test_line_scanner_indent_and_blank() {
        let mut ls = LineScanner::new("a\n\t x\n   \n", 4);
        let a = ls.next_line().unwrap();
        assert_eq!((a.indent, a.blank), (0, false));
        let b = ls.next_line().unwrap();
        assert_eq!(b.indent, 5);
        assert_eq!(b.text, "\t x");
        let c = ls.next_line().unwrap();
        assert!(c.blank);
        assert!(ls.next_line().is_none());
    }

    #[test]
    fn test_peek_line_does_not_consume() {
        let mut ls = LineScanner::new("a\nb", 4);
        ls.next_line();
        assert_eq!(ls.peek_line().unwrap().text, "b");
        assert_eq!(ls.next_line().unwrap().text, "b");
        assert!(ls.peek_line().is_none());
    }

    #[test]
    fn test_crlf_lines_are_stripped() {
        let mut ls = LineScanner::new("a\r\nb\r\n", 4);
        assert_eq!(ls.next_line().unwrap().text, "a");
        assert_eq!(ls.next_line().unwrap().text, "b");
    }

    #[test]
    fn test_line_offsets_index_into_source() {
        let src = "ab\ncd";
        let mut ls = LineScanner::new(src, 4);
        ls.next_line();
        let second = ls.next_line().unwrap();
        assert_eq!(second.start_offset, 3);
        assert_eq!(&src[second.start_offset..second.start_offset + 2], "cd");
    }
}
