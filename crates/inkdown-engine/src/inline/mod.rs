//! # Inline Parsing
//!
//! Operates over the flattened text of one leaf block at a time. A single
//! left-to-right scan dispatches on the current byte and appends inline
//! nodes to the block; emphasis is resolved afterwards over the recorded
//! delimiter stack, and brackets resolve links/images as their `]` arrives.
//!
//! Positions on inline nodes are relative to the block's collected text,
//! offset by the block's start position. The block phase trims line
//! prefixes, so inline offsets inside multi-line paragraphs are
//! approximate by that trimming.

pub mod delimiters;
pub mod extensions;

use crate::ast::value::*;
use crate::ast::{Ast, NodeId, Pos, SourceRange};
use crate::options::ParserOptions;
use crate::scanner::Scanner;

use delimiters::{Bracket, Delimiter, flanking, process_emphasis};
use extensions::{emoji_glyph, has_uri_scheme, is_email_autolink, is_shortcode_byte, smart_punctuate};

/// Runs the inline parser over every leaf block of the document that
/// carries inline content.
pub fn parse_all_inlines(ast: &mut Ast, options: &ParserOptions) {
    let targets: Vec<NodeId> = ast
        .descendants(ast.root())
        .filter(|&id| ast.node(id).value.contains_inlines())
        .collect();
    for block in targets {
        parse_inlines(ast, options, block);
    }
}

/// Parses one block's collected raw text into inline children.
pub fn parse_inlines(ast: &mut Ast, options: &ParserOptions, block: NodeId) {
    let content = std::mem::take(&mut ast.node_mut(block).content);
    if content.is_empty() {
        return;
    }
    let origin = ast.node(block).sourcepos.start;
    parse_into(ast, options, block, &content, origin);
}

/// Parses `text` into children of `block`. Also used recursively for the
/// delimited extension spans (strikethrough, highlight, super/subscript).
fn parse_into(ast: &mut Ast, options: &ParserOptions, block: NodeId, text: &str, origin: Pos) {
    let mut parser = InlineParser {
        ast,
        options,
        block,
        content: text,
        scanner: Scanner::new(text, options.tab_width),
        origin,
        delimiters: Vec::new(),
        brackets: Vec::new(),
        text_buf: String::new(),
        text_start: None,
    };
    parser.run();
}

struct InlineParser<'p, 'i> {
    ast: &'p mut Ast,
    options: &'p ParserOptions,
    block: NodeId,
    content: &'i str,
    scanner: Scanner<'i>,
    origin: Pos,
    delimiters: Vec<Delimiter>,
    brackets: Vec<Bracket>,
    text_buf: String,
    text_start: Option<Pos>,
}

impl InlineParser<'_, '_> {
    fn run(&mut self) {
        while let Some(b) = self.scanner.peek() {
            match b {
                b'\\' => self.backslash(),
                b'`' => self.code_span(),
                b'*' | b'_' => self.delimiter_run(b),
                b'!' if self.scanner.peek_at(1) == Some(b'[') => self.open_bracket(true),
                b'[' => self.open_bracket_dispatch(),
                b']' => self.close_bracket(),
                b'<' => self.angle(),
                b'~' => self.tilde(),
                b'$' if self.options.math => self.dollar(),
                b'=' if self.options.highlight && self.scanner.peek_at(1) == Some(b'=') => {
                    self.highlight()
                }
                b'^' if self.options.super_subscript => {
                    self.span_extension(b'^', NodeValue::Superscript)
                }
                b':' if self.options.emoji => self.colon(),
                b'\n' => self.newline(),
                _ => self.plain_char(),
            }
        }
        self.flush_text();
        process_emphasis(self.ast, &mut self.delimiters);
    }

    // ---- positions and text accumulation ----

    fn pos(&self) -> Pos {
        let line = self.origin.line + self.scanner.line() - 1;
        let column = if self.scanner.line() == 1 {
            self.origin.column + self.scanner.column() - 1
        } else {
            self.scanner.column()
        };
        Pos::new(line, column, self.origin.offset + self.scanner.offset())
    }

    fn note_text_start(&mut self) {
        if self.text_buf.is_empty() {
            self.text_start = Some(self.pos());
        }
    }

    fn flush_text(&mut self) {
        if self.text_buf.is_empty() {
            return;
        }
        let mut text = std::mem::take(&mut self.text_buf);
        if self.options.smart_punctuation {
            text = smart_punctuate(&text);
        }
        let start = self.text_start.take().unwrap_or_else(|| self.pos());
        let node = self.ast.alloc(
            NodeValue::Text(text),
            SourceRange {
                start,
                end: self.pos(),
            },
        );
        self.ast.append(self.block, node);
    }

    /// Flushes pending text, then appends a fresh node to the block.
    fn push_node(&mut self, value: NodeValue, start: Pos) -> NodeId {
        self.flush_text();
        let node = self.ast.alloc(
            value,
            SourceRange {
                start,
                end: self.pos(),
            },
        );
        self.ast.append(self.block, node);
        node
    }

    fn push_literal(&mut self, s: &str) {
        self.note_text_start();
        self.text_buf.push_str(s);
    }

    fn advance_n(&mut self, n: usize) {
        for _ in 0..n {
            self.scanner.advance();
        }
    }

    fn plain_char(&mut self) {
        self.note_text_start();
        let c = self.scanner.rest().chars().next().unwrap_or('\u{FFFD}');
        self.text_buf.push(c);
        self.advance_n(c.len_utf8());
    }

    // ---- handlers ----

    fn backslash(&mut self) {
        let start = self.pos();
        self.scanner.advance();
        match self.scanner.peek() {
            Some(b'\n') if self.options.hard_break_on_backslash => {
                self.scanner.advance();
                self.push_node(NodeValue::HardBreak, start);
            }
            Some(b) if b.is_ascii_punctuation() => {
                self.note_text_start();
                self.text_buf.push(b as char);
                self.scanner.advance();
            }
            _ => self.push_literal("\\"),
        }
    }

    fn newline(&mut self) {
        let start = self.pos();
        self.flush_text();
        self.scanner.advance();
        self.push_node(NodeValue::SoftBreak, start);
    }

    fn code_span(&mut self) {
        let start = self.pos();
        let open_len = self.scanner.count_char(b'`');
        self.advance_n(open_len);

        // Find a closing run of exactly the opening length; mismatched runs
        // are content.
        let rest = self.scanner.rest();
        let bytes = rest.as_bytes();
        let mut i = 0;
        let mut close_at = None;
        while i < bytes.len() {
            if bytes[i] == b'`' {
                let run_start = i;
                while i < bytes.len() && bytes[i] == b'`' {
                    i += 1;
                }
                if i - run_start == open_len {
                    close_at = Some(run_start);
                    break;
                }
            } else {
                i += 1;
            }
        }

        let Some(close_at) = close_at else {
            // No closing run: the opening run is literal text.
            self.push_literal(&"`".repeat(open_len));
            return;
        };

        let mut body = rest[..close_at].replace('\n', " ");
        if body.len() > 1
            && body.starts_with(' ')
            && body.ends_with(' ')
            && !body.trim().is_empty()
        {
            body = body[1..body.len() - 1].to_string();
        }
        self.advance_n(close_at + open_len);
        self.push_node(NodeValue::CodeSpan(body), start);
    }

    fn delimiter_run(&mut self, ch: u8) {
        let start = self.pos();
        let before = self
            .scanner
            .offset()
            .checked_sub(1)
            .and_then(|i| self.content.as_bytes().get(i).copied());
        let count = self.scanner.count_char(ch);
        self.advance_n(count);
        let after = self.scanner.peek();
        let (can_open, can_close) = flanking(before, after, ch);

        let run = String::from_utf8(vec![ch; count]).expect("run chars are ASCII");
        let node = self.push_node(NodeValue::Text(run), start);
        self.delimiters.push(Delimiter {
            node,
            ch,
            count,
            can_open,
            can_close,
        });
    }

    fn open_bracket_dispatch(&mut self) {
        if self.options.footnotes && self.scanner.peek_at(1) == Some(b'^') && self.footnote_ref() {
            return;
        }
        if self.options.wiki_links && self.scanner.peek_at(1) == Some(b'[') && self.wiki_link() {
            return;
        }
        self.open_bracket(false);
    }

    fn open_bracket(&mut self, image: bool) {
        let start = self.pos();
        let marker = if image { "![" } else { "[" };
        self.advance_n(marker.len());
        let node = self.push_node(NodeValue::Text(marker.to_string()), start);
        self.brackets.push(Bracket {
            node,
            image,
            active: true,
        });
    }

    fn close_bracket(&mut self) {
        self.scanner.advance(); // ]

        let Some(idx) = self.brackets.iter().rposition(|b| b.active) else {
            self.push_literal("]");
            return;
        };

        if self.scanner.peek() == Some(b'(') {
            if let Some((url, title)) = self.link_suffix() {
                self.flush_text();
                let opener = self.brackets[idx].node;
                let image = self.brackets[idx].image;
                let value = if image {
                    NodeValue::Image(NodeLink { url, title })
                } else {
                    NodeValue::Link(NodeLink { url, title })
                };
                let range = SourceRange {
                    start: self.ast.node(opener).sourcepos.start,
                    end: self.pos(),
                };
                let link = self.ast.alloc(value, range);
                // Everything produced since the opening bracket becomes the
                // link's children; the placeholder itself disappears.
                self.ast.reparent_following(opener, link);
                self.ast.detach(opener);
                self.ast.append(self.block, link);
                // The matched bracket and everything nested beyond it is
                // spent; enclosing link brackets deactivate so no link ever
                // contains another.
                self.brackets.truncate(idx);
                if !image {
                    for bracket in &mut self.brackets {
                        if !bracket.image {
                            bracket.active = false;
                        }
                    }
                }
                return;
            }
        }

        self.brackets[idx].active = false;
        self.push_literal("]");
    }

    fn link_suffix(&mut self) -> Option<(String, Option<String>)> {
        let saved = self.scanner.save_state();
        match self.parse_link_suffix() {
            Some(parts) => Some(parts),
            None => {
                self.scanner.restore_state(saved);
                None
            }
        }
    }

    fn parse_link_suffix(&mut self) -> Option<(String, Option<String>)> {
        if !self.scanner.consume("(") {
            return None;
        }
        self.skip_link_whitespace();

        let url = if self.scanner.peek() == Some(b'<') {
            self.scanner.advance();
            let rest = self.scanner.rest();
            let close = rest.find('>')?;
            let url = &rest[..close];
            if url.contains('\n') {
                return None;
            }
            let url = url.to_string();
            self.advance_n(close + 1);
            url
        } else {
            let rest = self.scanner.rest();
            let mut depth = 0usize;
            let mut end = rest.len();
            for (i, b) in rest.bytes().enumerate() {
                match b {
                    b'(' => depth += 1,
                    b')' if depth == 0 => {
                        end = i;
                        break;
                    }
                    b')' => depth -= 1,
                    b' ' | b'\t' | b'\n' => {
                        end = i;
                        break;
                    }
                    _ => {}
                }
            }
            let url = rest[..end].to_string();
            self.advance_n(end);
            url
        };

        self.skip_link_whitespace();
        let title = match self.scanner.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                self.scanner.advance();
                let rest = self.scanner.rest();
                let close = rest.find(quote as char)?;
                let title = rest[..close].to_string();
                self.advance_n(close + 1);
                self.skip_link_whitespace();
                Some(title)
            }
            _ => None,
        };

        if !self.scanner.consume(")") {
            return None;
        }
        Some((url, title))
    }

    fn skip_link_whitespace(&mut self) {
        while matches!(self.scanner.peek(), Some(b' ' | b'\t' | b'\n')) {
            self.scanner.advance();
        }
    }

    fn footnote_ref(&mut self) -> bool {
        let saved = self.scanner.save_state();
        let start = self.pos();
        self.advance_n(2); // [^
        let rest = self.scanner.rest();
        let Some(close) = rest.find(']') else {
            self.scanner.restore_state(saved);
            return false;
        };
        let label = &rest[..close];
        if label.is_empty() || label.contains(|c: char| c.is_whitespace()) {
            self.scanner.restore_state(saved);
            return false;
        }
        let label = label.to_string();
        self.advance_n(close + 1);
        self.push_node(NodeValue::FootnoteRef(label), start);
        true
    }

    fn wiki_link(&mut self) -> bool {
        let saved = self.scanner.save_state();
        let start = self.pos();
        self.advance_n(2); // [[
        let rest = self.scanner.rest();
        let Some(close) = rest.find("]]") else {
            self.scanner.restore_state(saved);
            return false;
        };
        let inner = &rest[..close];
        if inner.is_empty() || inner.contains('\n') {
            self.scanner.restore_state(saved);
            return false;
        }
        let (target, alias) = match inner.split_once('|') {
            Some((target, alias)) => (target.to_string(), Some(alias.to_string())),
            None => (inner.to_string(), None),
        };
        self.advance_n(close + 2);
        self.push_node(NodeValue::WikiLink(NodeWikiLink { target, alias }), start);
        true
    }

    fn angle(&mut self) {
        let start = self.pos();
        self.scanner.advance(); // <
        let rest = self.scanner.rest();

        let mut close = None;
        for (i, b) in rest.bytes().enumerate() {
            match b {
                b'>' => {
                    close = Some(i);
                    break;
                }
                b' ' | b'\t' | b'\n' | b'<' => break,
                _ => {}
            }
        }
        let Some(close) = close else {
            self.push_literal("<");
            return;
        };
        let content = &rest[..close];
        if content.is_empty() {
            self.push_literal("<");
            return;
        }

        if has_uri_scheme(content) {
            let url = content.to_string();
            self.advance_n(close + 1);
            self.push_node(NodeValue::Autolink(NodeAutolink { url, email: false }), start);
        } else if is_email_autolink(content) {
            let url = content.to_string();
            self.advance_n(close + 1);
            self.push_node(NodeValue::Autolink(NodeAutolink { url, email: true }), start);
        } else if self.options.html_passthrough
            && content
                .bytes()
                .next()
                .is_some_and(|b| b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?'))
        {
            let html = format!("<{content}>");
            self.advance_n(close + 1);
            self.push_node(NodeValue::HtmlInline(html), start);
        } else {
            self.push_literal("<");
        }
    }

    fn tilde(&mut self) {
        let count = self.scanner.count_char(b'~');
        if count >= 2 && self.options.gfm {
            let start = self.pos();
            self.advance_n(2);
            let rest = self.scanner.rest();
            match rest.find("~~") {
                Some(close) if close > 0 => {
                    let inner = rest[..close].to_string();
                    self.advance_n(close + 2);
                    let node = self.push_node(NodeValue::Strikethrough, start);
                    parse_into(self.ast, self.options, node, &inner, start);
                }
                _ => self.push_literal("~~"),
            }
        } else if count == 1 && self.options.super_subscript {
            self.span_extension(b'~', NodeValue::Subscript);
        } else {
            self.advance_n(count);
            self.push_literal(&"~".repeat(count));
        }
    }

    fn dollar(&mut self) {
        let start = self.pos();
        if self.scanner.peek_at(1) == Some(b'$') {
            self.advance_n(2);
            let rest = self.scanner.rest();
            match rest.find("$$") {
                Some(close) if close > 0 => {
                    let body = rest[..close].to_string();
                    self.advance_n(close + 2);
                    self.push_node(NodeValue::MathBlock(body), start);
                }
                _ => self.push_literal("$$"),
            }
        } else {
            self.scanner.advance();
            let rest = self.scanner.rest();
            match rest.find('$') {
                Some(close) if close > 0 => {
                    let body = rest[..close].to_string();
                    self.advance_n(close + 1);
                    self.push_node(NodeValue::MathInline(body), start);
                }
                _ => self.push_literal("$"),
            }
        }
    }

    fn highlight(&mut self) {
        let start = self.pos();
        self.advance_n(2); // ==
        let rest = self.scanner.rest();
        match rest.find("==") {
            Some(close) if close > 0 => {
                let inner = rest[..close].to_string();
                self.advance_n(close + 2);
                let node = self.push_node(NodeValue::Highlight, start);
                parse_into(self.ast, self.options, node, &inner, start);
            }
            _ => self.push_literal("=="),
        }
    }

    /// `^sup^` and `~sub~`: closed by the next marker, broken by whitespace
    /// or end of line.
    fn span_extension(&mut self, marker: u8, value: NodeValue) {
        let start = self.pos();
        self.scanner.advance();
        let rest = self.scanner.rest();
        let mut close = None;
        for (i, b) in rest.bytes().enumerate() {
            if b == marker {
                close = Some(i);
                break;
            }
            if matches!(b, b' ' | b'\t' | b'\n') {
                break;
            }
        }
        match close {
            Some(i) if i > 0 => {
                let inner = rest[..i].to_string();
                self.advance_n(i + 1);
                let node = self.push_node(value, start);
                parse_into(self.ast, self.options, node, &inner, start);
            }
            _ => self.push_literal(
                std::str::from_utf8(&[marker]).expect("marker is ASCII"),
            ),
        }
    }

    fn colon(&mut self) {
        let rest = self.scanner.rest().as_bytes();
        let mut i = 1;
        while i < rest.len() && is_shortcode_byte(rest[i]) {
            i += 1;
        }
        if i > 1 && rest.get(i) == Some(&b':') {
            let shortcode = std::str::from_utf8(&rest[1..i])
                .expect("shortcode bytes are ASCII")
                .to_string();
            let start = self.pos();
            self.advance_n(i + 1);
            let glyph = emoji_glyph(&shortcode).map(str::to_string);
            self.push_node(NodeValue::Emoji(NodeEmoji { shortcode, glyph }), start);
        } else {
            self.push_literal(":");
            self.scanner.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> (Ast, NodeId) {
        parse_with(text, &ParserOptions::default())
    }

    fn parse_with(text: &str, options: &ParserOptions) -> (Ast, NodeId) {
        let mut ast = Ast::new();
        let root = ast.root();
        let p = ast.alloc(NodeValue::Paragraph, SourceRange::default());
        ast.append(root, p);
        ast.node_mut(p).content.push_str(text);
        parse_inlines(&mut ast, options, p);
        (ast, p)
    }

    fn kinds(ast: &Ast, parent: NodeId) -> Vec<&'static str> {
        ast.children(parent)
            .map(|id| ast.node(id).value.type_name())
            .collect()
    }

    fn text_of(ast: &Ast, id: NodeId) -> String {
        match &ast.node(id).value {
            NodeValue::Text(s) => s.clone(),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn test_plain_text_single_node() {
        let (ast, p) = parse("hello world");
        assert_eq!(kinds(&ast, p), vec!["text"]);
        let t = ast.first_child(p).unwrap();
        assert_eq!(text_of(&ast, t), "hello world");
    }

    #[test]
    fn test_emphasis_pair() {
        let (ast, p) = parse("*text*");
        assert_eq!(kinds(&ast, p), vec!["emphasis"]);
        let em = ast.first_child(p).unwrap();
        assert_eq!(text_of(&ast, ast.first_child(em).unwrap()), "text");
    }

    #[test]
    fn test_strong_pair() {
        let (ast, p) = parse("**text**");
        assert_eq!(kinds(&ast, p), vec!["strong"]);
    }

    #[test]
    fn test_triple_run_strong_plus_emphasis() {
        let (ast, p) = parse("***text***");
        // Strong consumes first, the leftover singles wrap it in emphasis.
        assert_eq!(kinds(&ast, p), vec!["emphasis"]);
        let emph = ast.first_child(p).unwrap();
        assert_eq!(kinds(&ast, emph), vec!["strong"]);
    }

    #[test]
    fn test_nested_emphasis_inside_strong() {
        let (ast, p) = parse("**a *b* c**");
        assert_eq!(kinds(&ast, p), vec!["strong"]);
        let strong = ast.first_child(p).unwrap();
        assert_eq!(kinds(&ast, strong), vec!["text", "emphasis", "text"]);
    }

    #[test]
    fn test_unmatched_delimiters_stay_literal() {
        let (ast, p) = parse("*text");
        assert_eq!(kinds(&ast, p), vec!["text", "text"]);
        let first = ast.first_child(p).unwrap();
        assert_eq!(text_of(&ast, first), "*");
    }

    #[test]
    fn test_intraword_underscore_is_literal() {
        let (ast, p) = parse("foo_bar_baz");
        let texts: Vec<String> = ast.children(p).map(|id| text_of(&ast, id)).collect();
        assert_eq!(texts.join(""), "foo_bar_baz");
    }

    #[test]
    fn test_code_span_basic() {
        let (ast, p) = parse("a `code` b");
        assert_eq!(kinds(&ast, p), vec!["text", "code_span", "text"]);
        let code = ast.children(p).nth(1).unwrap();
        match &ast.node(code).value {
            NodeValue::CodeSpan(s) => assert_eq!(s, "code"),
            other => panic!("expected code span, got {other:?}"),
        }
    }

    #[test]
    fn test_code_span_skips_mismatched_runs() {
        let (ast, p) = parse("``a ` b``");
        assert_eq!(kinds(&ast, p), vec!["code_span"]);
        let code = ast.first_child(p).unwrap();
        match &ast.node(code).value {
            NodeValue::CodeSpan(s) => assert_eq!(s, "a ` b"),
            other => panic!("expected code span, got {other:?}"),
        }
    }

    #[test]
    fn test_code_span_strips_one_padding_space() {
        let (ast, p) = parse("` code `");
        let code = ast.first_child(p).unwrap();
        match &ast.node(code).value {
            NodeValue::CodeSpan(s) => assert_eq!(s, "code"),
            other => panic!("expected code span, got {other:?}"),
        }
    }

    #[test]
    fn test_unclosed_backticks_are_literal() {
        let (ast, p) = parse("a `b");
        assert_eq!(kinds(&ast, p), vec!["text"]);
        assert_eq!(text_of(&ast, ast.first_child(p).unwrap()), "a `b");
    }

    #[test]
    fn test_link_with_url() {
        let (ast, p) = parse("[text](https://example.com)");
        assert_eq!(kinds(&ast, p), vec!["link"]);
        let link = ast.first_child(p).unwrap();
        match &ast.node(link).value {
            NodeValue::Link(l) => {
                assert_eq!(l.url, "https://example.com");
                assert_eq!(l.title, None);
            }
            other => panic!("expected link, got {other:?}"),
        }
        assert_eq!(text_of(&ast, ast.first_child(link).unwrap()), "text");
    }

    #[test]
    fn test_link_with_title() {
        let (ast, p) = parse("[t](/u \"The Title\")");
        let link = ast.first_child(p).unwrap();
        match &ast.node(link).value {
            NodeValue::Link(l) => {
                assert_eq!(l.url, "/u");
                assert_eq!(l.title.as_deref(), Some("The Title"));
            }
            other => panic!("expected link, got {other:?}"),
        }
    }

    #[test]
    fn test_image() {
        let (ast, p) = parse("![alt](img.png)");
        assert_eq!(kinds(&ast, p), vec!["image"]);
        let img = ast.first_child(p).unwrap();
        assert_eq!(text_of(&ast, ast.first_child(img).unwrap()), "alt");
    }

    #[test]
    fn test_bracket_without_destination_is_literal() {
        let (ast, p) = parse("[text]");
        let texts: Vec<String> = ast.children(p).map(|id| text_of(&ast, id)).collect();
        assert_eq!(texts.join(""), "[text]");
    }

    #[test]
    fn test_no_link_inside_link() {
        let (ast, p) = parse("[a [b](inner) c](outer)");
        // The inner bracket wins; the outer one degrades to text.
        let kinds = kinds(&ast, p);
        assert_eq!(kinds.iter().filter(|k| **k == "link").count(), 1);
    }

    #[test]
    fn test_emphasis_inside_link_text() {
        let (ast, p) = parse("[*em*](u)");
        let link = ast.first_child(p).unwrap();
        assert_eq!(kinds(&ast, link), vec!["emphasis"]);
    }

    #[test]
    fn test_url_autolink() {
        let (ast, p) = parse("<https://example.com>");
        assert_eq!(kinds(&ast, p), vec!["autolink"]);
        let a = ast.first_child(p).unwrap();
        match &ast.node(a).value {
            NodeValue::Autolink(al) => {
                assert_eq!(al.url, "https://example.com");
                assert!(!al.email);
            }
            other => panic!("expected autolink, got {other:?}"),
        }
    }

    #[test]
    fn test_email_autolink() {
        let (ast, p) = parse("<user@example.com>");
        let a = ast.first_child(p).unwrap();
        match &ast.node(a).value {
            NodeValue::Autolink(al) => assert!(al.email),
            other => panic!("expected autolink, got {other:?}"),
        }
    }

    #[test]
    fn test_inline_html_tag() {
        let (ast, p) = parse("a <br> b");
        assert_eq!(kinds(&ast, p), vec!["text", "html_inline", "text"]);
    }

    #[test]
    fn test_angle_with_space_is_literal() {
        let (ast, p) = parse("1 < 2 > 0");
        assert_eq!(kinds(&ast, p), vec!["text"]);
    }

    #[test]
    fn test_strikethrough() {
        let (ast, p) = parse("~~gone~~");
        assert_eq!(kinds(&ast, p), vec!["strikethrough"]);
        let s = ast.first_child(p).unwrap();
        assert_eq!(text_of(&ast, ast.first_child(s).unwrap()), "gone");
    }

    #[test]
    fn test_single_tilde_subscript() {
        let (ast, p) = parse("H~2~O");
        assert_eq!(kinds(&ast, p), vec!["text", "subscript", "text"]);
    }

    #[test]
    fn test_subscript_broken_by_space_is_literal() {
        let (ast, p) = parse("a ~b c");
        assert_eq!(kinds(&ast, p), vec!["text"]);
        assert_eq!(text_of(&ast, ast.first_child(p).unwrap()), "a ~b c");
    }

    #[test]
    fn test_superscript() {
        let (ast, p) = parse("x^2^");
        assert_eq!(kinds(&ast, p), vec!["text", "superscript"]);
    }

    #[test]
    fn test_inline_math() {
        let (ast, p) = parse("$e=mc^2$");
        assert_eq!(kinds(&ast, p), vec!["math_inline"]);
        let m = ast.first_child(p).unwrap();
        match &ast.node(m).value {
            NodeValue::MathInline(s) => assert_eq!(s, "e=mc^2"),
            other => panic!("expected math, got {other:?}"),
        }
    }

    #[test]
    fn test_display_math() {
        let (ast, p) = parse("$$\\int_0^1$$");
        assert_eq!(kinds(&ast, p), vec!["math_block"]);
    }

    #[test]
    fn test_unterminated_math_degrades() {
        let (ast, p) = parse("$unclosed");
        assert_eq!(kinds(&ast, p), vec!["text"]);
        assert_eq!(text_of(&ast, ast.first_child(p).unwrap()), "$unclosed");
    }

    #[test]
    fn test_highlight_marks() {
        let (ast, p) = parse("==important==");
        assert_eq!(kinds(&ast, p), vec!["highlight"]);
    }

    #[test]
    fn test_unterminated_highlight_degrades() {
        let (ast, p) = parse("==nope");
        assert_eq!(kinds(&ast, p), vec!["text"]);
        assert_eq!(text_of(&ast, ast.first_child(p).unwrap()), "==nope");
    }

    #[test]
    fn test_emoji_shortcode() {
        let (ast, p) = parse(":smile:");
        assert_eq!(kinds(&ast, p), vec!["emoji"]);
        let e = ast.first_child(p).unwrap();
        match &ast.node(e).value {
            NodeValue::Emoji(em) => {
                assert_eq!(em.shortcode, "smile");
                assert_eq!(em.glyph.as_deref(), Some("\u{1F604}"));
            }
            other => panic!("expected emoji, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_shortcode_keeps_no_glyph() {
        let (ast, p) = parse(":unknown_code:");
        let e = ast.first_child(p).unwrap();
        match &ast.node(e).value {
            NodeValue::Emoji(em) => assert!(em.glyph.is_none()),
            other => panic!("expected emoji, got {other:?}"),
        }
    }

    #[test]
    fn test_colon_without_shortcode_is_literal() {
        let (ast, p) = parse("a: b");
        assert_eq!(kinds(&ast, p), vec!["text"]);
    }

    #[test]
    fn test_wiki_link_with_alias() {
        let (ast, p) = parse("see [[Target|name]]");
        assert_eq!(kinds(&ast, p), vec!["text", "wiki_link"]);
        let w = ast.children(p).nth(1).unwrap();
        match &ast.node(w).value {
            NodeValue::WikiLink(wl) => {
                assert_eq!(wl.target, "Target");
                assert_eq!(wl.alias.as_deref(), Some("name"));
            }
            other => panic!("expected wiki link, got {other:?}"),
        }
    }

    #[test]
    fn test_unclosed_wiki_link_degrades_to_bracket() {
        let (ast, p) = parse("[[open");
        let texts: Vec<String> = ast.children(p).map(|id| text_of(&ast, id)).collect();
        assert_eq!(texts.join(""), "[[open");
    }

    #[test]
    fn test_footnote_ref() {
        let (ast, p) = parse("claim[^1]");
        assert_eq!(kinds(&ast, p), vec!["text", "footnote_ref"]);
        let f = ast.children(p).nth(1).unwrap();
        match &ast.node(f).value {
            NodeValue::FootnoteRef(label) => assert_eq!(label, "1"),
            other => panic!("expected footnote ref, got {other:?}"),
        }
    }

    #[test]
    fn test_backslash_escapes_punctuation() {
        let (ast, p) = parse("\\*not em\\*");
        assert_eq!(kinds(&ast, p), vec!["text"]);
        assert_eq!(text_of(&ast, ast.first_child(p).unwrap()), "*not em*");
    }

    #[test]
    fn test_backslash_newline_hard_break() {
        let (ast, p) = parse("a\\\nb");
        assert_eq!(kinds(&ast, p), vec!["text", "hard_break", "text"]);
    }

    #[test]
    fn test_backslash_before_letter_is_literal() {
        let (ast, p) = parse("a\\b");
        assert_eq!(text_of(&ast, ast.first_child(p).unwrap()), "a\\b");
    }

    #[test]
    fn test_soft_break() {
        let (ast, p) = parse("a\nb");
        assert_eq!(kinds(&ast, p), vec!["text", "soft_break", "text"]);
    }

    #[test]
    fn test_smart_punctuation_only_when_enabled() {
        let options = ParserOptions {
            smart_punctuation: true,
            ..Default::default()
        };
        let (ast, p) = parse_with("\"hi\" -- there", &options);
        assert_eq!(
            text_of(&ast, ast.first_child(p).unwrap()),
            "\u{201C}hi\u{201D} \u{2013} there"
        );

        let (ast, p) = parse("\"hi\" -- there");
        assert_eq!(text_of(&ast, ast.first_child(p).unwrap()), "\"hi\" -- there");
    }

    #[test]
    fn test_extensions_respect_options() {
        let options = ParserOptions {
            gfm: false,
            math: false,
            highlight: false,
            super_subscript: false,
            emoji: false,
            wiki_links: false,
            footnotes: false,
            ..Default::default()
        };
        let (ast, p) = parse_with("~~x~~ $m$ ==h== ^s^ :smile: [[w]]", &options);
        for id in ast.children(p) {
            assert_eq!(ast.node(id).value.type_name(), "text");
        }
    }
}
