//! # Block Parsing
//!
//! Line-driven construction of the block-level tree. Each input line is
//! tested against the block rules in strict precedence order; the first
//! match either extends the current open block or begins a new one, closing
//! superseded ones.
//!
//! ## Key Invariants
//!
//! - The open-block stack is never empty; the bottom entry is the document
//!   root
//! - Fenced code bodies are raw zones: no rule runs inside an open fence
//! - No rule fails with an error; malformed syntax degrades to paragraph
//!   text

pub mod kinds;
pub mod tables;

use crate::ast::value::*;
use crate::ast::{Ast, NodeId, Pos, SourceRange};
use crate::options::ParserOptions;
use crate::scanner::{Line, LineScanner};

use kinds::*;
use tables::{match_delimiter_row, split_row};

/// Lowercases, keeps ASCII alphanumerics and joins runs of anything else
/// with single dashes. Used for heading ids and table-of-contents anchors.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[derive(Debug, Clone, Copy)]
struct ListFrame {
    list: NodeId,
    item: NodeId,
    list_type: ListType,
    /// Indent of the marker line that opened this level, for the
    /// nested-vs-sibling decision.
    marker_indent: usize,
}

#[derive(Debug)]
struct OpenFence {
    node: NodeId,
    fence_char: u8,
    length: usize,
}

/// Builds the block tree for one source buffer. Leaf blocks collect their
/// raw text into `Node::content` for the inline phase.
pub struct BlockParser<'a> {
    options: &'a ParserOptions,
    lines: LineScanner<'a>,
    ast: Ast,
    /// Open blocks, bottom is the document root. The top entry may be a
    /// paragraph collecting text.
    stack: Vec<NodeId>,
    list_stack: Vec<ListFrame>,
    fence: Option<OpenFence>,
}

impl<'a> BlockParser<'a> {
    pub fn new(source: &'a str, options: &'a ParserOptions) -> Self {
        let ast = Ast::new();
        let root = ast.root();
        Self {
            options,
            lines: LineScanner::new(source, options.tab_width),
            ast,
            stack: vec![root],
            list_stack: Vec::new(),
            fence: None,
        }
    }

    /// Consumes every line and returns the finished block tree.
    pub fn run(mut self) -> Ast {
        while let Some(line) = self.lines.next_line() {
            self.push_line(line);
        }
        // EOF closes everything that is still open, including an
        // unterminated fence.
        self.fence = None;
        self.stack.truncate(1);
        self.list_stack.clear();
        self.ast
    }

    fn push_line(&mut self, line: Line<'a>) {
        if self.fence.is_some() {
            self.fence_line(line);
            return;
        }
        if line.blank {
            self.close_paragraph();
            return;
        }
        if self.try_thematic_break(line) {
            return;
        }
        if self.try_atx_heading(line) {
            return;
        }
        if self.try_fence_open(line) {
            return;
        }
        if self.try_colon_fence(line) {
            return;
        }
        if self.try_footnote_def(line) {
            return;
        }
        if self.try_abbr_def(line) {
            return;
        }
        if self.try_toc(line) {
            return;
        }
        if self.try_blockquote(line) {
            return;
        }
        if self.try_list_item(line) {
            return;
        }
        if self.try_html_block(line) {
            return;
        }
        if self.try_table(line) {
            return;
        }
        if self.try_definition_list(line) {
            return;
        }
        self.new_or_extend_paragraph(line, line.text.trim());
    }

    // ---- stack plumbing ----

    fn top(&self) -> NodeId {
        *self.stack.last().expect("open-block stack never empty")
    }

    fn pop_block(&mut self) {
        if self.stack.len() <= 1 {
            return;
        }
        let id = self.stack.pop().expect("checked len");
        if self.list_stack.last().is_some_and(|f| f.list == id) {
            self.list_stack.pop();
        }
    }

    fn close_paragraph(&mut self) {
        if matches!(self.ast.node(self.top()).value, NodeValue::Paragraph) {
            self.pop_block();
        }
    }

    /// Unwinds the open-block stack down to the document root. Called
    /// whenever a block type incompatible with the current containers
    /// begins.
    fn close_open_blocks(&mut self) {
        while self.stack.len() > 1 {
            self.pop_block();
        }
    }

    fn line_range(line: Line) -> SourceRange {
        SourceRange {
            start: Pos::new(line.number, 1, line.start_offset),
            end: Pos::new(
                line.number,
                line.text.len() + 1,
                line.start_offset + line.text.len(),
            ),
        }
    }

    /// Allocates a node for `line` and appends it to the innermost open
    /// block.
    fn open(&mut self, value: NodeValue, line: Line) -> NodeId {
        let id = self.ast.alloc(value, Self::line_range(line));
        let parent = self.top();
        self.ast.append(parent, id);
        self.mark_line_consumed(line);
        id
    }

    /// Extends the end position of every open block over `line`.
    fn mark_line_consumed(&mut self, line: Line) {
        let end = Pos::new(
            line.number,
            line.text.len() + 1,
            line.start_offset + line.text.len(),
        );
        for &id in &self.stack {
            self.ast.node_mut(id).sourcepos.end = end;
        }
    }

    // ---- paragraphs ----

    /// Appends text to the open paragraph (with a soft break) or opens a
    /// new paragraph under the innermost open block. Does not unwind.
    fn append_paragraph_text(&mut self, line: Line, text: &str) {
        if matches!(self.ast.node(self.top()).value, NodeValue::Paragraph) {
            let top = self.top();
            let node = self.ast.node_mut(top);
            node.content.push('\n');
            node.content.push_str(text);
            self.mark_line_consumed(line);
        } else {
            let p = self.open(NodeValue::Paragraph, line);
            self.ast.node_mut(p).content.push_str(text);
            self.stack.push(p);
        }
    }

    /// Default rule: extend the open paragraph, or start a new one after
    /// unwinding containers that take at most one paragraph.
    fn new_or_extend_paragraph(&mut self, line: Line, text: &str) {
        if !matches!(self.ast.node(self.top()).value, NodeValue::Paragraph) {
            self.unwind_for_new_paragraph(line.indent);
        }
        self.append_paragraph_text(line, text);
    }

    /// Quotes, lists and definition lists do not accept a second paragraph;
    /// message boxes, accordion items and (indented) footnote definitions
    /// do.
    fn unwind_for_new_paragraph(&mut self, indent: usize) {
        while self.stack.len() > 1 {
            match self.ast.node(self.top()).value {
                NodeValue::MessageBox(..) | NodeValue::AccordionItem { .. } => break,
                NodeValue::FootnoteDef(..) if indent >= 4 => break,
                _ => self.pop_block(),
            }
        }
    }

    // ---- block rules, in precedence order ----

    fn try_thematic_break(&mut self, line: Line) -> bool {
        if !match_thematic_break(line.text) {
            return false;
        }
        self.close_paragraph();
        self.close_open_blocks();
        self.open(NodeValue::ThematicBreak, line);
        true
    }

    fn try_atx_heading(&mut self, line: Line) -> bool {
        let Some(h) = match_atx_heading(line.text) else {
            return false;
        };
        self.close_paragraph();
        self.close_open_blocks();
        let id = self
            .options
            .heading_ids
            .then(|| slugify(h.text))
            .filter(|s| !s.is_empty());
        let node = self.open(
            NodeValue::Heading(NodeHeading {
                level: h.level,
                id,
            }),
            line,
        );
        self.ast.node_mut(node).content.push_str(h.text);
        true
    }

    fn try_fence_open(&mut self, line: Line) -> bool {
        let Some(f) = match_fence(line.text) else {
            return false;
        };
        self.close_paragraph();
        self.close_open_blocks();
        let mermaid = self.options.mermaid && f.info == "mermaid";
        let value = if mermaid {
            NodeValue::Mermaid(String::new())
        } else {
            NodeValue::FencedCode(NodeCodeBlock {
                info: f.info.to_string(),
                literal: String::new(),
                fence_char: f.fence_char,
                fence_length: f.length,
            })
        };
        let node = self.open(value, line);
        self.fence = Some(OpenFence {
            node,
            fence_char: f.fence_char,
            length: f.length,
        });
        true
    }

    fn fence_line(&mut self, line: Line) {
        let (node, fence_char, length) = {
            let f = self.fence.as_ref().expect("fence_line requires open fence");
            (f.node, f.fence_char, f.length)
        };
        if match_fence_close(fence_char, length, line.text) {
            self.mark_line_consumed(line);
            self.ast.node_mut(node).sourcepos.end =
                Pos::new(line.number, line.text.len() + 1, line.start_offset + line.text.len());
            self.fence = None;
            return;
        }
        match &mut self.ast.node_mut(node).value {
            NodeValue::FencedCode(cb) => {
                cb.literal.push_str(line.text);
                cb.literal.push('\n');
            }
            NodeValue::Mermaid(body) => {
                body.push_str(line.text);
                body.push('\n');
            }
            _ => unreachable!("fence node is fenced code or mermaid"),
        }
        self.mark_line_consumed(line);
    }

    fn try_colon_fence(&mut self, line: Line) -> bool {
        if !self.options.message_boxes && !self.options.accordion {
            return false;
        }
        let Some(m) = match_colon_fence(line.text) else {
            return false;
        };

        if m.keyword.is_empty() {
            return self.close_colon_container();
        }

        if m.keyword.eq_ignore_ascii_case("accordion") && self.options.accordion {
            self.open_accordion_item(line, m.title);
            return true;
        }

        let Some(box_type) = BoxType::from_keyword(m.keyword) else {
            // Unknown admonition keyword degrades to paragraph text.
            return false;
        };
        if !self.options.message_boxes {
            return false;
        }
        self.close_paragraph();
        self.close_open_blocks();
        let node = self.open(
            NodeValue::MessageBox(NodeMessageBox {
                box_type,
                title: m.title.map(str::to_string),
            }),
            line,
        );
        self.stack.push(node);
        true
    }

    /// A bare `:::` closes the innermost open message box or accordion
    /// item. With nothing to close it degrades to paragraph text.
    fn close_colon_container(&mut self) -> bool {
        let closable = self.stack.iter().rposition(|&id| {
            matches!(
                self.ast.node(id).value,
                NodeValue::MessageBox(..) | NodeValue::AccordionItem { .. }
            )
        });
        let Some(pos) = closable else {
            return false;
        };
        while self.stack.len() > pos {
            self.pop_block();
        }
        true
    }

    fn open_accordion_item(&mut self, line: Line, title: Option<&str>) {
        self.close_paragraph();
        // A following item closes the previous one.
        if matches!(self.ast.node(self.top()).value, NodeValue::AccordionItem { .. }) {
            self.pop_block();
        }
        if !matches!(self.ast.node(self.top()).value, NodeValue::Accordion) {
            self.close_open_blocks();
            let group = self.open(NodeValue::Accordion, line);
            self.stack.push(group);
        }
        let item = self.open(
            NodeValue::AccordionItem {
                title: title.unwrap_or("").to_string(),
            },
            line,
        );
        self.stack.push(item);
    }

    fn try_footnote_def(&mut self, line: Line) -> bool {
        if !self.options.footnotes {
            return false;
        }
        let Some((label, text)) = match_footnote_def(line.text) else {
            return false;
        };
        let label = label.to_string();
        self.close_paragraph();
        self.close_open_blocks();
        let def = self.open(NodeValue::FootnoteDef(label), line);
        self.stack.push(def);
        if !text.is_empty() {
            let text = text.to_string();
            self.append_paragraph_text(line, &text);
        }
        true
    }

    fn try_abbr_def(&mut self, line: Line) -> bool {
        if !self.options.abbreviations {
            return false;
        }
        let Some(abbr) = match_abbr_def(line.text) else {
            return false;
        };
        self.close_paragraph();
        self.close_open_blocks();
        self.open(NodeValue::Abbr(abbr), line);
        true
    }

    fn try_toc(&mut self, line: Line) -> bool {
        if !self.options.toc || !match_toc(line.text) {
            return false;
        }
        self.close_paragraph();
        self.close_open_blocks();
        self.open(NodeValue::Toc, line);
        true
    }

    fn try_blockquote(&mut self, line: Line) -> bool {
        let trimmed = line.text.trim_start();
        let Some(rest) = trimmed.strip_prefix('>') else {
            return false;
        };
        let content = rest.strip_prefix(' ').unwrap_or(rest);

        let quote_open = self
            .stack
            .iter()
            .any(|&id| matches!(self.ast.node(id).value, NodeValue::BlockQuote));
        if !quote_open {
            self.close_paragraph();
            self.close_open_blocks();
            let quote = self.open(NodeValue::BlockQuote, line);
            self.stack.push(quote);
        }

        if content.trim().is_empty() {
            self.close_paragraph();
        } else {
            let text = content.trim().to_string();
            self.append_paragraph_text(line, &text);
        }
        true
    }

    fn try_list_item(&mut self, line: Line) -> bool {
        let Some(m) = match_list_marker(line.text) else {
            return false;
        };

        let (item_value, content) = match self
            .options
            .gfm
            .then(|| match_task_checkbox(m.content))
            .flatten()
        {
            Some((checked, rest)) => (NodeValue::TaskItem { checked }, rest),
            None => (NodeValue::ListItem, m.content),
        };
        let content = content.to_string();

        self.close_paragraph();

        let mut nest_in: Option<NodeId> = None;
        let mut continue_list: Option<NodeId> = None;
        while let Some(frame) = self.list_stack.last().copied() {
            if line.indent > frame.marker_indent {
                nest_in = Some(frame.item);
                break;
            }
            if line.indent == frame.marker_indent && frame.list_type == m.list_type {
                continue_list = Some(frame.list);
                break;
            }
            // Shallower marker or type switch: this level is done.
            while self.top() != frame.list {
                self.pop_block();
            }
            self.pop_block();
        }

        let item = if let Some(list) = continue_list {
            // Sibling item: close down to the list, then append.
            while self.top() != list {
                self.pop_block();
            }
            let item = self.open(item_value, line);
            self.list_stack
                .last_mut()
                .expect("continued list has a frame")
                .item = item;
            item
        } else {
            // New list, either nested in the current item or at the
            // innermost open block.
            if let Some(parent_item) = nest_in {
                while self.top() != parent_item {
                    self.pop_block();
                }
            }
            let list = self.open(
                NodeValue::List(NodeList {
                    list_type: m.list_type,
                    start: m.start,
                    marker: m.marker,
                }),
                line,
            );
            self.stack.push(list);
            let item = self.open(item_value, line);
            self.list_stack.push(ListFrame {
                list,
                item,
                list_type: m.list_type,
                marker_indent: line.indent,
            });
            item
        };

        self.stack.push(item);
        if !content.is_empty() {
            self.append_paragraph_text(line, &content);
        }
        true
    }

    fn try_html_block(&mut self, line: Line) -> bool {
        if !self.options.html_passthrough || !match_html_block(line.text) {
            return false;
        }
        self.close_paragraph();
        self.close_open_blocks();
        self.open(NodeValue::HtmlBlock(line.text.trim().to_string()), line);
        true
    }

    fn try_table(&mut self, line: Line) -> bool {
        if !self.options.gfm || !line.text.contains('|') {
            return false;
        }
        let Some(alignments) = self
            .lines
            .peek_line()
            .and_then(|next| match_delimiter_row(next.text))
        else {
            return false;
        };

        self.close_paragraph();
        self.close_open_blocks();

        let table = self.open(NodeValue::Table(alignments.clone()), line);
        self.append_table_row(table, line, &alignments, true);

        let delimiter = self.lines.next_line().expect("peeked delimiter row");
        self.mark_line_consumed(delimiter);
        self.ast.node_mut(table).sourcepos.end =
            Self::line_range(delimiter).end;

        while let Some(next) = self.lines.peek_line() {
            if next.blank || !next.text.contains('|') {
                break;
            }
            let row_line = self.lines.next_line().expect("peeked data row");
            self.append_table_row(table, row_line, &alignments, false);
            self.ast.node_mut(table).sourcepos.end = Self::line_range(row_line).end;
        }
        true
    }

    fn append_table_row(
        &mut self,
        table: NodeId,
        line: Line,
        alignments: &[TableAlignment],
        header: bool,
    ) {
        let row = self
            .ast
            .alloc(NodeValue::TableRow(header), Self::line_range(line));
        self.ast.append(table, row);

        let cells = split_row(line.text);
        for col in 0..alignments.len() {
            let cell = self.ast.alloc(
                NodeValue::TableCell(NodeTableCell {
                    header,
                    alignment: alignments[col],
                }),
                Self::line_range(line),
            );
            if let Some(text) = cells.get(col) {
                self.ast.node_mut(cell).content.push_str(text);
            }
            self.ast.append(row, cell);
        }
    }

    fn try_definition_list(&mut self, line: Line) -> bool {
        if !self.options.definition_lists {
            return false;
        }
        let trimmed = line.text.trim_start();

        if matches!(self.ast.node(self.top()).value, NodeValue::DefinitionList) {
            if let Some(rest) = trimmed.strip_prefix(": ") {
                let list = self.top();
                let desc = self.ast.alloc(NodeValue::DefinitionDesc, Self::line_range(line));
                self.ast.node_mut(desc).content.push_str(rest.trim());
                self.ast.append(list, desc);
                self.mark_line_consumed(line);
                return true;
            }
            // A term line, recognized by the `: ` description that follows.
            let next_is_desc = self
                .lines
                .peek_line()
                .is_some_and(|next| next.text.trim_start().starts_with(": "));
            if next_is_desc {
                let list = self.top();
                let term = self.ast.alloc(NodeValue::DefinitionTerm, Self::line_range(line));
                self.ast.node_mut(term).content.push_str(trimmed);
                self.ast.append(list, term);
                self.mark_line_consumed(line);
                return true;
            }
            return false;
        }

        // `: desc` directly under a one-line paragraph turns it into a
        // definition list.
        let Some(rest) = trimmed.strip_prefix(": ") else {
            return false;
        };
        if !matches!(self.ast.node(self.top()).value, NodeValue::Paragraph) {
            return false;
        }
        let paragraph = self.top();
        if self.ast.node(paragraph).content.contains('\n') {
            return false;
        }

        self.pop_block();
        let term_text = std::mem::take(&mut self.ast.node_mut(paragraph).content);
        let range = self.ast.node(paragraph).sourcepos;
        let parent = self
            .ast
            .parent(paragraph)
            .expect("open paragraph has a parent");
        self.ast.detach(paragraph);

        let list = self.ast.alloc(NodeValue::DefinitionList, range);
        self.ast.append(parent, list);
        self.stack.push(list);

        let term = self.ast.alloc(NodeValue::DefinitionTerm, range);
        self.ast.node_mut(term).content.push_str(&term_text);
        self.ast.append(list, term);

        let desc = self.ast.alloc(NodeValue::DefinitionDesc, Self::line_range(line));
        self.ast.node_mut(desc).content.push_str(rest.trim());
        self.ast.append(list, desc);
        self.mark_line_consumed(line);
        true
    }
}
