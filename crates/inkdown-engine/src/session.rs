//! # Parser Session
//!
//! The stateful object a host drives across a sequence of parse, update and
//! render calls. Owns the current source buffer, the current document tree
//! and a rendered-HTML cache tagged with the source version it was rendered
//! from.
//!
//! `update` keeps the documented incremental contract (a `TextEdit` in, a
//! new tree out) but re-parses the whole spliced buffer; true incremental
//! re-parsing can later slot in behind the same interface.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::ast::value::NodeValue;
use crate::ast::{Ast, NodeId};
use crate::blocks::BlockParser;
use crate::error::EngineError;
use crate::inline::parse_all_inlines;
use crate::options::{ParserOptions, RenderOptions};
use crate::render::render_html;

/// A byte-range replacement against the previous source:
/// `[start_offset, end_offset)` is replaced by `new_text`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEdit {
    pub start_offset: usize,
    pub end_offset: usize,
    pub new_text: String,
}

impl TextEdit {
    pub fn new(start_offset: usize, end_offset: usize, new_text: impl Into<String>) -> Self {
        Self {
            start_offset,
            end_offset,
            new_text: new_text.into(),
        }
    }
}

/// Node-type occurrence counts over one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocStats {
    pub headings: usize,
    pub paragraphs: usize,
    pub code_blocks: usize,
    pub lists: usize,
    pub links: usize,
    pub images: usize,
    pub tables: usize,
    pub words: usize,
}

#[derive(Debug)]
struct CachedHtml {
    version: u64,
    options: RenderOptions,
    html: String,
}

/// One document's parse/update/render state. Not internally synchronized;
/// wrap in a lock for cross-thread use.
#[derive(Debug)]
pub struct ParserSession {
    options: ParserOptions,
    source: String,
    doc: Option<Ast>,
    source_version: u64,
    cache: Option<CachedHtml>,
}

impl ParserSession {
    pub fn new(options: ParserOptions) -> Self {
        Self {
            options,
            source: String::new(),
            doc: None,
            source_version: 0,
            cache: None,
        }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Monotonic counter, bumped by every successful parse or update.
    pub fn source_version(&self) -> u64 {
        self.source_version
    }

    pub fn document(&self) -> Option<&Ast> {
        self.doc.as_ref()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.doc.as_ref().map(Ast::root)
    }

    /// Discards any previous document and cache and parses `source` from
    /// scratch: block phase first, then the inline phase over every leaf
    /// block that carries inline content.
    pub fn parse(&mut self, source: &str) -> NodeId {
        let started = Instant::now();

        let mut ast = BlockParser::new(source, &self.options).run();
        parse_all_inlines(&mut ast, &self.options);

        self.source = source.to_string();
        self.source_version += 1;
        self.cache = None;
        let root = ast.root();
        log::trace!(
            "parsed {} bytes into {} nodes in {:?} (version {})",
            source.len(),
            ast.len(),
            started.elapsed(),
            self.source_version,
        );
        self.doc = Some(ast);
        root
    }

    /// Applies a byte-range edit by splicing the replacement into the owned
    /// source and re-parsing the result. With no document yet this is just
    /// `parse(edit.new_text)`.
    pub fn update(&mut self, edit: &TextEdit) -> Result<NodeId, EngineError> {
        if self.doc.is_none() {
            return Ok(self.parse(&edit.new_text));
        }

        let len = self.source.len();
        let start = edit.start_offset.min(len);
        let end = edit.end_offset.clamp(start, len);

        let mut spliced = Vec::with_capacity(len - (end - start) + edit.new_text.len());
        spliced.extend_from_slice(&self.source.as_bytes()[..start]);
        spliced.extend_from_slice(edit.new_text.as_bytes());
        spliced.extend_from_slice(&self.source.as_bytes()[end..]);

        let spliced = String::from_utf8(spliced).map_err(|_| EngineError::InvalidUtf8)?;
        Ok(self.parse(&spliced))
    }

    /// Renders the current document, reusing the cached HTML when it was
    /// rendered from the same source version with the same options.
    pub fn render_html(&mut self, options: &RenderOptions) -> Result<&str, EngineError> {
        let doc = self.doc.as_ref().ok_or(EngineError::ParseError)?;

        let fresh = match &self.cache {
            Some(cache) => cache.version != self.source_version || cache.options != *options,
            None => true,
        };
        if fresh {
            let started = Instant::now();
            let html = render_html(doc, options);
            log::trace!(
                "rendered {} bytes of html in {:?} (version {})",
                html.len(),
                started.elapsed(),
                self.source_version,
            );
            self.cache = Some(CachedHtml {
                version: self.source_version,
                options: options.clone(),
                html,
            });
        } else {
            log::trace!("render cache hit (version {})", self.source_version);
        }

        Ok(&self.cache.as_ref().expect("cache was just filled").html)
    }

    /// Single recursive walk counting node-type occurrences.
    pub fn doc_stats(&self) -> Result<DocStats, EngineError> {
        let doc = self.doc.as_ref().ok_or(EngineError::ParseError)?;
        let mut stats = DocStats::default();
        for id in doc.descendants(doc.root()) {
            match &doc.node(id).value {
                NodeValue::Heading(..) => stats.headings += 1,
                NodeValue::Paragraph => stats.paragraphs += 1,
                NodeValue::CodeBlock(..) | NodeValue::FencedCode(..) => stats.code_blocks += 1,
                NodeValue::List(..) => stats.lists += 1,
                NodeValue::Link(..) | NodeValue::Autolink(..) | NodeValue::WikiLink(..) => {
                    stats.links += 1
                }
                NodeValue::Image(..) => stats.images += 1,
                NodeValue::Table(..) => stats.tables += 1,
                NodeValue::Text(text) => stats.words += text.split_whitespace().count(),
                _ => {}
            }
        }
        Ok(stats)
    }
}

impl Default for ParserSession {
    fn default() -> Self {
        Self::new(ParserOptions::default())
    }
}
