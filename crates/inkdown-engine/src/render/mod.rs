//! # HTML Rendering
//!
//! Tree-walking serialization of the AST into an HTML5 (or XHTML) fragment.
//! One match arm per node kind, exhaustive so new kinds fail to compile
//! until they render. Raw content passes through escaping unless disabled.
//!
//! Footnote definitions are not rendered in place: they are collected
//! during the walk and emitted once, in encounter order, in a trailing
//! `<section class="footnotes">`.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::ast::value::*;
use crate::ast::{Ast, NodeId};
use crate::options::{MathMode, RenderOptions};

/// Renders the document to an HTML fragment.
pub fn render_html(ast: &Ast, options: &RenderOptions) -> String {
    HtmlRenderer::new(ast, options).run()
}

struct TocEntry {
    level: u8,
    id: Option<String>,
    text: String,
}

struct HtmlRenderer<'a> {
    ast: &'a Ast,
    options: &'a RenderOptions,
    out: String,
    /// Footnote definitions in encounter order, deferred to the trailing
    /// section.
    footnotes: Vec<NodeId>,
    /// Collected abbreviation definitions, pre-escaped.
    abbrs: Vec<(String, String)>,
    toc: Vec<TocEntry>,
    has_toc_marker: bool,
    /// Occurrences per heading id, to suffix duplicates.
    heading_ids: HashMap<String, usize>,
}

impl<'a> HtmlRenderer<'a> {
    fn new(ast: &'a Ast, options: &'a RenderOptions) -> Self {
        Self {
            ast,
            options,
            out: String::new(),
            footnotes: Vec::new(),
            abbrs: Vec::new(),
            toc: Vec::new(),
            has_toc_marker: false,
            heading_ids: HashMap::new(),
        }
    }

    fn run(mut self) -> String {
        self.prescan();
        self.render_children(self.ast.root());
        self.render_footnote_section();
        self.out
    }

    /// Collects abbreviation definitions and, when a `[toc]` marker exists,
    /// the heading outline it will link to.
    fn prescan(&mut self) {
        let mut id_counts: HashMap<String, usize> = HashMap::new();
        for id in self.ast.descendants(self.ast.root()) {
            match &self.ast.node(id).value {
                NodeValue::Abbr(a) => {
                    self.abbrs.push((
                        self.escape(&a.label).into_owned(),
                        self.escape_attr(&a.expansion).into_owned(),
                    ));
                }
                NodeValue::Toc => self.has_toc_marker = true,
                NodeValue::Heading(h) => {
                    let unique = h.id.as_ref().map(|slug| unique_id(&mut id_counts, slug));
                    self.toc.push(TocEntry {
                        level: h.level,
                        id: unique,
                        text: self.plain_text(id),
                    });
                }
                _ => {}
            }
        }
    }

    // ---- escaping ----

    fn escape<'s>(&self, s: &'s str) -> Cow<'s, str> {
        if self.options.escape_html {
            html_escape::encode_quoted_attribute(s)
        } else {
            Cow::Borrowed(s)
        }
    }

    /// Attribute values stay escaped even when text escaping is disabled;
    /// a stray quote would otherwise break out of the attribute.
    fn escape_attr<'s>(&self, s: &'s str) -> Cow<'s, str> {
        html_escape::encode_quoted_attribute(s)
    }

    fn void_close(&self) -> &'static str {
        if self.options.xhtml { " />" } else { ">" }
    }

    /// Concatenated text content of a subtree, for alt text and toc labels.
    fn plain_text(&self, id: NodeId) -> String {
        let mut text = String::new();
        for node in self.ast.descendants(id) {
            match &self.ast.node(node).value {
                NodeValue::Text(s) | NodeValue::CodeSpan(s) => text.push_str(s),
                NodeValue::Emoji(e) => {
                    text.push_str(e.glyph.as_deref().unwrap_or(&e.shortcode))
                }
                NodeValue::Autolink(a) => text.push_str(&a.url),
                NodeValue::SoftBreak | NodeValue::HardBreak => text.push(' '),
                _ => {}
            }
        }
        text
    }

    // ---- tree walk ----

    fn render_children(&mut self, id: NodeId) {
        for child in self.ast.children(id).collect::<Vec<_>>() {
            self.render_node(child);
        }
    }

    fn render_node(&mut self, id: NodeId) {
        match &self.ast.node(id).value {
            NodeValue::Document => self.render_children(id),
            NodeValue::Paragraph => {
                self.out.push_str("<p>");
                self.render_children(id);
                self.out.push_str("</p>\n");
            }
            NodeValue::Heading(h) => {
                let level = h.level;
                let unique = h
                    .id
                    .as_ref()
                    .map(|slug| unique_id(&mut self.heading_ids, slug));
                self.out.push_str(&format!("<h{level}"));
                if let Some(slug) = unique {
                    self.out.push_str(&format!(" id=\"{slug}\""));
                }
                self.out.push('>');
                self.render_children(id);
                self.out.push_str(&format!("</h{level}>\n"));
            }
            NodeValue::BlockQuote => {
                self.out.push_str("<blockquote>\n");
                self.render_children(id);
                self.out.push_str("</blockquote>\n");
            }
            NodeValue::CodeBlock(cb) | NodeValue::FencedCode(cb) => {
                self.out.push_str("<pre><code");
                let lang = cb.info.split_whitespace().next().unwrap_or("");
                if !lang.is_empty() {
                    self.out
                        .push_str(&format!(" class=\"language-{}\"", self.escape_attr(lang)));
                }
                self.out.push('>');
                let literal = self.escape(&cb.literal).into_owned();
                self.out.push_str(&literal);
                self.out.push_str("</code></pre>\n");
            }
            NodeValue::ThematicBreak => {
                self.out.push_str("<hr");
                self.out.push_str(self.void_close());
                self.out.push('\n');
            }
            NodeValue::List(list) => {
                match list.list_type {
                    ListType::Bullet => {
                        self.out.push_str("<ul>\n");
                        self.render_children(id);
                        self.out.push_str("</ul>\n");
                    }
                    ListType::Ordered => {
                        // `start` only when it differs from 1.
                        if list.start == 1 {
                            self.out.push_str("<ol>\n");
                        } else {
                            self.out.push_str(&format!("<ol start=\"{}\">\n", list.start));
                        }
                        self.render_children(id);
                        self.out.push_str("</ol>\n");
                    }
                }
            }
            NodeValue::ListItem => {
                self.out.push_str("<li>");
                self.render_children(id);
                self.out.push_str("</li>\n");
            }
            NodeValue::TaskItem { checked } => {
                let checked = *checked;
                self.out.push_str("<li class=\"task-list-item\">");
                self.out.push_str("<input type=\"checkbox\" disabled=\"\"");
                if checked {
                    self.out.push_str(" checked=\"\"");
                }
                self.out.push_str(self.void_close());
                self.out.push(' ');
                self.render_children(id);
                self.out.push_str("</li>\n");
            }
            NodeValue::HtmlBlock(html) => {
                // Pass-through was decided at parse time; with the option
                // off these lines became paragraphs instead.
                self.out.push_str(html);
                self.out.push('\n');
            }
            NodeValue::Text(s) => {
                let escaped = self.escape(s).into_owned();
                let wrapped = self.apply_abbreviations(&escaped);
                self.out.push_str(&wrapped);
            }
            NodeValue::SoftBreak => self.out.push('\n'),
            NodeValue::HardBreak => {
                self.out.push_str("<br");
                self.out.push_str(self.void_close());
                self.out.push('\n');
            }
            NodeValue::Emphasis => self.wrap(id, "em"),
            NodeValue::Strong => self.wrap(id, "strong"),
            NodeValue::Strikethrough => self.wrap(id, "del"),
            NodeValue::Highlight => self.wrap(id, "mark"),
            NodeValue::Superscript => self.wrap(id, "sup"),
            NodeValue::Subscript => self.wrap(id, "sub"),
            NodeValue::CodeSpan(s) => {
                let escaped = self.escape(s).into_owned();
                self.out.push_str("<code>");
                self.out.push_str(&escaped);
                self.out.push_str("</code>");
            }
            NodeValue::Link(link) => {
                let link = link.clone();
                self.out
                    .push_str(&format!("<a href=\"{}\"", self.escape_attr(&link.url)));
                if let Some(title) = &link.title {
                    self.out
                        .push_str(&format!(" title=\"{}\"", self.escape_attr(title)));
                }
                if self.options.external_link_attrs && is_external_url(&link.url) {
                    self.out
                        .push_str(" target=\"_blank\" rel=\"noopener noreferrer\"");
                }
                self.out.push('>');
                self.render_children(id);
                self.out.push_str("</a>");
            }
            NodeValue::Image(image) => {
                let image = image.clone();
                let alt = self.plain_text(id);
                self.out
                    .push_str(&format!("<img src=\"{}\"", self.escape_attr(&image.url)));
                self.out
                    .push_str(&format!(" alt=\"{}\"", self.escape_attr(&alt)));
                if let Some(title) = &image.title {
                    self.out
                        .push_str(&format!(" title=\"{}\"", self.escape_attr(title)));
                }
                self.out.push_str(self.void_close());
            }
            NodeValue::HtmlInline(html) => {
                let html = html.clone();
                self.out.push_str(&html);
            }
            NodeValue::Autolink(auto) => {
                let auto = auto.clone();
                let href = if auto.email {
                    format!("mailto:{}", auto.url)
                } else {
                    auto.url.clone()
                };
                self.out
                    .push_str(&format!("<a href=\"{}\"", self.escape_attr(&href)));
                if self.options.external_link_attrs && is_external_url(&auto.url) {
                    self.out
                        .push_str(" target=\"_blank\" rel=\"noopener noreferrer\"");
                }
                self.out.push('>');
                let text = self.escape(&auto.url).into_owned();
                self.out.push_str(&text);
                self.out.push_str("</a>");
            }
            NodeValue::Table(_) => {
                self.out.push_str("<table>\n");
                let rows: Vec<NodeId> = self.ast.children(id).collect();
                let mut rows = rows.into_iter();
                if let Some(header) = rows.next() {
                    self.out.push_str("<thead>\n");
                    self.render_node(header);
                    self.out.push_str("</thead>\n");
                }
                let body: Vec<NodeId> = rows.collect();
                if !body.is_empty() {
                    self.out.push_str("<tbody>\n");
                    for row in body {
                        self.render_node(row);
                    }
                    self.out.push_str("</tbody>\n");
                }
                self.out.push_str("</table>\n");
            }
            NodeValue::TableRow(_) => {
                self.out.push_str("<tr>\n");
                self.render_children(id);
                self.out.push_str("</tr>\n");
            }
            NodeValue::TableCell(cell) => {
                let tag = if cell.header { "th" } else { "td" };
                let style = match cell.alignment {
                    TableAlignment::None => "",
                    TableAlignment::Left => " style=\"text-align:left\"",
                    TableAlignment::Center => " style=\"text-align:center\"",
                    TableAlignment::Right => " style=\"text-align:right\"",
                };
                self.out.push_str(&format!("<{tag}{style}>"));
                self.render_children(id);
                self.out.push_str(&format!("</{tag}>\n"));
            }
            NodeValue::MessageBox(mb) => {
                let box_type = mb.box_type.as_str();
                let title = mb.title.clone();
                self.out.push_str(&format!(
                    "<div class=\"message-box message-box-{box_type}\">\n"
                ));
                if let Some(title) = title {
                    let title = self.escape(&title).into_owned();
                    self.out
                        .push_str(&format!("<p class=\"message-box-title\">{title}</p>\n"));
                }
                self.render_children(id);
                self.out.push_str("</div>\n");
            }
            NodeValue::Accordion => {
                self.out.push_str("<div class=\"accordion\">\n");
                self.render_children(id);
                self.out.push_str("</div>\n");
            }
            NodeValue::AccordionItem { title } => {
                let title = self.escape(title).into_owned();
                self.out.push_str("<details>\n<summary>");
                self.out.push_str(&title);
                self.out.push_str("</summary>\n");
                self.render_children(id);
                self.out.push_str("</details>\n");
            }
            NodeValue::MathInline(src) => {
                let src = src.clone();
                match self.options.math_mode {
                    MathMode::Raw => {
                        let body = self.escape(&src).into_owned();
                        self.out.push_str(&format!("${body}$"));
                    }
                    MathMode::DataAttr => {
                        self.out.push_str(&format!(
                            "<span class=\"math\" data-math=\"{}\"></span>",
                            self.escape_attr(&src)
                        ));
                    }
                    MathMode::MathJax => {
                        let body = self.escape(&src).into_owned();
                        self.out.push_str(&format!("\\({body}\\)"));
                    }
                }
            }
            NodeValue::MathBlock(src) => {
                let src = src.clone();
                match self.options.math_mode {
                    MathMode::Raw => {
                        let body = self.escape(&src).into_owned();
                        self.out.push_str(&format!("$${body}$$"));
                    }
                    MathMode::DataAttr => {
                        self.out.push_str(&format!(
                            "<div class=\"math math-display\" data-math=\"{}\"></div>",
                            self.escape_attr(&src)
                        ));
                    }
                    MathMode::MathJax => {
                        let body = self.escape(&src).into_owned();
                        self.out.push_str(&format!("\\[{body}\\]"));
                    }
                }
            }
            NodeValue::Mermaid(body) => {
                let body = self.escape(body).into_owned();
                self.out.push_str("<div class=\"mermaid\">");
                self.out.push_str(&body);
                self.out.push_str("</div>\n");
            }
            NodeValue::FootnoteRef(label) => {
                let label = label.clone();
                self.out.push_str(&format!(
                    "<sup class=\"footnote-ref\"><a href=\"#fn-{0}\" id=\"fnref-{0}\">{1}</a></sup>",
                    self.escape_attr(&label),
                    self.escape(&label)
                ));
            }
            NodeValue::FootnoteDef(_) => {
                // Deferred: rendered after the main walk.
                self.footnotes.push(id);
            }
            NodeValue::Toc => self.render_toc(),
            NodeValue::DefinitionList => {
                self.out.push_str("<dl>\n");
                self.render_children(id);
                self.out.push_str("</dl>\n");
            }
            NodeValue::DefinitionTerm => {
                self.out.push_str("<dt>");
                self.render_children(id);
                self.out.push_str("</dt>\n");
            }
            NodeValue::DefinitionDesc => {
                self.out.push_str("<dd>");
                self.render_children(id);
                self.out.push_str("</dd>\n");
            }
            NodeValue::Abbr(_) => {
                // Definitions render nothing; occurrences are wrapped where
                // text is emitted.
            }
            NodeValue::WikiLink(wl) => {
                let wl = wl.clone();
                let label = wl.alias.as_deref().unwrap_or(&wl.target);
                let label = self.escape(label).into_owned();
                self.out.push_str(&format!(
                    "<a href=\"{}\" class=\"wiki-link\">{}</a>",
                    self.escape_attr(&wl.target),
                    label
                ));
            }
            NodeValue::Emoji(emoji) => match &emoji.glyph {
                Some(glyph) => self.out.push_str(glyph),
                None => {
                    let literal = format!(":{}:", emoji.shortcode);
                    let literal = self.escape(&literal).into_owned();
                    self.out.push_str(&literal);
                }
            },
        }
    }

    fn wrap(&mut self, id: NodeId, tag: &str) {
        self.out.push_str(&format!("<{tag}>"));
        self.render_children(id);
        self.out.push_str(&format!("</{tag}>"));
    }

    fn render_toc(&mut self) {
        if !self.has_toc_marker || self.toc.is_empty() {
            return;
        }
        self.out.push_str("<nav class=\"toc\">\n<ul>\n");
        for entry in &self.toc {
            let text = self.escape(&entry.text).into_owned();
            let level = entry.level;
            match &entry.id {
                Some(id) => self.out.push_str(&format!(
                    "<li class=\"toc-level-{level}\"><a href=\"#{id}\">{text}</a></li>\n"
                )),
                None => self
                    .out
                    .push_str(&format!("<li class=\"toc-level-{level}\">{text}</li>\n")),
            }
        }
        self.out.push_str("</ul>\n</nav>\n");
    }

    fn render_footnote_section(&mut self) {
        if self.footnotes.is_empty() {
            return;
        }
        self.out.push_str("<section class=\"footnotes\">\n<ol>\n");
        for def in std::mem::take(&mut self.footnotes) {
            let label = match &self.ast.node(def).value {
                NodeValue::FootnoteDef(label) => label.clone(),
                _ => continue,
            };
            self.out
                .push_str(&format!("<li id=\"fn-{}\">", self.escape_attr(&label)));
            self.render_children(def);
            self.out.push_str("</li>\n");
        }
        self.out.push_str("</ol>\n</section>\n");
    }

    /// Wraps whole-word occurrences of collected abbreviations in
    /// `<abbr>`. Runs on already-escaped text so labels match post-escape.
    fn apply_abbreviations(&self, text: &str) -> String {
        if self.abbrs.is_empty() {
            return text.to_string();
        }
        let mut result = text.to_string();
        for (label, expansion) in &self.abbrs {
            if label.is_empty() {
                continue;
            }
            let mut rebuilt = String::with_capacity(result.len());
            let mut rest = result.as_str();
            while let Some(at) = rest.find(label.as_str()) {
                let prev_char = if at == 0 {
                    rebuilt.chars().next_back()
                } else {
                    rest[..at].chars().next_back()
                };
                let before_ok = !prev_char.is_some_and(|c| c.is_alphanumeric());
                let after = &rest[at + label.len()..];
                let after_ok = !after.chars().next().is_some_and(|c| c.is_alphanumeric());
                rebuilt.push_str(&rest[..at]);
                if before_ok && after_ok {
                    rebuilt.push_str(&format!(
                        "<abbr title=\"{expansion}\">{label}</abbr>"
                    ));
                } else {
                    rebuilt.push_str(label);
                }
                rest = after;
            }
            rebuilt.push_str(rest);
            result = rebuilt;
        }
        result
    }
}

fn unique_id(counts: &mut HashMap<String, usize>, slug: &str) -> String {
    let n = counts.entry(slug.to_string()).or_insert(0);
    *n += 1;
    if *n == 1 {
        slug.to_string()
    } else {
        format!("{slug}-{n}")
    }
}

/// Absolute http(s) and protocol-relative URLs count as external.
fn is_external_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//")
}
