use serde::{Deserialize, Serialize};

/// Parser configuration, captured once per parse.
///
/// A session copies the options it was created with into every parse, so
/// mutating a caller-side struct after session creation has no effect on an
/// in-flight document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// GFM extensions: strikethrough, tables, task-list items, autolinks.
    pub gfm: bool,
    /// `$...$` inline and `$$...$$` display math.
    pub math: bool,
    /// Route ```` ```mermaid ```` fences to a dedicated diagram node.
    pub mermaid: bool,
    /// `:::note` style admonition containers.
    pub message_boxes: bool,
    /// `:::accordion Title` collapsible sections.
    pub accordion: bool,
    /// `[^label]` references and `[^label]:` definitions.
    pub footnotes: bool,
    /// `[[target]]` and `[[target|alias]]` links.
    pub wiki_links: bool,
    /// `:shortcode:` emoji.
    pub emoji: bool,
    /// `==highlight==` marks.
    pub highlight: bool,
    /// `^sup^` and `~sub~`.
    pub super_subscript: bool,
    /// `*[ABBR]: expansion` definitions applied to matching text.
    pub abbreviations: bool,
    /// `Term` / `: description` lists.
    pub definition_lists: bool,
    /// `[toc]` marker replaced by a generated table of contents.
    pub toc: bool,
    /// Curly quotes, en/em dashes and ellipses in plain text.
    pub smart_punctuation: bool,
    /// Pass raw HTML through to the output instead of escaping it.
    pub html_passthrough: bool,
    /// Treat a backslash at end of line as a hard break.
    pub hard_break_on_backslash: bool,
    /// Generate `id` attributes on headings.
    pub heading_ids: bool,
    /// Visual width of a tab stop.
    pub tab_width: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            math: true,
            mermaid: true,
            message_boxes: true,
            accordion: true,
            footnotes: true,
            wiki_links: true,
            emoji: true,
            highlight: true,
            super_subscript: true,
            abbreviations: true,
            definition_lists: true,
            toc: true,
            smart_punctuation: false,
            html_passthrough: true,
            hard_break_on_backslash: true,
            heading_ids: true,
            tab_width: 4,
        }
    }
}

/// How math nodes are serialized to HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MathMode {
    /// Emit the dollar-delimited source verbatim.
    Raw,
    /// Emit `<span data-math="...">` placeholders for a client-side
    /// typesetting pass.
    #[default]
    DataAttr,
    /// Emit MathJax-style `\( \)` / `\[ \]` delimiters.
    MathJax,
}

/// Renderer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Escape `& < > " '` in text and attribute content.
    pub escape_html: bool,
    /// Self-close void elements (`<br />`) for XHTML consumers.
    pub xhtml: bool,
    /// Add `target="_blank"` and `rel="noopener noreferrer"` to external
    /// links.
    pub external_link_attrs: bool,
    pub math_mode: MathMode,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            escape_html: true,
            xhtml: false,
            external_link_attrs: true,
            math_mode: MathMode::default(),
        }
    }
}
