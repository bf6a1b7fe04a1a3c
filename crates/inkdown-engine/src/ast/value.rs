//! Node payloads for every block, inline and extension construct.

/// The discriminated payload of an AST node. One variant per construct the
/// engine understands; the renderer and stats walk match exhaustively so a
/// new variant fails to compile until every consumer handles it.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    Document,
    Paragraph,
    Heading(NodeHeading),
    BlockQuote,
    /// Indented code. Never produced by the block parser today but kept as
    /// a distinct kind from fenced code since renderers treat the two info
    /// strings differently.
    CodeBlock(NodeCodeBlock),
    FencedCode(NodeCodeBlock),
    ThematicBreak,
    List(NodeList),
    ListItem,
    HtmlBlock(String),

    Text(String),
    SoftBreak,
    HardBreak,
    Emphasis,
    Strong,
    CodeSpan(String),
    Link(NodeLink),
    Image(NodeLink),
    HtmlInline(String),

    Strikethrough,
    Table(Vec<TableAlignment>),
    /// `true` for the header row.
    TableRow(bool),
    TableCell(NodeTableCell),
    TaskItem {
        checked: bool,
    },
    Autolink(NodeAutolink),

    MessageBox(NodeMessageBox),
    Accordion,
    AccordionItem {
        title: String,
    },
    MathInline(String),
    MathBlock(String),
    Mermaid(String),
    FootnoteRef(String),
    FootnoteDef(String),
    Toc,
    Highlight,
    Superscript,
    Subscript,
    DefinitionList,
    DefinitionTerm,
    DefinitionDesc,
    Abbr(NodeAbbr),
    WikiLink(NodeWikiLink),
    Emoji(NodeEmoji),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeHeading {
    /// 1 through 6.
    pub level: u8,
    /// Slug for the `id` attribute, when heading ids are enabled.
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeCodeBlock {
    /// Info string after the opening fence, e.g. `js` or `rust,ignore`.
    pub info: String,
    /// Verbatim body, newline-terminated lines.
    pub literal: String,
    pub fence_char: u8,
    pub fence_length: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListType {
    Bullet,
    Ordered,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeList {
    pub list_type: ListType,
    /// First number of an ordered list. 1 for bullet lists.
    pub start: u64,
    /// The marker byte that opened the list: `-`, `*`, `+`, `.` or `)`.
    pub marker: u8,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeLink {
    pub url: String,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableAlignment {
    #[default]
    None,
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeTableCell {
    pub header: bool,
    pub alignment: TableAlignment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeAutolink {
    pub url: String,
    pub email: bool,
}

/// Admonition keywords accepted after `:::`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxType {
    Note,
    Tip,
    Info,
    Warning,
    Danger,
    Success,
    Question,
    Quote,
    Caution,
    Important,
}

impl BoxType {
    /// Case-insensitive keyword lookup.
    pub fn from_keyword(word: &str) -> Option<Self> {
        let ty = match word.to_ascii_lowercase().as_str() {
            "note" => Self::Note,
            "tip" => Self::Tip,
            "info" => Self::Info,
            "warning" => Self::Warning,
            "danger" => Self::Danger,
            "success" => Self::Success,
            "question" => Self::Question,
            "quote" => Self::Quote,
            "caution" => Self::Caution,
            "important" => Self::Important,
            _ => return None,
        };
        Some(ty)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Note => "note",
            Self::Tip => "tip",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Danger => "danger",
            Self::Success => "success",
            Self::Question => "question",
            Self::Quote => "quote",
            Self::Caution => "caution",
            Self::Important => "important",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeMessageBox {
    pub box_type: BoxType,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeAbbr {
    pub label: String,
    pub expansion: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeWikiLink {
    pub target: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeEmoji {
    pub shortcode: String,
    /// Resolved unicode glyph, when the shortcode is known.
    pub glyph: Option<String>,
}

impl NodeValue {
    /// Whether this node is a block-level construct.
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeValue::Document
                | NodeValue::Paragraph
                | NodeValue::Heading(..)
                | NodeValue::BlockQuote
                | NodeValue::CodeBlock(..)
                | NodeValue::FencedCode(..)
                | NodeValue::ThematicBreak
                | NodeValue::List(..)
                | NodeValue::ListItem
                | NodeValue::TaskItem { .. }
                | NodeValue::HtmlBlock(..)
                | NodeValue::Table(..)
                | NodeValue::TableRow(..)
                | NodeValue::TableCell(..)
                | NodeValue::MessageBox(..)
                | NodeValue::Accordion
                | NodeValue::AccordionItem { .. }
                | NodeValue::MathBlock(..)
                | NodeValue::Mermaid(..)
                | NodeValue::FootnoteDef(..)
                | NodeValue::Toc
                | NodeValue::DefinitionList
                | NodeValue::DefinitionTerm
                | NodeValue::DefinitionDesc
                | NodeValue::Abbr(..)
        )
    }

    /// Whether the block's collected raw text goes through the inline
    /// parser.
    pub fn contains_inlines(&self) -> bool {
        matches!(
            self,
            NodeValue::Paragraph
                | NodeValue::Heading(..)
                | NodeValue::TableCell(..)
                | NodeValue::DefinitionTerm
                | NodeValue::DefinitionDesc
        )
    }

    /// Whether block parsing may append further children to this node.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            NodeValue::Document
                | NodeValue::BlockQuote
                | NodeValue::List(..)
                | NodeValue::ListItem
                | NodeValue::TaskItem { .. }
                | NodeValue::MessageBox(..)
                | NodeValue::Accordion
                | NodeValue::AccordionItem { .. }
                | NodeValue::FootnoteDef(..)
                | NodeValue::DefinitionList
        )
    }

    /// Short stable name used by the foreign boundary and stats.
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeValue::Document => "document",
            NodeValue::Paragraph => "paragraph",
            NodeValue::Heading(..) => "heading",
            NodeValue::BlockQuote => "blockquote",
            NodeValue::CodeBlock(..) => "code_block",
            NodeValue::FencedCode(..) => "fenced_code",
            NodeValue::ThematicBreak => "thematic_break",
            NodeValue::List(..) => "list",
            NodeValue::ListItem => "list_item",
            NodeValue::HtmlBlock(..) => "html_block",
            NodeValue::Text(..) => "text",
            NodeValue::SoftBreak => "soft_break",
            NodeValue::HardBreak => "hard_break",
            NodeValue::Emphasis => "emphasis",
            NodeValue::Strong => "strong",
            NodeValue::CodeSpan(..) => "code_span",
            NodeValue::Link(..) => "link",
            NodeValue::Image(..) => "image",
            NodeValue::HtmlInline(..) => "html_inline",
            NodeValue::Strikethrough => "strikethrough",
            NodeValue::Table(..) => "table",
            NodeValue::TableRow(..) => "table_row",
            NodeValue::TableCell(..) => "table_cell",
            NodeValue::TaskItem { .. } => "task_list_item",
            NodeValue::Autolink(..) => "autolink",
            NodeValue::MessageBox(..) => "message_box",
            NodeValue::Accordion => "accordion",
            NodeValue::AccordionItem { .. } => "accordion_item",
            NodeValue::MathInline(..) => "math_inline",
            NodeValue::MathBlock(..) => "math_block",
            NodeValue::Mermaid(..) => "mermaid",
            NodeValue::FootnoteRef(..) => "footnote_ref",
            NodeValue::FootnoteDef(..) => "footnote_def",
            NodeValue::Toc => "toc",
            NodeValue::Highlight => "highlight",
            NodeValue::Superscript => "superscript",
            NodeValue::Subscript => "subscript",
            NodeValue::DefinitionList => "definition_list",
            NodeValue::DefinitionTerm => "definition_term",
            NodeValue::DefinitionDesc => "definition_desc",
            NodeValue::Abbr(..) => "abbr",
            NodeValue::WikiLink(..) => "wiki_link",
            NodeValue::Emoji(..) => "emoji",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_type_keywords_case_insensitive() {
        assert_eq!(BoxType::from_keyword("note"), Some(BoxType::Note));
        assert_eq!(BoxType::from_keyword("WARNING"), Some(BoxType::Warning));
        assert_eq!(BoxType::from_keyword("Tip"), Some(BoxType::Tip));
        assert_eq!(BoxType::from_keyword("nope"), None);
    }

    #[test]
    fn test_block_inline_partition() {
        assert!(NodeValue::Paragraph.is_block());
        assert!(!NodeValue::Emphasis.is_block());
        assert!(NodeValue::Paragraph.contains_inlines());
        assert!(!NodeValue::ThematicBreak.contains_inlines());
    }

    #[test]
    fn test_type_names_are_snake_case() {
        assert_eq!(NodeValue::TaskItem { checked: false }.type_name(), "task_list_item");
        assert_eq!(NodeValue::SoftBreak.type_name(), "soft_break");
    }
}
