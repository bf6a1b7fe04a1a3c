//! C-ABI boundary for the inkdown engine.
//!
//! Host shells drive the engine through opaque handles and result codes;
//! nothing here exposes internal layout and nothing unwinds across the
//! boundary (every entry point catches panics and maps them to a result
//! code).
//!
//! Ownership contract: a parser handle owns its session, its node handles
//! and nothing else. Node handles are invalidated by the next
//! parse/update/destroy on their parser. The module owns one process-wide
//! last-error slot and one last-rendered-HTML slot, both overwritten on
//! every call — callers copy buffers out before the next call.

use std::ffi::{CStr, CString, c_char};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Mutex;

use inkdown_engine::ast::NodeId;
use inkdown_engine::{
    EngineError, MathMode, ParserOptions, ParserSession, RenderOptions, TextEdit,
};

/// Result codes returned by every boundary function.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InkdownResult {
    Ok = 0,
    InvalidArgument = 1,
    OutOfMemory = 2,
    ParseError = 3,
    RenderError = 4,
    InvalidHandle = 5,
}

static LAST_ERROR: Mutex<InkdownResult> = Mutex::new(InkdownResult::Ok);
static LAST_HTML: Mutex<Option<CString>> = Mutex::new(None);

fn set_last_error(code: InkdownResult) -> InkdownResult {
    // Recover from poisoned mutex (another thread panicked while holding
    // the lock).
    *LAST_ERROR.lock().unwrap_or_else(|e| e.into_inner()) = code;
    code
}

fn engine_error_code(err: &EngineError) -> InkdownResult {
    match err {
        EngineError::OutOfMemory => InkdownResult::OutOfMemory,
        EngineError::InvalidUtf8 => InkdownResult::InvalidArgument,
        EngineError::NestingTooDeep | EngineError::UnexpectedToken { .. } => {
            InkdownResult::ParseError
        }
        EngineError::ParseError => InkdownResult::ParseError,
        EngineError::RenderError(_) => InkdownResult::RenderError,
    }
}

// ============ Options structs ============

/// Fixed-layout mirror of the engine's parser options. Booleans are 0/1.
/// `inkdown_parse_options_default` fills in the documented defaults: every
/// extension on except smart punctuation, tab width 4, HTML passthrough
/// on, backslash hard breaks on, heading ids on.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct InkdownParseOptions {
    pub gfm: u8,
    pub math: u8,
    pub mermaid: u8,
    pub message_boxes: u8,
    pub accordion: u8,
    pub footnotes: u8,
    pub wiki_links: u8,
    pub emoji: u8,
    pub highlight: u8,
    pub super_subscript: u8,
    pub abbreviations: u8,
    pub definition_lists: u8,
    pub toc: u8,
    pub smart_punctuation: u8,
    pub html_passthrough: u8,
    pub hard_break_on_backslash: u8,
    pub heading_ids: u8,
    pub tab_width: u32,
}

impl From<&InkdownParseOptions> for ParserOptions {
    fn from(c: &InkdownParseOptions) -> Self {
        Self {
            gfm: c.gfm != 0,
            math: c.math != 0,
            mermaid: c.mermaid != 0,
            message_boxes: c.message_boxes != 0,
            accordion: c.accordion != 0,
            footnotes: c.footnotes != 0,
            wiki_links: c.wiki_links != 0,
            emoji: c.emoji != 0,
            highlight: c.highlight != 0,
            super_subscript: c.super_subscript != 0,
            abbreviations: c.abbreviations != 0,
            definition_lists: c.definition_lists != 0,
            toc: c.toc != 0,
            smart_punctuation: c.smart_punctuation != 0,
            html_passthrough: c.html_passthrough != 0,
            hard_break_on_backslash: c.hard_break_on_backslash != 0,
            heading_ids: c.heading_ids != 0,
            tab_width: c.tab_width as usize,
        }
    }
}

fn parse_options_from(ptr: *const InkdownParseOptions) -> ParserOptions {
    if ptr.is_null() {
        ParserOptions::default()
    } else {
        ParserOptions::from(unsafe { &*ptr })
    }
}

/// Math mode values for [`InkdownRenderOptions::math_mode`].
pub const INKDOWN_MATH_RAW: u32 = 0;
pub const INKDOWN_MATH_DATA_ATTR: u32 = 1;
pub const INKDOWN_MATH_MATHJAX: u32 = 2;

/// Fixed-layout mirror of the engine's render options. Defaults: escaping
/// on, HTML5 tags, external-link attributes on, data-attribute math.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct InkdownRenderOptions {
    pub escape_html: u8,
    pub xhtml: u8,
    pub external_link_attrs: u8,
    pub math_mode: u32,
}

impl From<&InkdownRenderOptions> for RenderOptions {
    fn from(c: &InkdownRenderOptions) -> Self {
        Self {
            escape_html: c.escape_html != 0,
            xhtml: c.xhtml != 0,
            external_link_attrs: c.external_link_attrs != 0,
            math_mode: match c.math_mode {
                INKDOWN_MATH_RAW => MathMode::Raw,
                INKDOWN_MATH_MATHJAX => MathMode::MathJax,
                _ => MathMode::DataAttr,
            },
        }
    }
}

fn render_options_from(ptr: *const InkdownRenderOptions) -> RenderOptions {
    if ptr.is_null() {
        RenderOptions::default()
    } else {
        RenderOptions::from(unsafe { &*ptr })
    }
}

/// Fills an options struct with the documented defaults.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn inkdown_parse_options_default(out: *mut InkdownParseOptions) {
    if out.is_null() {
        return;
    }
    let d = ParserOptions::default();
    let c = InkdownParseOptions {
        gfm: d.gfm as u8,
        math: d.math as u8,
        mermaid: d.mermaid as u8,
        message_boxes: d.message_boxes as u8,
        accordion: d.accordion as u8,
        footnotes: d.footnotes as u8,
        wiki_links: d.wiki_links as u8,
        emoji: d.emoji as u8,
        highlight: d.highlight as u8,
        super_subscript: d.super_subscript as u8,
        abbreviations: d.abbreviations as u8,
        definition_lists: d.definition_lists as u8,
        toc: d.toc as u8,
        smart_punctuation: d.smart_punctuation as u8,
        html_passthrough: d.html_passthrough as u8,
        hard_break_on_backslash: d.hard_break_on_backslash as u8,
        heading_ids: d.heading_ids as u8,
        tab_width: d.tab_width as u32,
    };
    unsafe { out.write(c) };
}

// ============ Handles ============

/// Opaque parser-session handle.
pub struct InkdownParser {
    session: ParserSession,
    /// Every node handle issued from this parser. Handles stay allocated
    /// until the parser is destroyed so that a stale pointer from before a
    /// re-parse still resolves to a clean `InvalidHandle` instead of a
    /// dangling read; the version field marks them dead.
    handles: Vec<Box<InkdownNode>>,
}

/// Opaque AST-node handle, owned by its parser.
pub struct InkdownNode {
    parser: *mut InkdownParser,
    id: NodeId,
    /// Source version the handle was issued for; a mismatch means the
    /// document has been re-parsed since.
    version: u64,
}

fn issue_handle(parser_ptr: *mut InkdownParser, id: NodeId) -> *const InkdownNode {
    let parser = unsafe { &mut *parser_ptr };
    let handle = Box::new(InkdownNode {
        parser: parser_ptr,
        id,
        version: parser.session.source_version(),
    });
    let raw = &*handle as *const InkdownNode;
    parser.handles.push(handle);
    raw
}

/// Copies a node handle's fields out and checks it against the current
/// document. Returns the parser pointer and node id when still valid.
fn resolve_handle(node: *const InkdownNode) -> Result<(*mut InkdownParser, NodeId), InkdownResult> {
    if node.is_null() {
        return Err(InkdownResult::InvalidArgument);
    }
    let (parser_ptr, id, version) = {
        let n = unsafe { &*node };
        (n.parser, n.id, n.version)
    };
    if parser_ptr.is_null() {
        return Err(InkdownResult::InvalidHandle);
    }
    let parser = unsafe { &*parser_ptr };
    if parser.session.source_version() != version || parser.session.document().is_none() {
        return Err(InkdownResult::InvalidHandle);
    }
    Ok((parser_ptr, id))
}

// ============ Lifecycle ============

/// Creates a parser session. `options` may be null for defaults. Returns
/// null (with the last error set) on failure.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn inkdown_parser_create(
    options: *const InkdownParseOptions,
) -> *mut InkdownParser {
    let created = catch_unwind(AssertUnwindSafe(|| {
        let opts = parse_options_from(options);
        Box::new(InkdownParser {
            session: ParserSession::new(opts),
            handles: Vec::new(),
        })
    }));
    match created {
        Ok(parser) => {
            set_last_error(InkdownResult::Ok);
            log::debug!("inkdown parser created");
            Box::into_raw(parser)
        }
        Err(_) => {
            set_last_error(InkdownResult::OutOfMemory);
            std::ptr::null_mut()
        }
    }
}

/// Destroys a parser session, its document and every node handle issued
/// from it.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn inkdown_parser_destroy(parser: *mut InkdownParser) -> InkdownResult {
    if parser.is_null() {
        return set_last_error(InkdownResult::InvalidArgument);
    }
    drop(unsafe { Box::from_raw(parser) });
    log::debug!("inkdown parser destroyed");
    set_last_error(InkdownResult::Ok)
}

// ============ Parsing ============

fn checked_utf8<'a>(bytes: *const u8, len: usize) -> Result<&'a str, InkdownResult> {
    if bytes.is_null() && len > 0 {
        return Err(InkdownResult::InvalidArgument);
    }
    if len == 0 {
        return Ok("");
    }
    let slice = unsafe { std::slice::from_raw_parts(bytes, len) };
    std::str::from_utf8(slice).map_err(|_| InkdownResult::InvalidArgument)
}

/// Parses `bytes` into a fresh document, returning a handle to its root,
/// or null with the last error set.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn inkdown_parse(
    parser: *mut InkdownParser,
    bytes: *const u8,
    len: usize,
) -> *const InkdownNode {
    if parser.is_null() {
        set_last_error(InkdownResult::InvalidArgument);
        return std::ptr::null();
    }
    let source = match checked_utf8(bytes, len) {
        Ok(source) => source,
        Err(code) => {
            set_last_error(code);
            return std::ptr::null();
        }
    };

    let parsed = catch_unwind(AssertUnwindSafe(|| {
        let p = unsafe { &mut *parser };
        let root = p.session.parse(source);
        issue_handle(parser, root)
    }));
    match parsed {
        Ok(root) => {
            set_last_error(InkdownResult::Ok);
            root
        }
        Err(_) => {
            set_last_error(InkdownResult::ParseError);
            std::ptr::null()
        }
    }
}

/// Applies a byte-range edit (`[start_offset, end_offset)` replaced by
/// `bytes`) and re-parses. Returns the new root handle or null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn inkdown_update(
    parser: *mut InkdownParser,
    start_offset: usize,
    end_offset: usize,
    bytes: *const u8,
    len: usize,
) -> *const InkdownNode {
    if parser.is_null() {
        set_last_error(InkdownResult::InvalidArgument);
        return std::ptr::null();
    }
    let new_text = match checked_utf8(bytes, len) {
        Ok(text) => text,
        Err(code) => {
            set_last_error(code);
            return std::ptr::null();
        }
    };

    let updated = catch_unwind(AssertUnwindSafe(|| {
        let p = unsafe { &mut *parser };
        let edit = TextEdit::new(start_offset, end_offset, new_text);
        p.session.update(&edit).map(|root| issue_handle(parser, root))
    }));
    match updated {
        Ok(Ok(root)) => {
            set_last_error(InkdownResult::Ok);
            root
        }
        Ok(Err(err)) => {
            set_last_error(engine_error_code(&err));
            std::ptr::null()
        }
        Err(_) => {
            set_last_error(InkdownResult::ParseError);
            std::ptr::null()
        }
    }
}

// ============ Rendering ============

fn store_html(html: &str, out_ptr: *mut *const c_char, out_len: *mut usize) -> InkdownResult {
    let Ok(cstring) = CString::new(html) else {
        return InkdownResult::RenderError;
    };
    let len = cstring.as_bytes().len();
    let mut slot = LAST_HTML.lock().unwrap_or_else(|e| e.into_inner());
    *slot = Some(cstring);
    let ptr = slot.as_ref().expect("slot was just filled").as_ptr();
    unsafe {
        if !out_ptr.is_null() {
            out_ptr.write(ptr);
        }
        if !out_len.is_null() {
            out_len.write(len);
        }
    }
    InkdownResult::Ok
}

/// Renders the parser's current document. The returned buffer lives in the
/// process-wide last-rendered slot and is overwritten by the next render.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn inkdown_render_html(
    parser: *mut InkdownParser,
    options: *const InkdownRenderOptions,
    out_ptr: *mut *const c_char,
    out_len: *mut usize,
) -> InkdownResult {
    if parser.is_null() {
        return set_last_error(InkdownResult::InvalidArgument);
    }
    let opts = render_options_from(options);

    let rendered = catch_unwind(AssertUnwindSafe(|| {
        let p = unsafe { &mut *parser };
        p.session.render_html(&opts).map(str::to_string)
    }));
    match rendered {
        Ok(Ok(html)) => set_last_error(store_html(&html, out_ptr, out_len)),
        Ok(Err(err)) => set_last_error(engine_error_code(&err)),
        Err(_) => set_last_error(InkdownResult::RenderError),
    }
}

/// Stateless one-shot convenience: parse `bytes` and render them without
/// keeping a session.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn inkdown_quick_render(
    bytes: *const u8,
    len: usize,
    parse_options: *const InkdownParseOptions,
    render_options: *const InkdownRenderOptions,
    out_ptr: *mut *const c_char,
    out_len: *mut usize,
) -> InkdownResult {
    let source = match checked_utf8(bytes, len) {
        Ok(source) => source,
        Err(code) => return set_last_error(code),
    };
    let popts = parse_options_from(parse_options);
    let ropts = render_options_from(render_options);

    let rendered = catch_unwind(AssertUnwindSafe(|| {
        let mut session = ParserSession::new(popts);
        session.parse(source);
        session.render_html(&ropts).map(str::to_string)
    }));
    match rendered {
        Ok(Ok(html)) => set_last_error(store_html(&html, out_ptr, out_len)),
        Ok(Err(err)) => set_last_error(engine_error_code(&err)),
        Err(_) => set_last_error(InkdownResult::RenderError),
    }
}

// ============ Node inspection ============

/// Fixed-layout node description filled by [`inkdown_node_info`].
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct InkdownNodeInfo {
    /// Static NUL-terminated type name, e.g. `"heading"`.
    pub type_name: *const c_char,
    pub start_line: u32,
    pub start_column: u32,
    pub start_offset: u64,
    pub end_line: u32,
    pub end_column: u32,
    pub end_offset: u64,
    pub child_count: u32,
    /// Raw content bytes for literal kinds (text, code, math, HTML),
    /// null/0 otherwise. Valid until the next parse on this parser.
    pub content_ptr: *const u8,
    pub content_len: usize,
}

fn type_cstr(name: &'static str) -> *const c_char {
    // The engine's type names are a closed set of static snake_case
    // strings; map them to NUL-terminated statics for C consumers.
    macro_rules! known {
        ($($n:literal),+ $(,)?) => {
            match name {
                $($n => concat!($n, "\0").as_ptr() as *const c_char,)+
                _ => c"unknown".as_ptr(),
            }
        };
    }
    known!(
        "document",
        "paragraph",
        "heading",
        "blockquote",
        "code_block",
        "fenced_code",
        "thematic_break",
        "list",
        "list_item",
        "html_block",
        "text",
        "soft_break",
        "hard_break",
        "emphasis",
        "strong",
        "code_span",
        "link",
        "image",
        "html_inline",
        "strikethrough",
        "table",
        "table_row",
        "table_cell",
        "task_list_item",
        "autolink",
        "message_box",
        "accordion",
        "accordion_item",
        "math_inline",
        "math_block",
        "mermaid",
        "footnote_ref",
        "footnote_def",
        "toc",
        "highlight",
        "superscript",
        "subscript",
        "definition_list",
        "definition_term",
        "definition_desc",
        "abbr",
        "wiki_link",
        "emoji",
    )
}

/// Fills `out` with the node's type, source range, child count and raw
/// content (when the kind carries any).
#[unsafe(no_mangle)]
pub unsafe extern "C" fn inkdown_node_info(
    node: *const InkdownNode,
    out: *mut InkdownNodeInfo,
) -> InkdownResult {
    if out.is_null() {
        return set_last_error(InkdownResult::InvalidArgument);
    }
    let (parser_ptr, id) = match resolve_handle(node) {
        Ok(resolved) => resolved,
        Err(code) => return set_last_error(code),
    };
    let parser = unsafe { &*parser_ptr };
    let Some(doc) = parser.session.document() else {
        return set_last_error(InkdownResult::InvalidHandle);
    };

    let n = doc.node(id);
    let (content_ptr, content_len) = match n.raw_content() {
        Some(content) => (content.as_ptr(), content.len()),
        None => (std::ptr::null(), 0),
    };
    let info = InkdownNodeInfo {
        type_name: type_cstr(n.value.type_name()),
        start_line: n.sourcepos.start.line as u32,
        start_column: n.sourcepos.start.column as u32,
        start_offset: n.sourcepos.start.offset as u64,
        end_line: n.sourcepos.end.line as u32,
        end_column: n.sourcepos.end.column as u32,
        end_offset: n.sourcepos.end.offset as u64,
        child_count: doc.child_count(id) as u32,
        content_ptr,
        content_len,
    };
    unsafe { out.write(info) };
    set_last_error(InkdownResult::Ok)
}

fn traverse(
    node: *const InkdownNode,
    step: impl Fn(&inkdown_engine::Ast, NodeId) -> Option<NodeId>,
) -> *const InkdownNode {
    let (parser_ptr, id) = match resolve_handle(node) {
        Ok(resolved) => resolved,
        Err(code) => {
            set_last_error(code);
            return std::ptr::null();
        }
    };
    let parser = unsafe { &*parser_ptr };
    let Some(doc) = parser.session.document() else {
        set_last_error(InkdownResult::InvalidHandle);
        return std::ptr::null();
    };
    set_last_error(InkdownResult::Ok);
    match step(doc, id) {
        Some(next) => issue_handle(parser_ptr, next),
        None => std::ptr::null(),
    }
}

/// First child of a node, or null. A null return with last error `Ok`
/// means "no such node" rather than failure.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn inkdown_node_first_child(node: *const InkdownNode) -> *const InkdownNode {
    traverse(node, |doc, id| doc.first_child(id))
}

/// Next sibling of a node, or null.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn inkdown_node_next(node: *const InkdownNode) -> *const InkdownNode {
    traverse(node, |doc, id| doc.next_sibling(id))
}

/// Parent of a node, or null for the root.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn inkdown_node_parent(node: *const InkdownNode) -> *const InkdownNode {
    traverse(node, |doc, id| doc.parent(id))
}

// ============ Statistics ============

/// Fixed-layout mirror of the engine's document statistics.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct InkdownDocStats {
    pub headings: u64,
    pub paragraphs: u64,
    pub code_blocks: u64,
    pub lists: u64,
    pub links: u64,
    pub images: u64,
    pub tables: u64,
    pub words: u64,
}

/// Fills `out` with node-type counts for the current document.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn inkdown_doc_stats(
    parser: *const InkdownParser,
    out: *mut InkdownDocStats,
) -> InkdownResult {
    if parser.is_null() || out.is_null() {
        return set_last_error(InkdownResult::InvalidArgument);
    }
    let p = unsafe { &*parser };
    match p.session.doc_stats() {
        Ok(stats) => {
            let c = InkdownDocStats {
                headings: stats.headings as u64,
                paragraphs: stats.paragraphs as u64,
                code_blocks: stats.code_blocks as u64,
                lists: stats.lists as u64,
                links: stats.links as u64,
                images: stats.images as u64,
                tables: stats.tables as u64,
                words: stats.words as u64,
            };
            unsafe { out.write(c) };
            set_last_error(InkdownResult::Ok)
        }
        Err(err) => set_last_error(engine_error_code(&err)),
    }
}

/// Deepest container nesting the engine handles. The parser does not
/// enforce this during descent; hosts feeding untrusted input should bound
/// nesting on their side.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn inkdown_max_nesting_depth() -> usize {
    inkdown_engine::MAX_NESTING_DEPTH
}

// ============ Error reporting ============

/// The result code of the most recent call on any parser in this process.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn inkdown_last_error() -> InkdownResult {
    *LAST_ERROR.lock().unwrap_or_else(|e| e.into_inner())
}

/// Static human-readable message for a result code.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn inkdown_error_message(code: InkdownResult) -> *const c_char {
    let message: &CStr = match code {
        InkdownResult::Ok => c"ok",
        InkdownResult::InvalidArgument => c"invalid argument",
        InkdownResult::OutOfMemory => c"out of memory",
        InkdownResult::ParseError => c"parse error: no document or malformed input",
        InkdownResult::RenderError => c"render error",
        InkdownResult::InvalidHandle => c"invalid or stale handle",
    };
    message.as_ptr()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render_to_string(parser: *mut InkdownParser) -> String {
        let mut ptr: *const c_char = std::ptr::null();
        let mut len: usize = 0;
        let code = unsafe {
            inkdown_render_html(parser, std::ptr::null(), &mut ptr, &mut len)
        };
        assert_eq!(code, InkdownResult::Ok);
        let html = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap().to_string();
        assert_eq!(html.len(), len);
        html
    }

    #[test]
    fn test_create_parse_render_destroy() {
        let parser = unsafe { inkdown_parser_create(std::ptr::null()) };
        assert!(!parser.is_null());

        let source = b"# Hello\n\nWorld";
        let root = unsafe { inkdown_parse(parser, source.as_ptr(), source.len()) };
        assert!(!root.is_null());

        let html = render_to_string(parser);
        assert!(html.contains("<h1"));
        assert!(html.contains("<p>World</p>"));

        assert_eq!(
            unsafe { inkdown_parser_destroy(parser) },
            InkdownResult::Ok
        );
    }

    #[test]
    fn test_null_parser_is_invalid_argument() {
        let code = unsafe {
            inkdown_render_html(
                std::ptr::null_mut(),
                std::ptr::null(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
            )
        };
        assert_eq!(code, InkdownResult::InvalidArgument);
        assert_eq!(unsafe { inkdown_last_error() }, InkdownResult::InvalidArgument);
    }

    #[test]
    fn test_render_before_parse_is_parse_error() {
        let parser = unsafe { inkdown_parser_create(std::ptr::null()) };
        let code = unsafe {
            inkdown_render_html(
                parser,
                std::ptr::null(),
                std::ptr::null_mut(),
                std::ptr::null_mut(),
            )
        };
        assert_eq!(code, InkdownResult::ParseError);
        unsafe { inkdown_parser_destroy(parser) };
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let parser = unsafe { inkdown_parser_create(std::ptr::null()) };
        let bad = [0xffu8, 0xfe];
        let root = unsafe { inkdown_parse(parser, bad.as_ptr(), bad.len()) };
        assert!(root.is_null());
        assert_eq!(unsafe { inkdown_last_error() }, InkdownResult::InvalidArgument);
        unsafe { inkdown_parser_destroy(parser) };
    }

    #[test]
    fn test_node_traversal_and_info() {
        let parser = unsafe { inkdown_parser_create(std::ptr::null()) };
        let source = b"# Title\n\nBody";
        let root = unsafe { inkdown_parse(parser, source.as_ptr(), source.len()) };

        let mut info = std::mem::MaybeUninit::<InkdownNodeInfo>::uninit();
        let code = unsafe { inkdown_node_info(root, info.as_mut_ptr()) };
        assert_eq!(code, InkdownResult::Ok);
        let info = unsafe { info.assume_init() };
        let name = unsafe { CStr::from_ptr(info.type_name) }.to_str().unwrap();
        assert_eq!(name, "document");
        assert_eq!(info.child_count, 2);

        let heading = unsafe { inkdown_node_first_child(root) };
        assert!(!heading.is_null());
        let mut hinfo = std::mem::MaybeUninit::<InkdownNodeInfo>::uninit();
        unsafe { inkdown_node_info(heading, hinfo.as_mut_ptr()) };
        let hinfo = unsafe { hinfo.assume_init() };
        let hname = unsafe { CStr::from_ptr(hinfo.type_name) }.to_str().unwrap();
        assert_eq!(hname, "heading");

        let paragraph = unsafe { inkdown_node_next(heading) };
        assert!(!paragraph.is_null());
        let back = unsafe { inkdown_node_parent(paragraph) };
        assert!(!back.is_null());

        // Past the last sibling: null, but not an error.
        let nothing = unsafe { inkdown_node_next(paragraph) };
        assert!(nothing.is_null());
        assert_eq!(unsafe { inkdown_last_error() }, InkdownResult::Ok);

        unsafe { inkdown_parser_destroy(parser) };
    }

    #[test]
    fn test_stale_handle_detected_after_reparse() {
        let parser = unsafe { inkdown_parser_create(std::ptr::null()) };
        let first = b"one";
        let root = unsafe { inkdown_parse(parser, first.as_ptr(), first.len()) };
        assert!(!root.is_null());

        let second = b"two";
        let new_root = unsafe { inkdown_parse(parser, second.as_ptr(), second.len()) };
        assert!(!new_root.is_null());

        // The pre-reparse handle is version-stale.
        let stale = unsafe { inkdown_node_first_child(root) };
        assert!(stale.is_null());
        assert_eq!(unsafe { inkdown_last_error() }, InkdownResult::InvalidHandle);

        let child = unsafe { inkdown_node_first_child(new_root) };
        assert!(!child.is_null());

        unsafe { inkdown_parser_destroy(parser) };
    }

    #[test]
    fn test_update_splices_source() {
        let parser = unsafe { inkdown_parser_create(std::ptr::null()) };
        let source = b"Hello world";
        unsafe { inkdown_parse(parser, source.as_ptr(), source.len()) };

        let replacement = b"Zig";
        let root = unsafe {
            inkdown_update(parser, 6, 11, replacement.as_ptr(), replacement.len())
        };
        assert!(!root.is_null());

        let html = render_to_string(parser);
        assert!(html.contains("Zig"));
        assert!(!html.contains("world"));

        unsafe { inkdown_parser_destroy(parser) };
    }

    #[test]
    fn test_quick_render_is_stateless() {
        let source = b"**bold**";
        let mut ptr: *const c_char = std::ptr::null();
        let mut len: usize = 0;
        let code = unsafe {
            inkdown_quick_render(
                source.as_ptr(),
                source.len(),
                std::ptr::null(),
                std::ptr::null(),
                &mut ptr,
                &mut len,
            )
        };
        assert_eq!(code, InkdownResult::Ok);
        let html = unsafe { CStr::from_ptr(ptr) }.to_str().unwrap();
        assert_eq!(html, "<p><strong>bold</strong></p>\n");
    }

    #[test]
    fn test_doc_stats() {
        let parser = unsafe { inkdown_parser_create(std::ptr::null()) };
        let source = b"# H\n\npara\n\n- a\n- b";
        unsafe { inkdown_parse(parser, source.as_ptr(), source.len()) };

        let mut stats = InkdownDocStats::default();
        let code = unsafe { inkdown_doc_stats(parser, &mut stats) };
        assert_eq!(code, InkdownResult::Ok);
        assert_eq!(stats.headings, 1);
        assert_eq!(stats.lists, 1);

        unsafe { inkdown_parser_destroy(parser) };
    }

    #[test]
    fn test_error_messages_are_static_strings() {
        let message = unsafe { inkdown_error_message(InkdownResult::InvalidHandle) };
        let text = unsafe { CStr::from_ptr(message) }.to_str().unwrap();
        assert_eq!(text, "invalid or stale handle");
    }

    #[test]
    fn test_custom_options_cross_the_boundary() {
        let mut options = std::mem::MaybeUninit::<InkdownParseOptions>::uninit();
        unsafe { inkdown_parse_options_default(options.as_mut_ptr()) };
        let mut options = unsafe { options.assume_init() };
        assert_eq!(options.smart_punctuation, 0);
        assert_eq!(options.tab_width, 4);

        options.gfm = 0;
        let parser = unsafe { inkdown_parser_create(&options) };
        let source = b"~~not struck~~";
        unsafe { inkdown_parse(parser, source.as_ptr(), source.len()) };
        let html = render_to_string(parser);
        assert!(!html.contains("<del>"));
        unsafe { inkdown_parser_destroy(parser) };
    }
}
