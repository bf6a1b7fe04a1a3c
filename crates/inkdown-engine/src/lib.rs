//! Core Markdown engine: scanner, two-phase block/inline parser, HTML
//! renderer and the [`ParserSession`] that ties them together for
//! embedding hosts.
//!
//! The engine is single-threaded and synchronous; a session owns its
//! source buffer, document tree and rendered-HTML cache, and carries no
//! global state, so independent sessions coexist freely.

pub mod ast;
pub mod blocks;
pub mod error;
pub mod inline;
pub mod options;
pub mod render;
pub mod scanner;
pub mod session;

// Re-export key types for easier usage
pub use ast::{Ast, Node, NodeId, Pos, SourceRange};
pub use ast::value::NodeValue;
pub use error::{EngineError, MAX_NESTING_DEPTH};
pub use options::{MathMode, ParserOptions, RenderOptions};
pub use render::render_html;
pub use session::{DocStats, ParserSession, TextEdit};
