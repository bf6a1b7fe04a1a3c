//! Emphasis delimiter runs and bracket tracking.
//!
//! Delimiter runs are recorded during the scan and resolved in a single
//! post-pass once the whole block has been consumed. The resolution is a
//! simplified variant of the CommonMark algorithm: each closer scans
//! backward for the nearest compatible opener and consumes
//! `min(opener, closer, 2)` delimiters per match. It does not track
//! "fully processed" stack bottoms across passes, so pathological nested
//! inputs can resolve differently from a fully conformant implementation.

use crate::ast::{Ast, NodeId, NodeValue, SourceRange};

/// One recorded emphasis delimiter run.
#[derive(Debug)]
pub(crate) struct Delimiter {
    /// Placeholder text node holding the literal run.
    pub node: NodeId,
    /// `*` or `_`.
    pub ch: u8,
    /// Delimiters remaining in the run.
    pub count: usize,
    pub can_open: bool,
    pub can_close: bool,
}

/// One open `[` / `![` waiting for its `]`.
#[derive(Debug)]
pub(crate) struct Bracket {
    /// Placeholder text node for the opening bracket.
    pub node: NodeId,
    pub image: bool,
    pub active: bool,
}

fn is_ws(b: Option<u8>) -> bool {
    // Start/end of block counts as whitespace for flanking purposes.
    b.is_none_or(|b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'))
}

fn is_punct(b: Option<u8>) -> bool {
    b.is_some_and(|b| b.is_ascii_punctuation())
}

/// Left-/right-flanking status of a run of `ch` with the given neighbor
/// bytes, per the standard flanking rule. Underscore additionally gets the
/// intraword restriction.
pub(crate) fn flanking(before: Option<u8>, after: Option<u8>, ch: u8) -> (bool, bool) {
    let left = !is_ws(after) && (!is_punct(after) || is_ws(before) || is_punct(before));
    let right = !is_ws(before) && (!is_punct(before) || is_ws(after) || is_punct(after));

    if ch == b'_' {
        (
            left && (!right || is_punct(before)),
            right && (!left || is_punct(after)),
        )
    } else {
        (left, right)
    }
}

fn set_run_text(ast: &mut Ast, node: NodeId, ch: u8, count: usize) {
    let text = String::from_utf8(vec![ch; count]).expect("delimiter chars are ASCII");
    if let NodeValue::Text(s) = &mut ast.node_mut(node).value {
        *s = text;
    }
}

/// Resolves emphasis and strong emphasis over the recorded delimiter runs.
///
/// Closers are visited left to right; each scans backward for the nearest
/// compatible opener still holding delimiters. `min(opener, closer, 2)`
/// delimiters are consumed per match, so a pair of triple runs yields one
/// strong plus one leftover emphasis. Exhausted placeholder nodes are
/// unlinked from the tree.
pub(crate) fn process_emphasis(ast: &mut Ast, delims: &mut [Delimiter]) {
    for i in 0..delims.len() {
        if !delims[i].can_close {
            continue;
        }
        while delims[i].count > 0 {
            let opener = (0..i).rev().find(|&j| {
                let d = &delims[j];
                d.can_open
                    && d.count > 0
                    && d.ch == delims[i].ch
                    && ast.parent(d.node) == ast.parent(delims[i].node)
            });
            let Some(j) = opener else {
                break;
            };

            let used = delims[j].count.min(delims[i].count).min(2);
            let value = if used == 2 {
                NodeValue::Strong
            } else {
                NodeValue::Emphasis
            };

            let opener_node = delims[j].node;
            let closer_node = delims[i].node;
            let range = SourceRange {
                start: ast.node(opener_node).sourcepos.start,
                end: ast.node(closer_node).sourcepos.end,
            };

            let emph = ast.alloc(value, range);
            ast.insert_after(opener_node, emph);
            ast.reparent_between(emph, closer_node, emph);

            delims[j].count -= used;
            delims[i].count -= used;
            set_run_text(ast, opener_node, delims[j].ch, delims[j].count);
            set_run_text(ast, closer_node, delims[i].ch, delims[i].count);
            if delims[j].count == 0 {
                ast.detach(opener_node);
            }
            if delims[i].count == 0 {
                ast.detach(closer_node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    // "*foo*": opening run is left-flanking only, closing run right-only.
    #[case(None, Some(b'f'), b'*', (true, false))]
    #[case(Some(b'o'), None, b'*', (false, true))]
    // Intraword asterisk flanks both ways.
    #[case(Some(b'o'), Some(b'b'), b'*', (true, true))]
    // Whitespace after kills left-flanking.
    #[case(None, Some(b' '), b'*', (false, false))]
    // Punctuation after opens only when preceded by space/punct.
    #[case(Some(b'a'), Some(b'.'), b'*', (false, true))]
    #[case(None, Some(b'.'), b'*', (true, false))]
    fn test_asterisk_flanking(
        #[case] before: Option<u8>,
        #[case] after: Option<u8>,
        #[case] ch: u8,
        #[case] expected: (bool, bool),
    ) {
        assert_eq!(flanking(before, after, ch), expected);
    }

    #[test]
    fn test_underscore_intraword_restriction() {
        // "foo_bar": flanks both ways, so underscore may do neither.
        assert_eq!(flanking(Some(b'o'), Some(b'b'), b'_'), (false, false));
        // Same neighbors allow an asterisk.
        assert_eq!(flanking(Some(b'o'), Some(b'b'), b'*'), (true, true));
    }

    #[test]
    fn test_underscore_punctuation_escape_hatch() {
        // "._x": punctuation before lets the underscore open despite
        // right-flanking.
        assert_eq!(flanking(Some(b'.'), Some(b'x'), b'_').0, true);
    }
}
