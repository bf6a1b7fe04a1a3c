//! Per-construct line matchers. Each `match_*` inspects one line in
//! isolation and reports what it would open; the builder decides what that
//! does to the open-block stack.

use std::sync::OnceLock;

use regex::Regex;

use crate::ast::value::{ListType, NodeAbbr};

/// `---`, `***`, `___`: one run character repeated at least three times with
/// only whitespace interspersed, and nothing else on the line.
pub fn match_thematic_break(text: &str) -> bool {
    let trimmed = text.trim();
    let mut run_char = None;
    let mut count = 0;
    for c in trimmed.chars() {
        match c {
            '-' | '*' | '_' => {
                if *run_char.get_or_insert(c) != c {
                    return false;
                }
                count += 1;
            }
            ' ' | '\t' => {}
            _ => return false,
        }
    }
    count >= 3
}

#[derive(Debug, PartialEq)]
pub struct HeadingMatch<'a> {
    pub level: u8,
    /// Heading text with trailing `#` run and whitespace stripped.
    pub text: &'a str,
}

/// `#`x1-6 followed by whitespace or end of line.
pub fn match_atx_heading(text: &str) -> Option<HeadingMatch<'_>> {
    let trimmed = text.trim_start();
    let level = trimmed.bytes().take_while(|&b| b == b'#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    let body = rest.trim().trim_end_matches('#').trim_end();
    Some(HeadingMatch {
        level: level as u8,
        text: body,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct FenceMatch<'a> {
    pub fence_char: u8,
    pub length: usize,
    /// Text after the fence run, trimmed. Empty for closing fences.
    pub info: &'a str,
}

/// A run of at least three backticks or tildes, with an optional info
/// string.
pub fn match_fence(text: &str) -> Option<FenceMatch<'_>> {
    let trimmed = text.trim_start();
    let fence_char = match trimmed.bytes().next() {
        Some(b @ (b'`' | b'~')) => b,
        _ => return None,
    };
    let length = trimmed
        .bytes()
        .take_while(|&b| b == fence_char)
        .count();
    if length < 3 {
        return None;
    }
    let info = trimmed[length..].trim();
    // An info string containing a backtick would be ambiguous with an
    // inline code span; CommonMark forbids it for backtick fences.
    if fence_char == b'`' && info.contains('`') {
        return None;
    }
    Some(FenceMatch {
        fence_char,
        length,
        info,
    })
}

/// Whether `text` closes a fence opened with `fence_char` x `length`: a trim
/// consisting of >= length of the same character and nothing else.
pub fn match_fence_close(fence_char: u8, length: usize, text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty()
        && trimmed.bytes().all(|b| b == fence_char)
        && trimmed.len() >= length
}

#[derive(Debug, PartialEq)]
pub struct ColonFenceMatch<'a> {
    pub keyword: &'a str,
    pub title: Option<&'a str>,
}

/// `:::keyword optional title` and the bare `:::` close marker (returned
/// with an empty keyword).
pub fn match_colon_fence(text: &str) -> Option<ColonFenceMatch<'_>> {
    let trimmed = text.trim();
    let rest = trimmed.strip_prefix(":::")?;
    let rest = rest.trim();
    if rest.is_empty() {
        return Some(ColonFenceMatch {
            keyword: "",
            title: None,
        });
    }
    let (keyword, title) = match rest.split_once(char::is_whitespace) {
        Some((kw, t)) => (kw, Some(t.trim()).filter(|t| !t.is_empty())),
        None => (rest, None),
    };
    Some(ColonFenceMatch { keyword, title })
}

#[derive(Debug, PartialEq)]
pub struct ListMarkerMatch<'a> {
    pub list_type: ListType,
    /// Start number for ordered lists, 1 for bullets.
    pub start: u64,
    /// `-`, `*`, `+` for bullets; `.` or `)` for ordered.
    pub marker: u8,
    /// Item text after the marker and its following whitespace.
    pub content: &'a str,
}

/// Bullet (`-`/`*`/`+` + whitespace) or ordered (digits + `.`/`)` +
/// whitespace) list markers.
pub fn match_list_marker(text: &str) -> Option<ListMarkerMatch<'_>> {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    match bytes.first()? {
        b @ (b'-' | b'*' | b'+') => {
            let rest = &trimmed[1..];
            if !rest.starts_with([' ', '\t']) {
                return None;
            }
            Some(ListMarkerMatch {
                list_type: ListType::Bullet,
                start: 1,
                marker: *b,
                content: rest.trim_start(),
            })
        }
        b'0'..=b'9' => {
            let digits = trimmed.bytes().take_while(|b| b.is_ascii_digit()).count();
            let delim = *bytes.get(digits)?;
            if delim != b'.' && delim != b')' {
                return None;
            }
            let rest = &trimmed[digits + 1..];
            if !rest.starts_with([' ', '\t']) {
                return None;
            }
            let start = trimmed[..digits].parse().ok()?;
            Some(ListMarkerMatch {
                list_type: ListType::Ordered,
                start,
                marker: delim,
                content: rest.trim_start(),
            })
        }
        _ => None,
    }
}

/// GFM task checkbox immediately after the list marker: `[ ]`, `[x]`, `[X]`
/// followed by whitespace or end of line.
pub fn match_task_checkbox(content: &str) -> Option<(bool, &str)> {
    let rest = content.strip_prefix('[')?;
    let (checked, rest) = match rest.as_bytes().first()? {
        b' ' => (false, &rest[1..]),
        b'x' | b'X' => (true, &rest[1..]),
        _ => return None,
    };
    let rest = rest.strip_prefix(']')?;
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    Some((checked, rest.trim_start()))
}

/// Coarse HTML-block start heuristic: `<` followed by `!`, `?`, `/` or a
/// letter. Not the CommonMark HTML-block state machine.
pub fn match_html_block(text: &str) -> bool {
    let trimmed = text.trim();
    let mut bytes = trimmed.bytes();
    if bytes.next() != Some(b'<') {
        return false;
    }
    match bytes.next() {
        Some(b'!' | b'?' | b'/') => true,
        Some(b) => b.is_ascii_alphabetic(),
        None => false,
    }
}

/// `[^label]: text` footnote definition opener.
pub fn match_footnote_def(text: &str) -> Option<(&str, &str)> {
    let trimmed = text.trim_start();
    let rest = trimmed.strip_prefix("[^")?;
    let close = rest.find(']')?;
    let label = &rest[..close];
    if label.is_empty() || label.contains([' ', '\t']) {
        return None;
    }
    let after = rest[close + 1..].strip_prefix(':')?;
    Some((label, after.trim_start()))
}

/// `*[ABBR]: expansion` abbreviation definition.
pub fn match_abbr_def(text: &str) -> Option<NodeAbbr> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"^\*\[([^\]]+)\]:\s*(\S.*)$").expect("invalid abbr regex")
    });
    let caps = re.captures(text.trim())?;
    Some(NodeAbbr {
        label: caps[1].to_string(),
        expansion: caps[2].trim_end().to_string(),
    })
}

/// `[toc]` marker, case-insensitive, alone on its line.
pub fn match_toc(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case("[toc]")
}
