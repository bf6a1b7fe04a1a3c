//! GFM table detection. A line with a pipe becomes a table header only when
//! the immediately following line satisfies the delimiter-row grammar.

use std::sync::OnceLock;

use regex::Regex;

use crate::ast::value::TableAlignment;

fn delimiter_cell_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(:?)-+(:?)$").expect("invalid delimiter cell regex"))
}

/// Parses a delimiter row (`| :--- | ---: |`). Returns per-column alignment
/// when every pipe-separated cell matches `:?-+:?`.
pub fn match_delimiter_row(text: &str) -> Option<Vec<TableAlignment>> {
    let trimmed = text.trim();
    if !trimmed.contains('-') {
        return None;
    }
    let cells = split_row(trimmed);
    if cells.is_empty() {
        return None;
    }

    let re = delimiter_cell_re();
    let mut alignments = Vec::with_capacity(cells.len());
    for cell in &cells {
        let caps = re.captures(cell.trim())?;
        let left = !caps[1].is_empty();
        let right = !caps[2].is_empty();
        alignments.push(match (left, right) {
            (true, true) => TableAlignment::Center,
            (true, false) => TableAlignment::Left,
            (false, true) => TableAlignment::Right,
            (false, false) => TableAlignment::None,
        });
    }
    Some(alignments)
}

/// Splits a row on `|`, trimming cells and dropping the empty edge cells
/// produced by leading/trailing pipes.
pub fn split_row(text: &str) -> Vec<&str> {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_prefix('|').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('|').unwrap_or(trimmed);
    trimmed.split('|').map(str::trim).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_delimiter_row_alignments() {
        let a = match_delimiter_row("| :--- | --- | ---: | :-: |").unwrap();
        assert_eq!(
            a,
            vec![
                TableAlignment::Left,
                TableAlignment::None,
                TableAlignment::Right,
                TableAlignment::Center,
            ]
        );
    }

    #[test]
    fn test_delimiter_row_without_edge_pipes() {
        let a = match_delimiter_row(":-|-:").unwrap();
        assert_eq!(a, vec![TableAlignment::Left, TableAlignment::Right]);
    }

    #[test]
    fn test_delimiter_row_rejects_text() {
        assert!(match_delimiter_row("| a | b |").is_none());
        assert!(match_delimiter_row("plain text").is_none());
        assert!(match_delimiter_row("| --- | b |").is_none());
    }

    #[test]
    fn test_split_row_drops_edge_cells() {
        assert_eq!(split_row("| a | b |"), vec!["a", "b"]);
        assert_eq!(split_row("a | b"), vec!["a", "b"]);
        assert_eq!(split_row("| a | b"), vec!["a", "b"]);
    }

    #[test]
    fn test_split_row_keeps_inner_empty_cells() {
        assert_eq!(split_row("| a |  | c |"), vec!["a", "", "c"]);
    }
}
