//! Markdown table normalization.

use super::model::TableRow;
use once_cell::sync::Lazy;
use regex::Regex;

/// Lines made only of pipes, dashes, colons and whitespace.
static SEPARATOR_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\|?[\s:\-|]+\|?\s*$").expect("valid separator pattern"));

/// Summary rows: the line or its first cell starts with "Total".
static TOTAL_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:\|\s*)?(?:\*\*\s*)?Total").expect("valid total pattern")
});

/// Normalizes raw table text into a rectangular grid of trimmed cells.
///
/// Separator rows, "Total" summary rows and lines without a pipe are
/// dropped. The table width is the largest number of non-empty cells found
/// on any remaining line; shorter rows are padded with empty cells and
/// longer ones truncated. Returns an empty grid when fewer than two rows
/// remain.
pub fn clean_markdown_table(raw: &str) -> Vec<TableRow> {
    let lines: Vec<&str> = raw
        .trim()
        .split('\n')
        .filter(|ln| ln.contains('|'))
        .filter(|ln| !SEPARATOR_LINE.is_match(ln))
        .filter(|ln| !TOTAL_LINE.is_match(ln))
        .map(str::trim)
        .collect();

    tracing::debug!("[TableCleaner] {} candidate rows", lines.len());
    if lines.len() < 2 {
        tracing::debug!("[TableCleaner] Fewer than 2 rows left, no table");
        return Vec::new();
    }

    let width = lines
        .iter()
        .map(|ln| ln.split('|').filter(|c| !c.trim().is_empty()).count())
        .max()
        .unwrap_or(0);

    lines
        .iter()
        .map(|ln| {
            let mut cells: TableRow = ln
                .trim_matches('|')
                .split('|')
                .map(|c| c.trim().to_string())
                .collect();
            cells.resize(width, String::new());
            cells
        })
        .collect()
}
