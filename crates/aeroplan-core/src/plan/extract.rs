//! Phase 3 table extraction.

use once_cell::sync::Lazy;
use regex::Regex;

/// Optionally decorated (`##`, `**`) "Phase 3" header line.
static PHASE3_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)(?:\s*(?:#+|\*\*)\s*)?Phase\s*3[^\n]*\n").expect("valid phase 3 pattern")
});

/// Start of the next section.
static PHASE4_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)(?:\s*(?:#+|\*\*)\s*)?Phase\s*4").expect("valid phase 4 pattern")
});

/// Header row(s), separator row, data rows. Every row must end in a newline,
/// so the block is matched with a trailing newline appended.
static STRICT_TABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?m)((?:\|[^\n]*?\|[^\n]*?\n)+?)",
        r"((?:\|\s*[-:]+\s*){2,}\|[^\n]*?\n)",
        r"((?:\|[^\n]*?\|[^\n]*?\n)+)",
    ))
    .expect("valid table pattern")
});

static PIPE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\|.*\|").expect("valid pipe line pattern"));

/// Returns the raw markdown table of the Phase 3 section, if any.
///
/// The section runs from the Phase 3 header line to the next Phase 4 marker
/// or the end of the text. Inside it a well-formed table (header, separator,
/// rows) is preferred; failing that, every line that starts with a pipe is
/// collected, and at least two such lines are required.
///
/// The result is not normalized; see [`clean_markdown_table`](super::clean_markdown_table).
pub fn extract_phase3_table(text: &str) -> Option<String> {
    let block = phase3_block(text)?;
    tracing::debug!(
        "[TableExtractor] Phase 3 block found ({} chars)",
        block.len()
    );

    let terminated = format!("{block}\n");
    if let Some(caps) = STRICT_TABLE.captures(&terminated) {
        let table = format!("{}{}{}", &caps[1], &caps[2], &caps[3]);
        tracing::debug!("[TableExtractor] Strict markdown table matched");
        return Some(table.trim().to_string());
    }

    let lines: Vec<&str> = block.split('\n').filter(|ln| PIPE_LINE.is_match(ln)).collect();
    tracing::debug!(
        "[TableExtractor] Strict match missed, fallback found {} pipe lines",
        lines.len()
    );
    if lines.len() >= 2 {
        Some(lines.join("\n"))
    } else {
        None
    }
}

fn phase3_block(text: &str) -> Option<&str> {
    let header = PHASE3_HEADER.find(text)?;
    let rest = &text[header.end()..];

    // the section body is at least one character long
    let first = rest.chars().next()?.len_utf8();
    let end = PHASE4_MARKER
        .find(&rest[first..])
        .map_or(rest.len(), |m| first + m.start());

    Some(rest[..end].trim())
}
