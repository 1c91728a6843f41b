//! Response post-formatting
//!
//! Turns a raw model reply into one sentence or list item per line, with list
//! items normalized to a `- ` bullet.

use regex::Regex;
use std::sync::OnceLock;

/// Sentence terminator followed by whitespace
fn sentence_boundary() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]\s+").expect("valid sentence regex"))
}

/// An ordinal such as `12.` that may open a list item, either on its own or
/// right after an introducing colon. The colon form only counts when the next
/// ordinal follows later in the line.
fn list_opener() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(?:(.*:)\s+)?(\d+\.)$").expect("valid ordinal regex"))
}

/// A later ordinal that starts its own sentence, e.g. the `2` in `X. 2. Y`
fn next_item() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]\s+(\d+)\.(?:\s|$)").expect("valid item regex"))
}

/// Leading list marker: an ordinal such as `1.` or a dash/bullet glyph
fn list_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+\.|[-•])\s*").expect("valid marker regex"))
}

/// Format a raw reply into line-oriented text
///
/// Existing line breaks and sentence ends (`.`, `!`, `?` followed by
/// whitespace) both start a new line. Segments that open with a list marker
/// get it replaced by `- `; everything else is trimmed and kept as is.
/// Applying this to its own output returns the same text.
pub fn format_response(raw: &str) -> String {
    raw.lines()
        .flat_map(split_sentences)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(normalize_bullet)
        .collect::<Vec<_>>()
        .join("\n")
}

fn split_sentences(line: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;

    for boundary in sentence_boundary().find_iter(line) {
        // Terminators are single-byte ASCII
        let end = boundary.start() + 1;
        let candidate = &line[start..end];
        // "1. First item." is one list item, not two sentences
        if let Some(caps) = list_opener().captures(candidate) {
            if let Some(number) = caps.get(2) {
                let intro = caps.get(1);
                // "The answer is: 42." ends a sentence unless item 43 follows
                let rest = &line[boundary.end()..];
                if intro.is_none() || continues_list(number.as_str(), rest) {
                    if let Some(intro) = intro {
                        segments.push(intro.as_str());
                    }
                    start += number.start();
                    continue;
                }
            }
        }
        segments.push(candidate);
        start = boundary.end();
    }

    segments.push(&line[start..]);
    segments
}

/// Whether `rest` holds the item numbered right after `ordinal` (`"3."`)
fn continues_list(ordinal: &str, rest: &str) -> bool {
    let Some(next) = ordinal
        .trim_end_matches('.')
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_add(1))
    else {
        return false;
    };
    next_item()
        .captures_iter(rest)
        .any(|caps| caps[1].parse::<u64>().ok() == Some(next))
}

fn normalize_bullet(segment: &str) -> String {
    let Some(marker) = list_marker().captures(segment) else {
        return segment.to_string();
    };

    let whole = &marker[0];
    let rest = &segment[whole.len()..];
    // "1.5 liters" is a number, not an item
    if marker[1].ends_with('.')
        && whole.len() == marker[1].len()
        && rest.starts_with(|c: char| c.is_ascii_digit())
    {
        return segment.to_string();
    }

    let rest = rest.trim();
    if rest.is_empty() {
        "-".to_string()
    } else {
        format!("- {}", rest)
    }
}
