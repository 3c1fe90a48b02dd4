//! Text summary builder for CLI output.
//!
//! Formats the payload of a finished query as human-readable lines for text mode.

use crate::model::{Payload, SemanticEntry};
use crate::parser::{parse_entry_text, EntryBlock};

/// Pre-formatted lines for text output.
pub(crate) struct TextSummary {
    pub lines: Vec<String>,
}

/// Header line shown under an entry title.
pub(crate) fn byline(entry: &SemanticEntry) -> String {
    format!("{} - {}", entry.authors.join(", "), entry.date)
}

fn push_entry(lines: &mut Vec<String>, entry: &SemanticEntry) {
    lines.push(format!("# {}", entry.title));
    lines.push(byline(entry));
    for block in parse_entry_text(&entry.text) {
        match block {
            EntryBlock::Paragraph(p) => lines.push(p.to_string()),
            EntryBlock::Divider => lines.push("-----".into()),
        }
    }
    if !entry.url.is_empty() {
        lines.push(format!("Read more: {}", entry.url));
    }
}

pub(crate) fn build_text_summary(payload: &Payload) -> TextSummary {
    let mut lines = Vec::new();
    match payload {
        Payload::Entries(entries) => {
            if entries.is_empty() {
                lines.push("No results.".into());
            }
            for (i, entry) in entries.iter().enumerate() {
                if i > 0 {
                    lines.push(String::new());
                }
                push_entry(&mut lines, entry);
            }
        }
        Payload::Followups(followups) => {
            if followups.is_empty() {
                lines.push("No follow-up suggestions.".into());
            }
            for (i, f) in followups.iter().enumerate() {
                lines.push(format!("{}. {}", i + 1, f.text));
            }
        }
    }
    TextSummary { lines }
}
