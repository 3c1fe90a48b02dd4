//! Splits a result entry's text into displayable blocks.

/// Line that marks a section break inside entry text. Never shown as content.
pub const DIVIDER_MARKER: &str = ".....";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryBlock<'a> {
    /// Original, untrimmed line.
    Paragraph(&'a str),
    Divider,
}

/// Parse entry text into ordered paragraph/divider blocks.
///
/// Lines that are blank after trimming are dropped. A line whose trimmed value
/// is exactly [`DIVIDER_MARKER`] becomes a divider; every other line is kept
/// as a paragraph with its original whitespace.
pub fn parse_entry_text(text: &str) -> Vec<EntryBlock<'_>> {
    text.split('\n')
        .filter_map(|line| match line.trim() {
            "" => None,
            DIVIDER_MARKER => Some(EntryBlock::Divider),
            _ => Some(EntryBlock::Paragraph(line)),
        })
        .collect()
}
