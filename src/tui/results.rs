use crate::model::SemanticEntry;
use crate::parser::{parse_entry_text, EntryBlock};
use crate::text_summary::byline;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Lines for one entry: title, byline, body blocks, link.
pub fn entry_lines(entry: &SemanticEntry, width: u16) -> Vec<Line<'static>> {
    let mut out = vec![
        Line::from(Span::styled(
            entry.title.clone(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(byline(entry), Style::default().fg(Color::Gray))).right_aligned(),
    ];
    let rule = "─".repeat(width.saturating_sub(4).max(1) as usize);
    for block in parse_entry_text(&entry.text) {
        match block {
            EntryBlock::Paragraph(p) => out.push(Line::from(p.to_string())),
            EntryBlock::Divider => out.push(Line::from(Span::styled(
                rule.clone(),
                Style::default().fg(Color::DarkGray),
            ))),
        }
    }
    if !entry.url.is_empty() {
        out.push(Line::from(vec![
            Span::styled("Read more: ", Style::default().fg(Color::Gray)),
            Span::styled(
                entry.url.clone(),
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::UNDERLINED),
            ),
        ]));
    }
    out
}

/// Draw entries starting at `offset`, separated by blank lines.
pub fn draw_results(area: Rect, f: &mut Frame, entries: &[SemanticEntry], offset: usize) {
    let mut lines: Vec<Line> = Vec::new();
    for (i, entry) in entries.iter().enumerate().skip(offset) {
        if i > offset {
            lines.push(Line::from(""));
        }
        lines.extend(entry_lines(entry, area.width));
    }
    let title = if entries.is_empty() {
        "Results".to_string()
    } else {
        format!("Results {}/{}", offset + 1, entries.len())
    };
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title));
    f.render_widget(p, area);
}
