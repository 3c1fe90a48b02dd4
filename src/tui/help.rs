use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

fn bind(key: &'static str, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(format!("{key:<16}"), Style::default().fg(Color::Magenta)),
        Span::raw(what),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("While typing:"),
        bind("Enter", "Search (ignored when the query is blank)"),
        bind("Shift/Alt-Enter", "New line"),
        bind("Ctrl-S", "Search"),
        bind("Esc", "Leave the search box"),
        Line::from(""),
        Line::from("Outside the search box:"),
        bind("i / /", "Back to the search box"),
        bind("↑/↓ j/k", "Pick a follow-up / scroll results"),
        bind("Enter", "Ask the selected follow-up"),
        bind("y", "Copy the top result's link"),
        bind("?", "Toggle this help"),
        bind("q", "Quit"),
        Line::from(""),
        Line::from("Anywhere:"),
        bind("Ctrl-X", "Cancel the running search"),
        bind("Ctrl-C", "Quit"),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(p, area);
}
