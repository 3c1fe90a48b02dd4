use crate::model::Followup;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Follow-up suggestions from the last search, with a selection cursor.
#[derive(Debug, Default)]
pub struct FollowupList {
    items: Vec<Followup>,
    selected: usize,
}

impl FollowupList {
    pub fn set_items(&mut self, items: &[Followup]) {
        self.items = items.to_vec();
        self.selected = 0;
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.items.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Query for the selected suggestion; `None` while busy or when empty.
    pub fn activate(&self, busy: bool) -> Option<String> {
        if busy {
            return None;
        }
        self.items.get(self.selected).map(Followup::to_query)
    }

    /// Rows needed to draw the list, borders included.
    pub fn height(&self) -> u16 {
        if self.items.is_empty() {
            0
        } else {
            (self.items.len() as u16).saturating_add(2)
        }
    }

    pub fn draw(&self, area: Rect, f: &mut Frame, active: bool, busy: bool) {
        let lines: Vec<Line> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let style = if busy {
                    Style::default().fg(Color::DarkGray)
                } else if active && i == self.selected {
                    Style::default()
                        .fg(Color::Black)
                        .bg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Cyan)
                };
                Line::from(vec![Span::raw(" "), Span::styled(format!(" {} ", item.text), style)])
                    .right_aligned()
            })
            .collect();
        let p = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Follow-ups"),
        );
        f.render_widget(p, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> FollowupList {
        let mut l = FollowupList::default();
        l.set_items(&[
            Followup {
                pageid: "P1".into(),
                text: "Why?".into(),
            },
            Followup {
                pageid: "P2".into(),
                text: "How?".into(),
            },
        ]);
        l
    }

    #[test]
    fn activation_composes_pageid_and_text() {
        let l = list();
        assert_eq!(l.activate(false).as_deref(), Some("P1\nWhy?"));
    }

    #[test]
    fn selection_is_clamped() {
        let mut l = list();
        l.select_prev();
        assert_eq!(l.activate(false).as_deref(), Some("P1\nWhy?"));
        l.select_next();
        l.select_next();
        assert_eq!(l.activate(false).as_deref(), Some("P2\nHow?"));
    }

    #[test]
    fn activation_is_disabled_while_busy_or_empty() {
        assert_eq!(list().activate(true), None);
        assert_eq!(FollowupList::default().activate(false), None);
        assert_eq!(FollowupList::default().height(), 0);
    }

    #[test]
    fn new_items_reset_selection() {
        let mut l = list();
        l.select_next();
        assert_eq!(l.height(), 4);
        l.set_items(&[]);
        assert_eq!(l.height(), 0);
        assert_eq!(l.activate(false), None);
    }
}
