//! Query input box: text, caret, focus and the keys that submit.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a keystroke did to the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    None,
    Changed,
    Blurred,
    Submit(String),
}

type Observer = Box<dyn FnMut(&str) + Send>;

pub struct QueryInput {
    text: String,
    // Byte offset, always on a char boundary.
    cursor: usize,
    focused: bool,
    observer: Option<Observer>,
}

impl QueryInput {
    pub fn new(initial: impl Into<String>) -> Self {
        let text = initial.into();
        Self {
            cursor: text.len(),
            text,
            focused: false,
            observer: None,
        }
    }

    /// Called with the full text after every edit.
    pub fn with_observer(mut self, observer: impl FnMut(&str) + Send + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Insert pasted text at the caret. Terminal line endings become `\n`.
    pub fn paste(&mut self, pasted: &str) {
        if pasted.is_empty() {
            return;
        }
        let normalized = pasted.replace("\r\n", "\n").replace('\r', "\n");
        self.text.insert_str(self.cursor, &normalized);
        self.cursor += normalized.len();
        self.notify();
    }

    /// First render: take focus with the caret after whatever text is there.
    pub fn mount(&mut self) {
        self.focused = true;
        self.cursor = self.text.len();
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn on_busy(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn on_idle(&mut self) {
        self.focused = true;
    }

    /// Form submission. Yields the trimmed query unless busy or blank.
    pub fn submit(&self, busy: bool) -> Option<String> {
        if busy {
            return None;
        }
        let q = self.text.trim();
        (!q.is_empty()).then(|| q.to_string())
    }

    pub fn handle_key(&mut self, key: KeyEvent, busy: bool) -> InputAction {
        if busy || !self.focused {
            return InputAction::None;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => {
                self.blur();
                InputAction::Blurred
            }
            // Alt-Enter for terminals that cannot report Shift-Enter.
            KeyCode::Enter
                if key
                    .modifiers
                    .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) =>
            {
                self.insert('\n');
                InputAction::Changed
            }
            KeyCode::Enter => self.submit_action(),
            KeyCode::Char('s') if ctrl => self.submit_action(),
            KeyCode::Char(c) if !ctrl && !key.modifiers.contains(KeyModifiers::ALT) => {
                self.insert(c);
                InputAction::Changed
            }
            KeyCode::Backspace => {
                if let Some(prev) = self.prev_boundary() {
                    self.text.replace_range(prev..self.cursor, "");
                    self.cursor = prev;
                    self.notify();
                    InputAction::Changed
                } else {
                    InputAction::None
                }
            }
            KeyCode::Delete => {
                if let Some(next) = self.next_boundary() {
                    self.text.replace_range(self.cursor..next, "");
                    self.notify();
                    InputAction::Changed
                } else {
                    InputAction::None
                }
            }
            KeyCode::Left => {
                if let Some(prev) = self.prev_boundary() {
                    self.cursor = prev;
                }
                InputAction::None
            }
            KeyCode::Right => {
                if let Some(next) = self.next_boundary() {
                    self.cursor = next;
                }
                InputAction::None
            }
            KeyCode::Home => {
                self.cursor = self.text[..self.cursor].rfind('\n').map_or(0, |i| i + 1);
                InputAction::None
            }
            KeyCode::End => {
                self.cursor = self.text[self.cursor..]
                    .find('\n')
                    .map_or(self.text.len(), |i| self.cursor + i);
                InputAction::None
            }
            _ => InputAction::None,
        }
    }

    /// Caret as (row, column) in chars, for placing the terminal cursor.
    pub fn caret_row_col(&self) -> (u16, u16) {
        let before = &self.text[..self.cursor];
        let row = before.matches('\n').count();
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let col = before[line_start..].chars().count();
        (
            u16::try_from(row).unwrap_or(u16::MAX),
            u16::try_from(col).unwrap_or(u16::MAX),
        )
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    fn submit_action(&self) -> InputAction {
        match self.submit(false) {
            Some(q) => InputAction::Submit(q),
            None => InputAction::None,
        }
    }

    fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
        self.notify();
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.text[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }

    fn notify(&mut self) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&self.text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn shift(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::SHIFT)
    }

    fn mounted(text: &str) -> QueryInput {
        let mut input = QueryInput::new(text);
        input.mount();
        input
    }

    #[test]
    fn mount_focuses_with_caret_at_end() {
        let mut input = QueryInput::new("What is FOOM?");
        assert!(!input.is_focused());
        input.mount();
        assert!(input.is_focused());
        assert_eq!(input.caret_row_col(), (0, 13));
    }

    #[test]
    fn enter_submits_non_blank_query() {
        let mut input = mounted("  hello  ");
        assert_eq!(
            input.handle_key(key(KeyCode::Enter), false),
            InputAction::Submit("hello".into())
        );
    }

    #[test]
    fn enter_on_blank_query_does_nothing() {
        let mut input = mounted(" \t ");
        assert_eq!(input.handle_key(key(KeyCode::Enter), false), InputAction::None);
        assert_eq!(input.text(), " \t ");
    }

    #[test]
    fn shift_enter_inserts_newline_instead_of_submitting() {
        let mut input = mounted("line one");
        assert_eq!(
            input.handle_key(shift(KeyCode::Enter), false),
            InputAction::Changed
        );
        input.handle_key(key(KeyCode::Char('x')), false);
        assert_eq!(input.text(), "line one\nx");
        assert_eq!(input.caret_row_col(), (1, 1));
        assert_eq!(input.line_count(), 2);
    }

    #[test]
    fn escape_blurs_without_clearing() {
        let mut input = mounted("keep me");
        assert_eq!(input.handle_key(key(KeyCode::Esc), false), InputAction::Blurred);
        assert!(!input.is_focused());
        assert_eq!(input.text(), "keep me");
        // Blurred input ignores typing.
        assert_eq!(
            input.handle_key(key(KeyCode::Char('z')), false),
            InputAction::None
        );
    }

    #[test]
    fn busy_input_is_inert() {
        let mut input = mounted("query");
        assert_eq!(input.handle_key(key(KeyCode::Enter), true), InputAction::None);
        assert_eq!(
            input.handle_key(key(KeyCode::Char('a')), true),
            InputAction::None
        );
        assert_eq!(input.submit(true), None);
        assert_eq!(input.text(), "query");
    }

    #[test]
    fn ctrl_s_acts_as_form_submission() {
        let mut input = mounted("go");
        let ev = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert_eq!(input.handle_key(ev, false), InputAction::Submit("go".into()));
    }

    #[test]
    fn busy_clears_and_idle_refocuses() {
        let mut input = mounted("query");
        input.on_busy();
        assert_eq!(input.text(), "");
        input.blur();
        input.on_idle();
        assert!(input.is_focused());
    }

    #[test]
    fn editing_respects_multibyte_chars() {
        let mut input = mounted("añb");
        input.handle_key(key(KeyCode::Left), false);
        input.handle_key(key(KeyCode::Backspace), false);
        assert_eq!(input.text(), "ab");
        input.handle_key(key(KeyCode::Home), false);
        input.handle_key(key(KeyCode::Delete), false);
        assert_eq!(input.text(), "b");
        input.handle_key(key(KeyCode::End), false);
        assert_eq!(input.caret_row_col(), (0, 1));
    }

    #[test]
    fn observer_sees_every_change() {
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = seen.clone();
        let mut input = QueryInput::new("").with_observer(move |q| {
            sink.lock().unwrap().push(q.to_string());
        });
        input.mount();
        input.handle_key(key(KeyCode::Char('h')), false);
        input.handle_key(key(KeyCode::Char('i')), false);
        input.paste("!");
        assert_eq!(*seen.lock().unwrap(), vec!["h", "hi", "hi!"]);
    }

    #[test]
    fn paste_lands_at_caret_with_normalized_newlines() {
        let mut input = mounted("ad");
        input.handle_key(key(KeyCode::Left), false);
        input.paste("b\r\nc\r");
        assert_eq!(input.text(), "ab\nc\nd");
        assert_eq!(input.caret_row_col(), (2, 0));
        input.paste("");
        assert_eq!(input.text(), "ab\nc\nd");
    }

    #[test]
    fn alt_enter_inserts_newline_as_fallback() {
        let mut input = mounted("one");
        let ev = KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT);
        assert_eq!(input.handle_key(ev, false), InputAction::Changed);
        assert_eq!(input.text(), "one\n");
    }

    #[test]
    fn caret_position_saturates_on_huge_lines() {
        let long = "x".repeat(usize::from(u16::MAX) + 10);
        let input = mounted(&long);
        assert_eq!(input.caret_row_col(), (0, u16::MAX));
    }
}
