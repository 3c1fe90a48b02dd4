mod export;
mod followups;
mod help;
mod input;
mod results;
mod state;

use crate::cli::{build_config, Cli};
use crate::engine::{HttpBackend, SearchBackend};
use crate::model::{LifecycleState, QuerySource, SearchMode};
use crate::orchestrator::{Rejected, SearchLifecycle};
use anyhow::{Context, Result};
use crossterm::{
    event::{
        DisableBracketedPaste, EnableBracketedPaste, Event, EventStream, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use input::InputAction;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Terminal,
};
use state::UiState;
use std::{io, time::Duration};

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// What the event loop should do after a key.
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub async fn run(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let backend = HttpBackend::new(&cfg)?;
    tracing::info!(endpoint = %backend.endpoint(), mode = ?cfg.mode, "starting search box");
    let mut lifecycle = SearchLifecycle::new(backend, cfg.mode);
    let mut state = UiState::new(cfg.mode, &cfg.initial_query);

    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste).ok();
    // Needed to tell Shift-Enter apart from Enter.
    let enhanced = crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false);
    if enhanced {
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )
        .ok();
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;
    terminal.clear().ok();

    state.input.mount();
    let res = event_loop(&mut terminal, &mut state, &mut lifecycle).await;

    // Whatever is still in flight is abandoned with the widget.
    lifecycle.cancel();

    disable_raw_mode().ok();
    let mut stdout = io::stdout();
    if enhanced {
        execute!(stdout, PopKeyboardEnhancementFlags).ok();
    }
    execute!(stdout, DisableBracketedPaste, LeaveAlternateScreen).ok();
    res
}

async fn event_loop<B: SearchBackend>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut UiState,
    lifecycle: &mut SearchLifecycle<B>,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut spinner_tick = tokio::time::interval(Duration::from_millis(120));

    loop {
        terminal
            .draw(|f| draw(f.area(), f, state, lifecycle.state()))
            .context("draw frame")?;

        tokio::select! {
            maybe_event = events.next() => {
                match maybe_event {
                    None => return Ok(()),
                    Some(Err(e)) => return Err(e).context("read terminal event"),
                    Some(Ok(Event::Key(k))) if k.kind == KeyEventKind::Press => {
                        if handle_key(state, lifecycle, k) == Flow::Quit {
                            return Ok(());
                        }
                    }
                    Some(Ok(Event::Paste(text))) => {
                        if state.input.is_focused() && !lifecycle.is_busy() {
                            state.input.paste(&text);
                        }
                    }
                    Some(Ok(_)) => {}
                }
            }
            (seq, outcome) = lifecycle.next_completion() => {
                if lifecycle.apply(seq, outcome) {
                    state.on_idle(lifecycle.state());
                    state.info = idle_message(lifecycle.state());
                }
            }
            _ = spinner_tick.tick(), if lifecycle.is_busy() => {
                state.spinner = state.spinner.wrapping_add(1);
            }
        }
    }
}

fn idle_message(st: &LifecycleState) -> String {
    let payload = st.payload();
    if payload.is_empty() {
        return "No results".into();
    }
    match payload.len() {
        1 => "1 result".into(),
        n => format!("{n} results"),
    }
}

fn submit<B: SearchBackend>(
    state: &mut UiState,
    lifecycle: &mut SearchLifecycle<B>,
    query: String,
    source: QuerySource,
) {
    match lifecycle.submit(query, source) {
        Ok(_) => state.on_busy(),
        // The UI never offers these, but a stray key can still arrive.
        Err(Rejected::Busy) | Err(Rejected::BlankQuery) => {}
    }
}

fn handle_key<B: SearchBackend>(
    state: &mut UiState,
    lifecycle: &mut SearchLifecycle<B>,
    k: KeyEvent,
) -> Flow {
    let busy = lifecycle.is_busy();
    match (k.modifiers, k.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => return Flow::Quit,
        (KeyModifiers::CONTROL, KeyCode::Char('x')) => {
            if lifecycle.cancel() {
                state.on_idle(lifecycle.state());
                state.info = "Cancelled".into();
            }
            return Flow::Continue;
        }
        _ => {}
    }

    if state.input.is_focused() {
        match state.input.handle_key(k, busy) {
            InputAction::Submit(q) => submit(state, lifecycle, q, QuerySource::Search),
            InputAction::Blurred => state.info = "Press i to edit, ? for help".into(),
            InputAction::Changed | InputAction::None => {}
        }
        return Flow::Continue;
    }

    let entries = lifecycle.state().payload().entries().len();
    match k.code {
        KeyCode::Char('q') => return Flow::Quit,
        KeyCode::Char('i') | KeyCode::Char('/') => {
            if !busy {
                state.input.focus();
                state.show_help = false;
            }
        }
        KeyCode::Char('?') => state.show_help = !state.show_help,
        KeyCode::Up | KeyCode::Char('k') => match state.mode {
            SearchMode::Search => state.followups.select_prev(),
            SearchMode::Semantic => state.scroll_results(-1, entries),
        },
        KeyCode::Down | KeyCode::Char('j') => match state.mode {
            SearchMode::Search => state.followups.select_next(),
            SearchMode::Semantic => state.scroll_results(1, entries),
        },
        KeyCode::Enter => {
            if let Some(q) = state.followups.activate(busy) {
                submit(state, lifecycle, q, QuerySource::Followups);
            }
        }
        KeyCode::Char('y') => {
            let url = lifecycle
                .state()
                .payload()
                .entries()
                .get(state.results_offset)
                .map(|e| e.url.clone())
                .filter(|u| !u.is_empty());
            state.info = match url {
                Some(url) => match export::copy_to_clipboard(&url) {
                    Ok(()) => format!("✓ Copied to clipboard: {url}"),
                    Err(e) => format!("Clipboard copy failed: {e:#}"),
                },
                None => "No link to copy".into(),
            };
        }
        _ => {}
    }
    Flow::Continue
}

fn draw(area: Rect, f: &mut ratatui::Frame, state: &UiState, lifecycle: &LifecycleState) {
    let busy = lifecycle.is_busy();
    let input_height = if busy {
        3
    } else {
        (state.input.line_count() as u16).clamp(1, 8) + 2
    };
    let followups_height = if state.mode == SearchMode::Search {
        state.followups.height()
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(followups_height),
            Constraint::Length(input_height),
            Constraint::Min(0),
        ])
        .split(area);

    draw_status(chunks[0], f, state, busy);
    if followups_height > 0 {
        state
            .followups
            .draw(chunks[1], f, !state.input.is_focused(), busy);
    }
    draw_input(chunks[2], f, state, busy);

    if state.show_help {
        help::draw_help(chunks[3], f);
    } else if state.mode == SearchMode::Semantic {
        results::draw_results(
            chunks[3],
            f,
            lifecycle.payload().entries(),
            state.results_offset,
        );
    }
}

fn draw_status(area: Rect, f: &mut ratatui::Frame, state: &UiState, busy: bool) {
    let mode = match state.mode {
        SearchMode::Semantic => "semantic",
        SearchMode::Search => "search",
    };
    let mut spans = vec![
        Span::styled(" searchbox ", Style::default().fg(Color::Black).bg(Color::Cyan)),
        Span::raw(" "),
        Span::styled(mode, Style::default().fg(Color::Gray)),
        Span::raw("  "),
    ];
    if busy {
        spans.push(Span::styled(
            format!("{} ", SPINNER[state.spinner % SPINNER.len()]),
            Style::default().fg(Color::Yellow),
        ));
    }
    spans.push(Span::raw(state.info.clone()));
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_input(area: Rect, f: &mut ratatui::Frame, state: &UiState, busy: bool) {
    if busy {
        let p = Paragraph::new(Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::DarkGray),
        )))
        .block(Block::default().borders(Borders::ALL).title("Search"));
        f.render_widget(p, area);
        return;
    }

    let border = if state.input.is_focused() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let title = format!("Search ({} chars)", state.draft_chars());
    let lines: Vec<Line> = state
        .input
        .text()
        .split('\n')
        .map(|l| Line::from(l.to_string()))
        .collect();
    let (row, col) = state.input.caret_row_col();
    let visible = area.height.saturating_sub(2);
    let scroll = row.saturating_sub(visible.saturating_sub(1));
    let p = Paragraph::new(lines).scroll((scroll, 0)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title),
    );
    f.render_widget(p, area);

    if state.input.is_focused() {
        let x = area.x + 1 + col.min(area.width.saturating_sub(3));
        let y = area.y + 1 + (row - scroll);
        f.set_cursor_position((x, y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BackendError, Payload, QueryRequest};
    use futures::future;
    use ratatui::backend::TestBackend;
    use std::sync::{Arc, Mutex};

    /// Records calls and never answers.
    #[derive(Clone, Default)]
    struct Hanging {
        calls: Arc<Mutex<Vec<QueryRequest>>>,
    }

    impl SearchBackend for Hanging {
        async fn query(&self, request: QueryRequest) -> Result<Payload, BackendError> {
            self.calls.lock().unwrap().push(request);
            future::pending().await
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn setup(mode: SearchMode, initial: &str) -> (UiState, SearchLifecycle<Hanging>, Hanging) {
        let backend = Hanging::default();
        let lifecycle = SearchLifecycle::new(backend.clone(), mode);
        let mut state = UiState::new(mode, initial);
        state.input.mount();
        (state, lifecycle, backend)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn enter_submits_and_clears_input() {
        let (mut state, mut lc, backend) = setup(SearchMode::Semantic, "What is FOOM?");
        assert_eq!(handle_key(&mut state, &mut lc, key(KeyCode::Enter)), Flow::Continue);
        assert!(lc.is_busy());
        assert_eq!(state.input.text(), "");

        // Inert while busy.
        handle_key(&mut state, &mut lc, key(KeyCode::Char('a')));
        handle_key(&mut state, &mut lc, key(KeyCode::Enter));
        assert_eq!(state.input.text(), "");

        settle().await;
        let calls = backend.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].query, "What is FOOM?");
        assert_eq!(calls[0].source, QuerySource::Search);
    }

    #[tokio::test]
    async fn ctrl_x_cancels_and_refocuses() {
        let (mut state, mut lc, _backend) = setup(SearchMode::Search, "q");
        handle_key(&mut state, &mut lc, key(KeyCode::Enter));
        assert!(lc.is_busy());
        state.input.blur();

        handle_key(&mut state, &mut lc, ctrl('x'));
        assert!(!lc.is_busy());
        assert!(state.input.is_focused());
        assert_eq!(state.info, "Cancelled");
    }

    #[tokio::test]
    async fn selecting_a_followup_submits_with_followups_source() {
        let (mut state, mut lc, backend) = setup(SearchMode::Search, "");
        state.followups.set_items(&[crate::model::Followup {
            pageid: "P1".into(),
            text: "Why?".into(),
        }]);
        handle_key(&mut state, &mut lc, key(KeyCode::Esc));
        assert!(!state.input.is_focused());
        handle_key(&mut state, &mut lc, key(KeyCode::Enter));
        assert!(lc.is_busy());

        settle().await;
        let calls = backend.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].query, "P1\nWhy?");
        assert_eq!(calls[0].source, QuerySource::Followups);
    }

    #[tokio::test]
    async fn blank_enter_and_quit_keys() {
        let (mut state, mut lc, _backend) = setup(SearchMode::Semantic, "   ");
        handle_key(&mut state, &mut lc, key(KeyCode::Enter));
        assert!(!lc.is_busy());

        // 'q' types into a focused box but quits once blurred.
        assert_eq!(handle_key(&mut state, &mut lc, key(KeyCode::Char('q'))), Flow::Continue);
        handle_key(&mut state, &mut lc, key(KeyCode::Esc));
        assert_eq!(handle_key(&mut state, &mut lc, key(KeyCode::Char('q'))), Flow::Quit);
        assert_eq!(handle_key(&mut state, &mut lc, ctrl('c')), Flow::Quit);
    }

    #[tokio::test]
    async fn draw_shows_loading_while_busy() {
        let (mut state, mut lc, _backend) = setup(SearchMode::Semantic, "hello");
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal
            .draw(|f| draw(f.area(), f, &state, lc.state()))
            .unwrap();
        let idle_view = format!("{:?}", terminal.backend().buffer());
        assert!(idle_view.contains("hello"));

        handle_key(&mut state, &mut lc, key(KeyCode::Enter));
        terminal
            .draw(|f| draw(f.area(), f, &state, lc.state()))
            .unwrap();
        let busy_view = format!("{:?}", terminal.backend().buffer());
        assert!(busy_view.contains("Loading..."));
        assert!(!busy_view.contains("hello"));
    }
}
