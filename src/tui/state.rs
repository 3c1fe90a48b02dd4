use super::followups::FollowupList;
use super::input::QueryInput;
use crate::model::{LifecycleState, SearchMode};
use tokio::sync::watch;

pub struct UiState {
    pub mode: SearchMode,
    pub input: QueryInput,
    pub followups: FollowupList,
    pub results_offset: usize,
    pub info: String,
    pub show_help: bool,
    pub spinner: usize,
    // Mirror of the query text, fed by the input's change observer.
    pub draft: watch::Receiver<String>,
}

impl UiState {
    pub fn new(mode: SearchMode, initial_query: &str) -> Self {
        let (tx, draft) = watch::channel(initial_query.to_string());
        let input = QueryInput::new(initial_query).with_observer(move |q| {
            tx.send_replace(q.to_string());
        });
        Self {
            mode,
            input,
            followups: FollowupList::default(),
            results_offset: 0,
            info: String::new(),
            show_help: false,
            spinner: 0,
            draft,
        }
    }

    pub fn on_busy(&mut self) {
        self.input.on_busy();
        self.info = "Loading…".into();
    }

    /// Sync the view with an Idle lifecycle state.
    pub fn on_idle(&mut self, lifecycle: &LifecycleState) {
        let payload = lifecycle.payload();
        self.followups.set_items(payload.followups());
        self.results_offset = 0;
        self.input.on_idle();
    }

    pub fn scroll_results(&mut self, delta: isize, total: usize) {
        let max = total.saturating_sub(1);
        self.results_offset = self.results_offset.saturating_add_signed(delta).min(max);
    }

    pub fn draft_chars(&self) -> usize {
        self.draft.borrow().chars().count()
    }
}
