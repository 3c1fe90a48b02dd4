//! Query lifecycle controller.
//!
//! Owns the Idle/Busy state, the single in-flight request slot and the
//! sequence counter. Presentation layers submit queries and feed completions
//! back through [`SearchLifecycle::apply`]; the controller alone decides what
//! state they produce.

use crate::engine::{self, RequestHandle, SearchBackend};
use crate::model::{LifecycleState, Payload, QueryOutcome, QueryRequest, QuerySource, SearchMode};
use tokio::task::JoinHandle;

/// Why a submission was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rejected {
    Busy,
    BlankQuery,
}

/// The request currently allowed to change state.
struct InFlight {
    handle: RequestHandle,
    task: Option<JoinHandle<QueryOutcome>>,
}

pub(crate) struct SearchLifecycle<B> {
    backend: B,
    mode: SearchMode,
    state: LifecycleState,
    current: Option<InFlight>,
    last_issued: u64,
}

impl<B: SearchBackend> SearchLifecycle<B> {
    pub fn new(backend: B, mode: SearchMode) -> Self {
        Self {
            backend,
            mode,
            state: LifecycleState::Idle {
                payload: Payload::empty(mode),
            },
            current: None,
            last_issued: 0,
        }
    }

    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    /// Move to Busy and start exactly one request. State is Busy before this
    /// returns, so callers can clear their input immediately.
    pub fn submit(&mut self, query: String, source: QuerySource) -> Result<u64, Rejected> {
        if self.is_busy() {
            tracing::debug!(source = source.as_str(), "submission ignored while busy");
            return Err(Rejected::Busy);
        }
        // Typed queries must have content; composed follow-ups only need to
        // be non-empty.
        let blank = match source {
            QuerySource::Search => query.trim().is_empty(),
            QuerySource::Followups => query.is_empty(),
        };
        if blank {
            tracing::debug!(source = source.as_str(), "blank submission ignored");
            return Err(Rejected::BlankQuery);
        }

        // At most one live handle: anything left over is cancelled first.
        if let Some(stale) = self.current.take() {
            stale.handle.cancel();
        }

        self.last_issued += 1;
        let seq = self.last_issued;
        let (handle, signal) = RequestHandle::new(seq);
        let request = QueryRequest { query, source };
        tracing::info!(seq, source = source.as_str(), query = %request.query, "query submitted");

        let task = tokio::spawn(engine::execute(self.backend.clone(), request, signal));
        let previous = self.take_payload();
        self.state = LifecycleState::Busy { seq, previous };
        self.current = Some(InFlight {
            handle,
            task: Some(task),
        });
        Ok(seq)
    }

    /// Abandon the in-flight request. The state returns to the Idle it was in
    /// before the submission. Returns false when nothing was in flight.
    pub fn cancel(&mut self) -> bool {
        let Some(inflight) = self.current.take() else {
            return false;
        };
        inflight.handle.cancel();
        tracing::debug!(seq = inflight.handle.seq(), "query cancelled");
        self.restore_previous(inflight.handle.seq());
        true
    }

    /// Wait for the in-flight request to finish. Never resolves when idle,
    /// which makes it safe to use as a `select!` branch.
    pub async fn next_completion(&mut self) -> (u64, QueryOutcome) {
        if let Some(inflight) = self.current.as_mut() {
            let seq = inflight.handle.seq();
            if let Some(task) = inflight.task.as_mut() {
                let res = task.await;
                inflight.task.take();
                let outcome = match res {
                    Ok(outcome) => outcome,
                    Err(e) => QueryOutcome::Failed(crate::model::BackendError::Transport(
                        format!("request task failed: {e}"),
                    )),
                };
                return (seq, outcome);
            }
        }
        futures::future::pending().await
    }

    /// Commit an outcome. Only the latest issued, uncancelled request may
    /// change state; anything else is discarded. Returns whether state changed.
    pub fn apply(&mut self, seq: u64, outcome: QueryOutcome) -> bool {
        let live = self
            .current
            .as_ref()
            .is_some_and(|c| c.handle.seq() == seq && !c.handle.is_cancelled());
        if !live || seq != self.last_issued {
            tracing::debug!(seq, latest = self.last_issued, "discarding stale outcome");
            return false;
        }
        self.current = None;

        match outcome {
            QueryOutcome::Cancelled => {
                self.restore_previous(seq);
            }
            QueryOutcome::Failed(err) => {
                tracing::warn!(seq, error = %err, "query failed; showing empty results");
                self.state = LifecycleState::Idle {
                    payload: Payload::empty(self.mode),
                };
            }
            QueryOutcome::Succeeded(payload) => {
                tracing::info!(seq, results = payload.len(), "query completed");
                self.state = LifecycleState::Idle { payload };
            }
        }
        true
    }

    /// Submit, wait, and apply in one step.
    pub async fn run_query(
        &mut self,
        query: String,
        source: QuerySource,
    ) -> Result<QueryOutcome, Rejected> {
        self.submit(query, source)?;
        let (seq, outcome) = self.next_completion().await;
        self.apply(seq, outcome.clone());
        Ok(outcome)
    }

    fn take_payload(&mut self) -> Payload {
        let placeholder = LifecycleState::Idle {
            payload: Payload::empty(self.mode),
        };
        match std::mem::replace(&mut self.state, placeholder) {
            LifecycleState::Idle { payload } => payload,
            LifecycleState::Busy { previous, .. } => previous,
        }
    }

    fn restore_previous(&mut self, seq: u64) {
        if matches!(self.state, LifecycleState::Busy { seq: s, .. } if s == seq) {
            let payload = self.take_payload();
            self.state = LifecycleState::Idle { payload };
        }
    }
}
