mod http;

pub use http::HttpBackend;

use crate::model::{BackendError, Payload, QueryOutcome, QueryRequest};
use std::future::Future;
use tokio::sync::watch;

/// Remote retrieval service. One call per submitted query.
pub trait SearchBackend: Clone + Send + Sync + 'static {
    fn query(
        &self,
        request: QueryRequest,
    ) -> impl Future<Output = Result<Payload, BackendError>> + Send;
}

/// Cancellation token bound to exactly one in-flight request.
#[derive(Debug)]
pub struct RequestHandle {
    seq: u64,
    tx: watch::Sender<bool>,
}

/// Receiving side of a [`RequestHandle`], moved into the request task.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl RequestHandle {
    pub fn new(seq: u64) -> (Self, CancelSignal) {
        let (tx, rx) = watch::channel(false);
        (Self { seq, tx }, CancelSignal { rx })
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Cancelling twice, or after the request resolved, does nothing extra.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once the handle is cancelled or dropped.
    pub async fn cancelled(&mut self) {
        // A dropped handle means the request was superseded; treat it the same.
        let _ = self.rx.wait_for(|c| *c).await;
    }
}

/// Drive one request to a typed outcome, abandoning the transport future as
/// soon as `cancel` fires.
pub async fn execute<B: SearchBackend>(
    backend: B,
    request: QueryRequest,
    mut cancel: CancelSignal,
) -> QueryOutcome {
    if cancel.is_cancelled() {
        return QueryOutcome::Cancelled;
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => QueryOutcome::Cancelled,
        res = backend.query(request) => {
            // The response may land in the same instant as a cancel.
            if cancel.is_cancelled() {
                return QueryOutcome::Cancelled;
            }
            match res {
                Ok(payload) => QueryOutcome::Succeeded(payload),
                Err(e) => QueryOutcome::Failed(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Followup, QuerySource};
    use std::time::Duration;

    #[derive(Clone)]
    struct Slow(Duration);

    impl SearchBackend for Slow {
        async fn query(&self, _request: QueryRequest) -> Result<Payload, BackendError> {
            tokio::time::sleep(self.0).await;
            Ok(Payload::Followups(vec![Followup {
                pageid: "1".into(),
                text: "late".into(),
            }]))
        }
    }

    fn req() -> QueryRequest {
        QueryRequest {
            query: "q".into(),
            source: QuerySource::Search,
        }
    }

    #[tokio::test]
    async fn cancel_abandons_a_pending_request() {
        let (handle, signal) = RequestHandle::new(1);
        let task = tokio::spawn(execute(Slow(Duration::from_secs(30)), req(), signal));
        handle.cancel();
        let outcome = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome, QueryOutcome::Cancelled);
    }

    #[tokio::test]
    async fn dropping_the_handle_counts_as_cancellation() {
        let (handle, signal) = RequestHandle::new(1);
        let task = tokio::spawn(execute(Slow(Duration::from_secs(30)), req(), signal));
        drop(handle);
        let outcome = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(outcome, QueryOutcome::Cancelled);
    }

    #[tokio::test]
    async fn completed_request_reports_payload() {
        let (handle, signal) = RequestHandle::new(7);
        let outcome = execute(Slow(Duration::from_millis(1)), req(), signal).await;
        assert!(matches!(outcome, QueryOutcome::Succeeded(Payload::Followups(ref f)) if f.len() == 1));
        // Cancelling after resolution is a no-op.
        handle.cancel();
        assert!(handle.is_cancelled());
        assert_eq!(handle.seq(), 7);
    }
}
