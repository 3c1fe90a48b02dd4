//! Post-query processing utilities.
//!
//! Folds a finished query into a [`QueryReport`] for the one-shot output modes.

use crate::model::{
    Payload, QueryOutcome, QueryReport, QuerySource, ReportStatus, SearchConfig,
};

/// Build a report from the outcome of a single query.
///
/// Failures keep the empty result set the lifecycle falls back to, with the
/// error text attached so scripts can tell the two apart.
pub(crate) fn build_report(
    cfg: &SearchConfig,
    query: &str,
    source: QuerySource,
    outcome: &QueryOutcome,
) -> QueryReport {
    let (status, error, payload) = match outcome {
        QueryOutcome::Succeeded(p) => (ReportStatus::Succeeded, None, p.clone()),
        QueryOutcome::Failed(e) => (
            ReportStatus::Failed,
            Some(e.to_string()),
            Payload::empty(cfg.mode),
        ),
        QueryOutcome::Cancelled => (ReportStatus::Cancelled, None, Payload::empty(cfg.mode)),
    };

    QueryReport {
        timestamp_utc: time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| "now".into()),
        base_url: cfg.api_url.clone(),
        mode: cfg.mode,
        query: query.to_string(),
        query_source: source,
        status,
        error,
        followups: payload.followups().to_vec(),
        entries: payload.entries().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BackendError, Followup, SearchMode};

    fn cfg(mode: SearchMode) -> SearchConfig {
        SearchConfig {
            api_url: "http://localhost:3000/api".into(),
            mode,
            search_path: "/search".into(),
            initial_query: String::new(),
            timeout: None,
            user_agent: "t".into(),
        }
    }

    #[test]
    fn failed_outcome_reports_empty_results_and_error() {
        let report = build_report(
            &cfg(SearchMode::Semantic),
            "q",
            QuerySource::Search,
            &QueryOutcome::Failed(BackendError::Status(502)),
        );
        assert_eq!(report.status, ReportStatus::Failed);
        assert_eq!(report.error.as_deref(), Some("backend returned HTTP 502"));
        assert!(report.entries.is_empty());

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["mode"], "semantic");
        assert_eq!(json["query_source"], "search");
    }

    #[test]
    fn succeeded_outcome_carries_followups() {
        let payload = Payload::Followups(vec![Followup {
            pageid: "P1".into(),
            text: "Why?".into(),
        }]);
        let report = build_report(
            &cfg(SearchMode::Search),
            "q",
            QuerySource::Followups,
            &QueryOutcome::Succeeded(payload),
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "succeeded");
        assert_eq!(json["followups"][0]["pageid"], "P1");
        assert!(json.get("error").is_none());
    }
}
