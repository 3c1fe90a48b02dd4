use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub api_url: String,
    pub mode: SearchMode,
    pub search_path: String,
    pub initial_query: String,
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

/// Which backend endpoint the search box talks to, and therefore which payload
/// it displays once a query completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    Semantic,
    Search,
}

/// Where a query came from. Forwarded verbatim to the backend as `query_source`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuerySource {
    Search,
    Followups,
}

impl QuerySource {
    pub fn as_str(self) -> &'static str {
        match self {
            QuerySource::Search => "search",
            QuerySource::Followups => "followups",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Followup {
    pub pageid: String,
    pub text: String,
}

impl Followup {
    /// Compose the query string sent when this suggestion is selected.
    /// The backend splits it back apart; nothing here interprets it.
    pub fn to_query(&self) -> String {
        format!("{}\n{}", self.pageid, self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SemanticEntry {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub tags: serde_json::Value,
    #[serde(default)]
    pub text: String,
}

/// Body of the followups endpoint. Anything besides `followups` is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub followups: Vec<Followup>,
}

/// What an Idle search box displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Followups(Vec<Followup>),
    Entries(Vec<SemanticEntry>),
}

impl Payload {
    /// Empty result set of the kind `mode` produces.
    pub fn empty(mode: SearchMode) -> Self {
        match mode {
            SearchMode::Semantic => Payload::Entries(Vec::new()),
            SearchMode::Search => Payload::Followups(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Payload::Followups(f) => f.len(),
            Payload::Entries(e) => e.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn followups(&self) -> &[Followup] {
        match self {
            Payload::Followups(f) => f,
            Payload::Entries(_) => &[],
        }
    }

    pub fn entries(&self) -> &[SemanticEntry] {
        match self {
            Payload::Entries(e) => e,
            Payload::Followups(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    pub query: String,
    pub source: QuerySource,
}

/// Typed failure at the network boundary. Never reaches the user as an error;
/// the lifecycle logs it and falls back to an empty result set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("backend returned HTTP {0}")]
    Status(u16),
    #[error("malformed response body: {0}")]
    Decode(String),
}

/// Result of one request, as seen by the lifecycle manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Cancelled,
    Failed(BackendError),
    Succeeded(Payload),
}

/// Two-state lifecycle. `Busy` keeps the payload that was on screen before the
/// submission so a cancel can put it back untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleState {
    Idle { payload: Payload },
    Busy { seq: u64, previous: Payload },
}

impl LifecycleState {
    pub fn is_busy(&self) -> bool {
        matches!(self, LifecycleState::Busy { .. })
    }

    /// Payload to render; while Busy nothing new has arrived yet.
    pub fn payload(&self) -> &Payload {
        match self {
            LifecycleState::Idle { payload } => payload,
            LifecycleState::Busy { previous, .. } => previous,
        }
    }
}

/// Machine-readable record of a one-shot query, printed by `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub timestamp_utc: String,
    pub base_url: String,
    pub mode: SearchMode,
    pub query: String,
    pub query_source: QuerySource,
    pub status: ReportStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub followups: Vec<Followup>,
    pub entries: Vec<SemanticEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Succeeded,
    Failed,
    Cancelled,
}
