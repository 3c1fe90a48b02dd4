use super::SearchBackend;
use crate::model::{
    BackendError, Payload, QueryRequest, SearchConfig, SearchMode, SearchResponse, SemanticEntry,
};
use anyhow::{Context, Result};
use serde::Serialize;

#[derive(Serialize)]
struct SemanticBody<'a> {
    query: &'a str,
}

#[derive(Serialize)]
struct SearchBody<'a> {
    query: &'a str,
    query_source: &'a str,
}

/// reqwest-backed client for the retrieval service.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    api_url: String,
    search_path: String,
    mode: SearchMode,
}

impl HttpBackend {
    pub fn new(cfg: &SearchConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(cfg.user_agent.clone());
        if let Some(timeout) = cfg.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("build http client")?;
        Ok(Self {
            http,
            api_url: cfg.api_url.trim_end_matches('/').to_string(),
            search_path: normalize_path(&cfg.search_path),
            mode: cfg.mode,
        })
    }

    pub fn endpoint(&self) -> String {
        match self.mode {
            SearchMode::Semantic => format!("{}/semantic", self.api_url),
            SearchMode::Search => format!("{}{}", self.api_url, self.search_path),
        }
    }

    async fn post<T: Serialize + ?Sized>(&self, body: &T) -> Result<reqwest::Response, BackendError> {
        let url = self.endpoint();
        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Transport(format!("{url}: {e}")))?;
        let status = resp.status();
        // Non-2xx is terminal; the body of an error page is never parsed.
        if !status.is_success() {
            return Err(BackendError::Status(status.as_u16()));
        }
        Ok(resp)
    }
}

impl SearchBackend for HttpBackend {
    async fn query(&self, request: QueryRequest) -> Result<Payload, BackendError> {
        match self.mode {
            SearchMode::Semantic => {
                let resp = self
                    .post(&SemanticBody {
                        query: &request.query,
                    })
                    .await?;
                let entries = resp
                    .json::<Vec<SemanticEntry>>()
                    .await
                    .map_err(classify_body_error)?;
                Ok(Payload::Entries(entries))
            }
            SearchMode::Search => {
                let resp = self
                    .post(&SearchBody {
                        query: &request.query,
                        query_source: request.source.as_str(),
                    })
                    .await?;
                let body = resp
                    .json::<SearchResponse>()
                    .await
                    .map_err(classify_body_error)?;
                Ok(Payload::Followups(body.followups))
            }
        }
    }
}

fn classify_body_error(e: reqwest::Error) -> BackendError {
    if e.is_decode() {
        BackendError::Decode(e.to_string())
    } else {
        BackendError::Transport(e.to_string())
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}
