use crate::engine::{HttpBackend, SearchBackend};
use crate::model::{
    QueryOutcome, QueryReport, QuerySource, ReportStatus, SearchConfig, SearchMode,
};
use crate::orchestrator::{self, Rejected, SearchLifecycle};
use anyhow::{Context, Result};
use clap::Parser;
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Output line routing for stdout/stderr writer.
enum OutputLine {
    Stdout(String),
    Stderr(String),
}

/// Spawn a blocking writer for stdout/stderr to avoid blocking async tasks.
fn spawn_output_writer() -> (
    mpsc::UnboundedSender<OutputLine>,
    tokio::task::JoinHandle<()>,
) {
    let (tx, mut rx) = mpsc::unbounded_channel::<OutputLine>();
    let handle = tokio::task::spawn_blocking(move || {
        let stdout = std::io::stdout();
        let stderr = std::io::stderr();
        let mut out = std::io::LineWriter::new(stdout.lock());
        let mut err = std::io::LineWriter::new(stderr.lock());

        while let Some(line) = rx.blocking_recv() {
            match line {
                OutputLine::Stdout(msg) => {
                    let _ = writeln!(out, "{}", msg);
                }
                OutputLine::Stderr(msg) => {
                    let _ = writeln!(err, "{}", msg);
                }
            }
        }

        let _ = out.flush();
        let _ = err.flush();
    });
    (tx, handle)
}

#[derive(Debug, Parser, Clone)]
#[command(
    name = "searchbox",
    version,
    about = "Search box for a remote retrieval service, with optional TUI"
)]
pub struct Cli {
    /// Base URL of the retrieval API
    #[arg(long, env = "SEARCHBOX_API_URL", default_value = "http://localhost:3000/api")]
    pub api_url: String,

    /// Which endpoint to query: semantic entries or follow-up search
    #[arg(long, value_enum, default_value_t = SearchMode::Semantic)]
    pub mode: SearchMode,

    /// Path of the follow-up search endpoint, relative to the API URL
    #[arg(long, default_value = "/search")]
    pub search_path: String,

    /// Initial query (a random example question when omitted)
    #[arg(long, short)]
    pub query: Option<String>,

    /// Run the query once and print a JSON report (no TUI)
    #[arg(long)]
    pub json: bool,

    /// Run the query once and print results as text (no TUI)
    #[arg(long)]
    pub text: bool,

    /// Per-request timeout (no timeout when omitted)
    #[arg(long)]
    pub timeout: Option<humantime::Duration>,

    /// Log file for interactive sessions
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log filter, e.g. info or searchbox=debug (RUST_LOG takes precedence)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

pub async fn run(args: Cli) -> Result<()> {
    if args.json && args.text {
        return Err(anyhow::anyhow!("--json and --text are mutually exclusive"));
    }

    if !args.json && !args.text {
        #[cfg(feature = "tui")]
        {
            let log_path = args
                .log_file
                .clone()
                .unwrap_or_else(crate::logging::default_log_path);
            crate::logging::init_file(&log_path, &args.log_level)?;
            return crate::tui::run(args).await;
        }
        #[cfg(not(feature = "tui"))]
        {
            // Fallback when built without TUI support.
            crate::logging::init_stderr(&args.log_level)?;
            return run_once(args).await;
        }
    }

    crate::logging::init_stderr(&args.log_level)?;
    run_once(args).await
}

/// Build a `SearchConfig` from CLI arguments.
pub fn build_config(args: &Cli) -> SearchConfig {
    SearchConfig {
        api_url: args.api_url.clone(),
        mode: args.mode,
        search_path: args.search_path.clone(),
        initial_query: args
            .query
            .clone()
            .unwrap_or_else(crate::questions::random_question),
        timeout: args.timeout.map(Into::into),
        user_agent: format!("searchbox-cli/{}", env!("CARGO_PKG_VERSION")),
    }
}

/// What a one-shot run produced, before any of it is written out.
pub(crate) struct OneShotOutput {
    pub report: QueryReport,
    pub stdout: Vec<String>,
    /// Maps to the process exit code.
    pub status: Result<()>,
}

/// Run a single query through the lifecycle and print the result.
async fn run_once(args: Cli) -> Result<()> {
    let cfg = build_config(&args);
    let backend = HttpBackend::new(&cfg)?;

    let (out_tx, out_handle) = spawn_output_writer();
    if !args.json {
        let _ = out_tx.send(OutputLine::Stderr(format!("Query: {}", cfg.initial_query)));
    }

    let ctrl_c = async {
        // Without a signal handler the query just runs to completion.
        if tokio::signal::ctrl_c().await.is_err() {
            futures::future::pending::<()>().await;
        }
    };
    let output = run_once_with(backend, &cfg, args.json, ctrl_c).await?;
    tracing::info!(status = ?output.report.status, "one-shot query finished");

    for line in output.stdout {
        let _ = out_tx.send(OutputLine::Stdout(line));
    }
    drop(out_tx);
    let _ = out_handle.await;
    output.status
}

/// Submit `cfg.initial_query`, wait for it or for `cancel`, and render the
/// outcome as JSON (`json`) or as a text summary.
pub(crate) async fn run_once_with<B, C>(
    backend: B,
    cfg: &SearchConfig,
    json: bool,
    cancel: C,
) -> Result<OneShotOutput>
where
    B: SearchBackend,
    C: Future<Output = ()>,
{
    let mut lifecycle = SearchLifecycle::new(backend, cfg.mode);
    let query = cfg.initial_query.clone();
    let source = QuerySource::Search;

    match lifecycle.submit(query.clone(), source) {
        Ok(_) => {}
        Err(Rejected::BlankQuery) => return Err(anyhow::anyhow!("query must not be blank")),
        Err(Rejected::Busy) => return Err(anyhow::anyhow!("a query is already running")),
    }

    let outcome = tokio::select! {
        (seq, outcome) = lifecycle.next_completion() => {
            lifecycle.apply(seq, outcome.clone());
            outcome
        }
        _ = cancel => {
            lifecycle.cancel();
            QueryOutcome::Cancelled
        }
    };

    let report = orchestrator::build_report(cfg, &query, source, &outcome);
    let stdout = if json {
        vec![serde_json::to_string_pretty(&report).context("serialize report")?]
    } else {
        crate::text_summary::build_text_summary(lifecycle.state().payload()).lines
    };

    let status = match report.status {
        ReportStatus::Succeeded => Ok(()),
        ReportStatus::Cancelled => Err(anyhow::anyhow!("query cancelled")),
        ReportStatus::Failed if json => Ok(()),
        ReportStatus::Failed => Err(anyhow::anyhow!(
            "query failed: {}",
            report.error.clone().unwrap_or_default()
        )),
    };

    Ok(OneShotOutput {
        report,
        stdout,
        status,
    })
}
