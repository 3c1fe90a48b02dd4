//! Application-level orchestration utilities.
//!
//! This module owns the query lifecycle (submit/cancel/complete) and turns
//! finished queries into reports for the one-shot output modes. UI/CLI layers
//! call into this module to keep responsibilities separated.

mod controller;
mod post_process;

pub(crate) use controller::{Rejected, SearchLifecycle};
pub(crate) use post_process::build_report;
