//! # Scheduler
//!
//! The remote LAVA server that accepts job documents. Commands only see the
//! [`Scheduler`] trait:
//!
//! - [`xmlrpc::XmlRpcScheduler`]: talks XML-RPC over HTTP(S).
//! - [`memory::InMemoryScheduler`]: records submissions, for tests.

use crate::error::Result;

pub mod memory;
pub mod xmlrpc;

/// Status values that mean the job has not finished yet.
pub const OUTSTANDING_STATUSES: &[&str] = &["running", "submitted"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobStatus {
    /// Lowercased, e.g. `complete`, `running`.
    pub status: String,
    pub bundle: String,
}

impl JobStatus {
    pub fn new(status: impl Into<String>, bundle: impl Into<String>) -> Self {
        Self {
            status: status.into().to_lowercase(),
            bundle: bundle.into(),
        }
    }

    pub fn is_finished(&self) -> bool {
        !OUTSTANDING_STATUSES.contains(&self.status.as_str())
    }
}

pub trait Scheduler {
    /// Submits a job document and returns the id the server assigned.
    fn submit_job(&self, document: &str) -> Result<String>;

    fn job_status(&self, job_id: &str) -> Result<JobStatus>;
}
