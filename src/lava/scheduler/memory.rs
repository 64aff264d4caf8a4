use super::{JobStatus, Scheduler};
use crate::error::{LavaError, Result};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Scheduler double: hands out sequential ids and answers status queries
/// from a fixed table.
#[derive(Debug, Default)]
pub struct InMemoryScheduler {
    submitted: RefCell<Vec<String>>,
    statuses: BTreeMap<String, JobStatus>,
    next_id: u64,
}

impl InMemoryScheduler {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    pub fn starting_at(mut self, id: u64) -> Self {
        self.next_id = id;
        self
    }

    pub fn with_status(mut self, job_id: &str, status: &str, bundle: &str) -> Self {
        self.statuses
            .insert(job_id.to_string(), JobStatus::new(status, bundle));
        self
    }

    /// Documents received so far, oldest first.
    pub fn submitted(&self) -> Vec<String> {
        self.submitted.borrow().clone()
    }
}

impl Scheduler for InMemoryScheduler {
    fn submit_job(&self, document: &str) -> Result<String> {
        let mut submitted = self.submitted.borrow_mut();
        submitted.push(document.to_string());
        Ok((self.next_id + submitted.len() as u64 - 1).to_string())
    }

    fn job_status(&self, job_id: &str) -> Result<JobStatus> {
        self.statuses
            .get(job_id)
            .cloned()
            .ok_or_else(|| LavaError::Scheduler(format!("Fault 404: Specified job not found: {}", job_id)))
    }
}
