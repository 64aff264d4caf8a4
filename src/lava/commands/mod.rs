use crate::parameter::Parameter;
use crate::scheduler::JobStatus;
use crate::store::StoredEntry;
use std::path::PathBuf;

pub mod config;
pub mod new;
pub mod status;
pub mod submit;
pub mod templates;

/// Stored list of submitted job ids that have not finished yet.
pub const JOBS_ID: &str = "jobs_id";

/// The `jobs_id` list, already confirmed so it is never prompted for.
pub(crate) fn jobs_id_parameter() -> Parameter {
    let mut param = Parameter::list(JOBS_ID);
    param.mark_asked();
    param
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CmdResult {
    pub job_file: Option<PathBuf>,
    pub job_id: Option<String>,
    pub job_status: Option<JobStatus>,
    pub entries: Vec<StoredEntry>,
    pub templates: Vec<(&'static str, &'static str)>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_job_file(mut self, path: PathBuf) -> Self {
        self.job_file = Some(path);
        self
    }

    pub fn with_job_id(mut self, job_id: impl Into<String>) -> Self {
        self.job_id = Some(job_id.into());
        self
    }

    pub fn with_job_status(mut self, status: JobStatus) -> Self {
        self.job_status = Some(status);
        self
    }

    pub fn with_entries(mut self, entries: Vec<StoredEntry>) -> Self {
        self.entries = entries;
        self
    }

    pub fn with_templates(mut self, templates: Vec<(&'static str, &'static str)>) -> Self {
        self.templates = templates;
        self
    }
}
