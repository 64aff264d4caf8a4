use crate::commands::{CmdMessage, CmdResult};
use crate::error::{LavaError, Result};
use crate::prompt::Prompter;
use crate::resolver::Resolver;
use crate::store::ConfigStore;
use crate::templates::{self, DEFAULT_TEMPLATE, LAVA_TEST_SHELL_TAR_REPO, TESTDEF_REPOS_TAR_REPO};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const JOB_FILE_EXTENSION: &str = "json";

/// `job` with `.json` appended when it has no extension. Any other extension
/// is refused.
pub fn job_file_path(file: &Path) -> Result<PathBuf> {
    match file.extension().and_then(|ext| ext.to_str()) {
        None => Ok(file.with_extension(JOB_FILE_EXTENSION)),
        Some(JOB_FILE_EXTENSION) => Ok(file.to_path_buf()),
        Some(other) => Err(LavaError::Command(format!(
            "Wrong job file extension '.{}', expected '.{}'.",
            other, JOB_FILE_EXTENSION
        ))),
    }
}

pub fn run<S: ConfigStore + ?Sized>(
    store: &mut S,
    prompter: &mut dyn Prompter,
    force_interactive: bool,
    file: &Path,
    template: Option<&str>,
    tests_dir: Option<&str>,
) -> Result<CmdResult> {
    let path = job_file_path(file)?;
    if path.exists() {
        return Err(LavaError::Command(format!(
            "{} already exists.",
            path.display()
        )));
    }

    let template = template.unwrap_or(if tests_dir.is_some() {
        LAVA_TEST_SHELL_TAR_REPO
    } else {
        DEFAULT_TEMPLATE
    });
    let mut job = templates::lookup(template)?;

    if let Some(dir) = tests_dir {
        let tar_repo = job.parameter_mut(TESTDEF_REPOS_TAR_REPO).ok_or_else(|| {
            LavaError::Command(format!(
                "Template '{}' does not take a tests directory.",
                template
            ))
        })?;
        tar_repo.set(dir);
        tar_repo.mark_asked();
    }

    let mut resolver = Resolver::new(prompter).force_interactive(force_interactive);
    job.fill_in(&mut resolver, store)?;

    // Rendered in full before the file is created, so a failure leaves nothing behind.
    let mut content = Vec::new();
    job.write(&mut content)?;
    fs::write(&path, content)?;
    info!(path = %path.display(), template, "Wrote job file");

    let mut result = CmdResult::default().with_job_file(path.clone());
    result.add_message(CmdMessage::success(format!(
        "Created job file {}",
        path.display()
    )));
    Ok(result)
}
