use crate::commands::{jobs_id_parameter, CmdMessage, CmdResult};
use crate::error::{LavaError, Result};
use crate::parameter::{ParamRef, Parameter, ParameterSet};
use crate::prompt::Prompter;
use crate::scheduler::Scheduler;
use crate::store::ConfigStore;
use tracing::info;

fn stored_job_ids<S: ConfigStore + ?Sized>(store: &S) -> Result<(ParameterSet, ParamRef)> {
    let mut params = ParameterSet::new();
    let jobs = params.declare(jobs_id_parameter());
    if let Some(raw) = store.get_from_backend(&params, jobs)? {
        let stored = params[jobs].deserialize(&raw)?;
        params[jobs].set(stored);
    }
    Ok((params, jobs))
}

/// Lets the user pick one of the stored job ids.
pub fn pick_job_id<S: ConfigStore + ?Sized>(
    store: &S,
    prompter: &mut dyn Prompter,
) -> Result<String> {
    let (params, jobs) = stored_job_ids(store)?;
    let ids = params[jobs]
        .value
        .as_ref()
        .and_then(|v| v.as_list())
        .map(<[String]>::to_vec)
        .unwrap_or_default();
    if ids.is_empty() {
        return Err(LavaError::Command(
            "No job ids stored. Please provide one on the command line.".to_string(),
        ));
    }

    let chosen = Parameter::single_choice("job_id", ids).prompt(prompter, "Job ids: ", None)?;
    Ok(chosen.to_string())
}

/// Prints the status of `job_id`. With `forget_finished`, a job that is no
/// longer outstanding is dropped from the stored list.
pub fn run<S: ConfigStore + ?Sized>(
    store: &mut S,
    scheduler: &dyn Scheduler,
    job_id: &str,
    forget_finished: bool,
) -> Result<CmdResult> {
    let status = scheduler.job_status(job_id)?;

    let mut result = CmdResult::default()
        .with_job_id(job_id)
        .with_job_status(status.clone());
    result.add_message(CmdMessage::info(format!("Job id: {}", job_id)));
    result.add_message(CmdMessage::info(format!("Status: {}", status.status)));
    result.add_message(CmdMessage::info(format!("Bundle: {}", status.bundle)));

    if forget_finished && status.is_finished() {
        let (mut params, jobs) = stored_job_ids(store)?;
        if params[jobs].remove(job_id) {
            store.put_parameter(&params, jobs, None)?;
            info!(job_id, status = %status.status, "Forgot finished job");
        }
    }
    Ok(result)
}
