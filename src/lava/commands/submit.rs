use crate::commands::{jobs_id_parameter, CmdMessage, CmdResult};
use crate::error::{LavaError, Result};
use crate::parameter::{Parameter, ParameterSet};
use crate::prompt::Prompter;
use crate::resolver::Resolver;
use crate::scheduler::xmlrpc::XmlRpcScheduler;
use crate::scheduler::Scheduler;
use crate::store::ConfigStore;
use std::fs;
use std::path::Path;
use tracing::debug;

pub const SERVER_SCHEME: &str = "server_scheme";
pub const SERVER: &str = "server";
pub const RPC_ENDPOINT: &str = "rpc_endpoint";
pub const DEFAULT_RPC_ENDPOINT: &str = "RPC2";

/// Asks for (or recalls) the scheduler location and returns its URL. The
/// RPC endpoint is remembered per server.
pub fn resolve_endpoint<S: ConfigStore + ?Sized>(
    store: &mut S,
    prompter: &mut dyn Prompter,
    force_interactive: bool,
) -> Result<String> {
    let mut params = ParameterSet::new();
    let scheme = params.declare(Parameter::url_scheme(SERVER_SCHEME, ["http", "https"]));
    let server = params.declare(Parameter::new(SERVER));
    let endpoint = params.declare(
        Parameter::new(RPC_ENDPOINT)
            .with_value(DEFAULT_RPC_ENDPOINT)
            .depends_on(server),
    );

    let mut resolver = Resolver::new(prompter).force_interactive(force_interactive);
    let scheme = resolver.resolve(&mut params, scheme, store)?;
    let server = resolver.resolve(&mut params, server, store)?;
    let endpoint = resolver.resolve(&mut params, endpoint, store)?;

    let url = XmlRpcScheduler::endpoint_url(
        &scheme.to_string(),
        &server.to_string(),
        &endpoint.to_string(),
    );
    debug!(url = %url, "Resolved scheduler endpoint");
    Ok(url)
}

pub fn run<S: ConfigStore + ?Sized>(
    store: &mut S,
    scheduler: &dyn Scheduler,
    file: &Path,
) -> Result<CmdResult> {
    if !file.is_file() {
        return Err(LavaError::Command(format!(
            "The file '{}' does not exist, or it is not a file.",
            file.display()
        )));
    }
    let document = fs::read_to_string(file)?;
    let job_id = scheduler.submit_job(&document)?;

    let mut result = CmdResult::default().with_job_id(job_id.clone());
    result.add_message(CmdMessage::success(format!(
        "Job submitted with job ID {}",
        job_id
    )));

    if !job_id.is_empty() {
        remember_job_id(store, &job_id)?;
    }
    Ok(result)
}

fn remember_job_id<S: ConfigStore + ?Sized>(store: &mut S, job_id: &str) -> Result<()> {
    let mut params = ParameterSet::new();
    let jobs = params.declare(jobs_id_parameter());
    if let Some(raw) = store.get_from_backend(&params, jobs)? {
        let stored = params[jobs].deserialize(&raw)?;
        params[jobs].set(stored);
    }
    params[jobs].add(job_id);
    store.put_parameter(&params, jobs, None)
}
