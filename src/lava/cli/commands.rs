//! Context wiring and per-command handlers.
//!
//! - `run()`: parses arguments, installs logging, dispatches
//! - `init_context()`: builds the API over the file store and the terminal
//! - `handle_*()`: call the API and print the result

use super::render::{print_messages, render_entries, render_templates};
use super::setup::{Cli, Commands, JobCommands};
use clap::Parser;
use lava::api::LavaApi;
use lava::commands::config::ConfigAction;
use lava::config::{default_store_path, LavaConfig};
use lava::error::Result;
use lava::prompt::TerminalPrompter;
use lava::store::fs::FileStore;
use std::io::{StdinLock, Stdout};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
const LOG_ENV: &str = "LAVA_LOG";

type CliApi = LavaApi<FileStore, TerminalPrompter<StdinLock<'static>, Stdout>>;

struct AppContext {
    api: CliApi,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut ctx = init_context(&cli)?;

    match cli.command {
        Commands::Job(cmd) => match cmd {
            JobCommands::New {
                file,
                template,
                tests_dir,
            } => handle_new(&mut ctx, file, template, tests_dir),
            JobCommands::Submit { file } => handle_submit(&mut ctx, file),
            JobCommands::Status { job_id } => handle_status(&mut ctx, job_id),
            JobCommands::Templates => handle_templates(&ctx),
        },
        Commands::Config {
            key,
            value,
            namespace,
        } => handle_config(&mut ctx, key, value, namespace),
    }
}

fn init_logging(verbose: bool) {
    // HTTP and TLS internals stay quiet even in verbose mode.
    let filter = if verbose {
        EnvFilter::new("debug,hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let store_path = match &cli.config {
        Some(path) => path.clone(),
        None => default_store_path()?,
    };
    debug!(path = %store_path.display(), "Using configuration file");

    let config = LavaConfig::new(store_path).with_force_interactive(cli.interactive);
    let store = FileStore::new(config.store_path().to_path_buf());
    let api = LavaApi::new(store, TerminalPrompter::stdio(), config);

    Ok(AppContext { api })
}

fn handle_new(
    ctx: &mut AppContext,
    file: PathBuf,
    template: Option<String>,
    tests_dir: Option<String>,
) -> Result<()> {
    let result = ctx
        .api
        .new_job(&file, template.as_deref(), tests_dir.as_deref())?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_submit(ctx: &mut AppContext, file: PathBuf) -> Result<()> {
    let result = ctx.api.submit_job(&file)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_status(ctx: &mut AppContext, job_id: Option<String>) -> Result<()> {
    let result = ctx.api.job_status(job_id.as_deref())?;
    println!();
    print_messages(&result.messages);
    Ok(())
}

fn handle_templates(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.templates()?;
    print!("{}", render_templates(&result.templates));
    Ok(())
}

fn handle_config(
    ctx: &mut AppContext,
    key: Option<String>,
    value: Option<String>,
    namespace: Option<String>,
) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(key), None) => ConfigAction::ShowKey { namespace, key },
        (Some(key), Some(value)) => ConfigAction::Set {
            namespace,
            key,
            value,
        },
    };
    let show_all = matches!(action, ConfigAction::ShowAll);

    let result = ctx.api.configure(action)?;
    if show_all {
        print!("{}", render_entries(&result.entries));
    }
    print_messages(&result.messages);
    Ok(())
}
