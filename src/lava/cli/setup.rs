use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lava", bin_name = "lava", version)]
#[command(about = "Prepare, submit and follow LAVA test jobs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// File holding remembered answers
    #[arg(
        short,
        long,
        global = true,
        env = "LAVA_CONFIG",
        value_name = "PATH",
        help_heading = "Options"
    )]
    pub config: Option<PathBuf>,

    /// Ask for every value, offering remembered ones as defaults
    #[arg(short, long, global = true, help_heading = "Options")]
    pub interactive: bool,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// LAVA job file handling
    #[command(subcommand)]
    Job(JobCommands),

    /// Show or change remembered values
    Config {
        /// Parameter id
        key: Option<String>,

        /// New value
        value: Option<String>,

        /// Namespace, e.g. "device_type=panda" (default: DEFAULT)
        #[arg(short, long)]
        namespace: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum JobCommands {
    /// Create a new job file
    New {
        /// Job file to create (".json" is appended when missing)
        file: PathBuf,

        /// Template to start from
        #[arg(short, long)]
        template: Option<String>,

        /// Local directory with test definitions, shipped as a tar repository
        #[arg(long, value_name = "DIR")]
        tests_dir: Option<String>,
    },

    /// Submit a job file to the LAVA server
    Submit {
        /// The job file to submit
        file: PathBuf,
    },

    /// Show the status of a submitted job
    Status {
        /// Job id; pick from the submitted ones when omitted
        job_id: Option<String>,
    },

    /// List the available job templates
    Templates,
}
