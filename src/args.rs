use clap::Parser;

const CMD_NAME: &str = "nbchain";
const DEFAULT_ROOT: &str = ".";
const DEFAULT_MEMORY: &str = "4gb";
const DEFAULT_WALLTIME: &str = "04:00:00";

/// Stores our command-line args format.
#[derive(Parser)]
#[command(name = CMD_NAME, version, about = None, long_about = None)]
pub struct Args {
    /// Configuration identifier to run the pipeline for
    #[arg(value_name = "CONF_ID")]
    pub conf_id: String,

    /// Workflow root directory
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_ROOT)]
    #[arg(env = "NBCHAIN_ROOT")]
    pub root: String,

    /// Notebook template directory [default: <ROOT>/notebooks]
    #[arg(long, value_name = "DIR")]
    pub templates: Option<String>,

    /// Parameter file root [default: <ROOT>/conf]
    #[arg(long, value_name = "DIR")]
    pub params: Option<String>,

    /// Output root for parametrized notebooks [default: <ROOT>/parametrized]
    #[arg(long, value_name = "DIR")]
    pub parametrized: Option<String>,

    /// Output root for executed notebooks [default: <ROOT>/executed]
    #[arg(long, value_name = "DIR")]
    pub executed: Option<String>,

    /// Output root for rendered reports [default: <ROOT>/reports]
    #[arg(long, value_name = "DIR")]
    pub reports: Option<String>,

    /// Number of cpus to request per job
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub cpus: u32,

    /// Memory to request per job
    #[arg(long, value_name = "MEM", default_value = DEFAULT_MEMORY)]
    pub memory: String,

    /// Walltime to request per job
    #[arg(long, value_name = "HH:MM:SS", default_value = DEFAULT_WALLTIME)]
    pub walltime: String,

    /// Scheduler queue to submit to
    #[arg(short, long, value_name = "QUEUE")]
    pub queue: Option<String>,

    /// Submit every job without a dependency clause
    #[arg(long)]
    pub no_depend: bool,

    /// Environment to activate before running each stage
    #[arg(long, value_name = "NAME")]
    pub env_name: Option<String>,

    /// Environment manager executable used to activate --env-name
    #[arg(long, value_name = "PATH", env = "NBCHAIN_ENV_MANAGER")]
    pub env_manager: Option<String>,

    /// Notebook execution executable
    #[arg(long, value_name = "PATH", default_value = "papermill")]
    #[arg(env = "NBCHAIN_PAPERMILL")]
    pub papermill: String,

    /// Jupyter executable, used to render reports
    #[arg(long, value_name = "PATH", default_value = "jupyter")]
    #[arg(env = "NBCHAIN_JUPYTER")]
    pub jupyter: String,

    /// Scheduler submission executable
    #[arg(long, value_name = "PATH", default_value = "qsub")]
    #[arg(env = "NBCHAIN_QSUB")]
    pub qsub: String,

    /// Print additional debugging info (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
