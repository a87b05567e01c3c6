use std::path::Path;

/// Builds the job chain and hands each job to a runner.
mod chain;
pub use chain::ChainSubmitter;

/// Scheduler-backed and local job runners.
mod runner;
pub use runner::{detect_scheduler, JobId, JobRunner, JobSpec, LocalRunner, PbsRunner};

/// Renders the backend invocation for one stage.
mod backend;
use backend::BackendCmd;

/// Run a subprocess, teeing its output.
mod run_cmd;

/// Reusable container for one stage's artifact paths.
mod stage_paths;
use stage_paths::StagePaths;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Scheduler rejected job \"{0}\": {1}")]
    SubmitFailed(String, String),
    #[error("Unexpected scheduler reply: {0:?}")]
    UnexpectedSchedulerReply(String),
    #[error("Stage \"{0}\" failed; aborting remaining stages")]
    StageFailed(String),
    #[error("Filesystem path is not valid UTF-8")]
    PathEncoding,
}

/// Job scripts and scheduler args are plain text, so paths must be UTF-8.
fn path_str(path: &Path) -> Result<&str, Error> {
    path.to_str().ok_or(Error::PathEncoding)
}
