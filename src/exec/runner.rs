use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use colored::Colorize;

use crate::fs::Fs;
use crate::settings::Resources;
use crate::ui::Ui;

use super::run_cmd::run_cmd;
use super::Error;

/// Identifier assigned by the scheduler to a submitted job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobId(pub(crate) String);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One unit of work: a single stage of one configuration's chain.
#[derive(Debug)]
pub struct JobSpec<'a> {
    /// Job name, `<conf_id>_<stage>`
    pub name: String,
    /// Bare stage name, used for log file naming
    pub stage: &'a str,
    /// The script the job runs
    pub script: String,
}

/// The capability of getting one job executed.
///
/// The submission loop is written once against this trait; the two
/// implementations only differ in how the chain's ordering is enforced.
/// `PbsRunner` expresses it as scheduler metadata and returns without
/// waiting; `LocalRunner` expresses it as program order, blocking until the
/// stage completes, and never produces a job id.
pub trait JobRunner {
    fn submit(&mut self, job: JobSpec, dep: Option<&JobId>) -> Result<Option<JobId>>;
}

/// One-time probe for scheduler availability. A scheduler that disappears
/// after this check surfaces as a submission error, never as a silent
/// fallback to local execution.
pub fn detect_scheduler(qsub: &str) -> bool {
    let found = Command::new(qsub)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok();
    if found {
        log::info!("scheduler detected at \"{qsub}\"");
    } else {
        log::info!("no scheduler at \"{qsub}\"");
    }
    found
}

/// Submits jobs to a PBS-style batch scheduler, asynchronously.
pub struct PbsRunner<'a> {
    qsub: &'a str,
    resources: &'a Resources,
}

impl<'a> PbsRunner<'a> {
    pub fn new(qsub: &'a str, resources: &'a Resources) -> Self {
        Self { qsub, resources }
    }
}

impl JobRunner for PbsRunner<'_> {
    fn submit(&mut self, job: JobSpec, dep: Option<&JobId>) -> Result<Option<JobId>> {
        let mut cmd = Command::new(self.qsub);
        cmd.arg("-N").arg(&job.name);
        cmd.arg("-l").arg(format!(
            "select=1:ncpus={}:mem={}",
            self.resources.cpus, self.resources.memory
        ));
        cmd.arg("-l").arg(format!("walltime={}", self.resources.walltime));
        if let Some(queue) = &self.resources.queue {
            cmd.arg("-q").arg(queue);
        }
        if let Some(dep) = dep {
            cmd.arg("-W").arg(format!("depend=afterok:{dep}"));
        }
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        log::debug!("submitting job \"{}\": {:?}", job.name, cmd);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("while spawning scheduler \"{}\"", self.qsub))?;

        // the job script goes to the scheduler's stdin:
        let mut stdin = child.stdin.take().expect("Cannot attach to child stdin");
        stdin
            .write_all(job.script.as_bytes())
            .context("while writing job script to scheduler")?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .context("while reading scheduler reply")?;
        if !output.status.success() {
            let detail = String::from_utf8_lossy(&output.stderr).trim().to_owned();
            return Err(Error::SubmitFailed(job.name, detail).into());
        }

        let reply = String::from_utf8_lossy(&output.stdout);
        let id = parse_job_id(&reply)?;
        eprintln!("{} {} as job {id}", "SUBMITTED".green(), job.name);
        Ok(Some(id))
    }
}

/// Extract the job id from the scheduler's reply: its first
/// whitespace-delimited token.
fn parse_job_id(reply: &str) -> Result<JobId, Error> {
    reply
        .split_whitespace()
        .next()
        .map(|token| JobId(token.to_owned()))
        .ok_or_else(|| Error::UnexpectedSchedulerReply(reply.to_owned()))
}

/// Executes jobs synchronously, in-process, when no scheduler is available.
/// Ordering is enforced by blocking on each stage, so the dependency argument
/// is never consulted and no job ids exist in this mode.
pub struct LocalRunner<'a> {
    fs: &'a Fs,
    conf_id: &'a str,
    ui: Ui,
    pathbuf: PathBuf,
}

impl<'a> LocalRunner<'a> {
    pub fn new(fs: &'a Fs, conf_id: &'a str, ui: Ui) -> Self {
        Self {
            fs,
            conf_id,
            ui,
            pathbuf: PathBuf::with_capacity(256),
        }
    }
}

impl JobRunner for LocalRunner<'_> {
    fn submit(&mut self, job: JobSpec, _dep: Option<&JobId>) -> Result<Option<JobId>> {
        self.ui.start_timer();
        eprintln!("{} {}", "RUN".green(), job.name);

        let mut cmd = Command::new("/usr/bin/env");
        cmd.arg("bash")
            .arg("-euo")
            .arg("pipefail")
            .arg("-c")
            .arg(&job.script);

        let success = run_cmd(
            &mut cmd,
            self.fs,
            self.conf_id,
            job.stage,
            &mut self.pathbuf,
            self.ui.verbose,
        )?;
        if !success {
            return Err(Error::StageFailed(job.stage.to_owned()).into());
        }

        self.ui.print_elapsed("Stage execution")?;
        eprintln!("{} {}\n", "COMPLETED".green(), job.name);
        Ok(None)
    }
}
