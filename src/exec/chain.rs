use anyhow::{Context, Result};

use crate::fs::Fs;
use crate::prep::Stage;
use crate::settings::Settings;

use super::{BackendCmd, JobId, JobRunner, JobSpec, StagePaths};

/// Submits one configuration's stages as a dependency chain.
///
/// The chain is strictly sequential: each job depends on the one submitted
/// just before it and on nothing else. The loop is a fold over the stages
/// carrying a single `Option<JobId>` accumulator, which is overwritten by
/// every submission and becomes the next stage's dependency anchor.
pub struct ChainSubmitter<'a> {
    fs: &'a Fs,
    settings: &'a Settings,
    paths: StagePaths,
}

impl<'a> ChainSubmitter<'a> {
    pub fn new(fs: &'a Fs, settings: &'a Settings) -> Self {
        Self {
            fs,
            settings,
            paths: StagePaths::new(),
        }
    }

    /// Hand every stage to the runner, in discovery order. Stops at the
    /// first failed submission or stage: a later job's dependency anchor
    /// would be invalid.
    pub fn submit_all(&mut self, stages: &[Stage], runner: &mut dyn JobRunner) -> Result<()> {
        let conf_id = &self.settings.conf_id;
        let backend = BackendCmd::new(&self.settings.programs);

        stages.iter().try_fold(None, |last_job_id: Option<JobId>, stage| {
            self.paths.make_paths(self.fs, conf_id, &stage.name);
            self.ensure_stage_dirs()
                .with_context(|| format!("while creating dirs for stage \"{}\"", stage.name))?;
            log::debug!(
                "stage \"{}\": executed notebook at {:?}, report at {:?}",
                stage.name,
                self.paths.executed(),
                self.paths.report(),
            );

            let script = backend.script(
                self.paths.parametrized(),
                self.paths.executed(),
                self.paths.report_dir(),
            )?;
            let job = JobSpec {
                name: format!("{conf_id}_{}", stage.name),
                stage: &stage.name,
                script,
            };

            let dep = if self.settings.chain_deps {
                last_job_id
            } else {
                None
            };
            runner
                .submit(job, dep.as_ref())
                .with_context(|| format!("while submitting stage \"{}\"", stage.name))
        })?;

        Ok(())
    }

    fn ensure_stage_dirs(&self) -> Result<()> {
        self.fs.create_parent_dir(self.paths.parametrized())?;
        self.fs.create_parent_dir(self.paths.executed())?;
        self.fs.create_dir(self.paths.report_dir())?;
        Ok(())
    }
}
