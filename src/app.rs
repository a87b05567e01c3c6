use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::exec::{detect_scheduler, ChainSubmitter, LocalRunner, PbsRunner};
use crate::fs::Fs;
use crate::prep::{Parametrizer, Stage, StageScanner};
use crate::settings::Settings;
use crate::ui::Ui;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("No parameter directory for configuration \"{0}\" (expected at {1:?})")]
    MissingConfDir(String, PathBuf),
}

/// This struct actually runs the command-line app.
pub struct App {
    /// Interpreted command line settings
    settings: Settings,
    /// Filesystem interface
    fs: Fs,
    /// User interface
    ui: Ui,
}

impl App {
    /// Create a new `App`.
    pub fn new(settings: Settings) -> Self {
        let fs = Fs::new(&settings);
        let ui = Ui::new(&settings);
        Self { settings, fs, ui }
    }

    /// Run the app: discover the configuration's stages, parametrize them
    /// all, then submit them as a dependency chain.
    pub fn run(mut self) -> Result<()> {
        self.check_conf_dir()?;

        let stages = self.discover_stages()?;
        if stages.is_empty() {
            eprintln!("{}", "No stages to run; exiting.".green());
            return Ok(());
        }

        self.parametrize(&stages)?;
        self.submit(&stages)
    }

    /// A configuration without a parameter directory is a hard error, caught
    /// before any artifact directory is created.
    fn check_conf_dir(&self) -> Result<()> {
        let mut buf = PathBuf::with_capacity(256);
        let conf_dir = self.fs.conf_dir(&self.settings.conf_id, &mut buf);
        if !self.fs.is_dir(conf_dir)? {
            return Err(Error::MissingConfDir(
                self.settings.conf_id.clone(),
                conf_dir.to_path_buf(),
            )
            .into());
        }
        Ok(())
    }

    fn discover_stages(&self) -> Result<Vec<Stage>> {
        self.ui.verbose_progress("Scanning templates");
        let stages = StageScanner::new(&self.fs, &self.settings.conf_id).scan()?;
        self.ui.done();

        log::info!(
            "{} active stages for configuration \"{}\"",
            stages.len(),
            self.settings.conf_id
        );
        Ok(stages)
    }

    fn parametrize(&mut self, stages: &[Stage]) -> Result<()> {
        self.ui.start_timer();
        let mut parametrizer = Parametrizer::new(&self.fs);
        for stage in stages {
            self.ui.verbose_progress_debug("Parametrizing", &stage.name);
            parametrizer
                .parametrize(&self.settings.conf_id, stage)
                .with_context(|| format!("while parametrizing stage \"{}\"", stage.name))?;
            self.ui.done();
        }
        self.ui.print_elapsed("Parametrization")?;
        Ok(())
    }

    fn submit(self, stages: &[Stage]) -> Result<()> {
        let App { settings, fs, ui } = self;

        let mut submitter = ChainSubmitter::new(&fs, &settings);
        if detect_scheduler(&settings.programs.qsub) {
            eprintln!("\n{}.\n", "Submitting stage chain to scheduler".magenta());
            let mut runner = PbsRunner::new(&settings.programs.qsub, &settings.resources);
            submitter
                .submit_all(stages, &mut runner)
                .context("while submitting stage chain")?;
        } else {
            eprintln!(
                "\n{}.\n",
                "No scheduler detected; executing stages locally".magenta()
            );
            let mut runner = LocalRunner::new(&fs, &settings.conf_id, ui);
            submitter
                .submit_all(stages, &mut runner)
                .context("while executing stage chain")?;
        }

        eprintln!("{}\n", "Completed stage chain.".green());
        Ok(())
    }
}
