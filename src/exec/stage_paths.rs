use std::path::{Path, PathBuf};

use crate::fs::Fs;

/// Reusable container for one stage's artifact paths.
///
/// All three are pure functions of (root, conf_id, stage name); none of them
/// depends on how execution turns out.
pub struct StagePaths {
    parametrized: PathBuf,
    executed: PathBuf,
    report_dir: PathBuf,
    report: PathBuf,
}

impl StagePaths {
    pub fn new() -> Self {
        Self {
            parametrized: PathBuf::with_capacity(512),
            executed: PathBuf::with_capacity(512),
            report_dir: PathBuf::with_capacity(512),
            report: PathBuf::with_capacity(512),
        }
    }

    pub fn make_paths(&mut self, fs: &Fs, conf_id: &str, stage: &str) {
        fs.parametrized(conf_id, stage, &mut self.parametrized);
        fs.executed(conf_id, stage, &mut self.executed);
        fs.report_dir(conf_id, &mut self.report_dir);
        fs.report(conf_id, stage, &mut self.report);
    }

    pub fn parametrized(&self) -> &Path {
        &self.parametrized
    }

    pub fn executed(&self) -> &Path {
        &self.executed
    }

    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    pub fn report(&self) -> &Path {
        &self.report
    }
}
