use std::path::{Path, PathBuf};

use super::Fs;

/// Extension of stage parameter files.
pub const PARAM_EXT: &str = "yaml";
/// Extension of notebook templates and their copies.
pub const NOTEBOOK_EXT: &str = "ipynb";
/// Extension of rendered reports.
pub const REPORT_EXT: &str = "html";

/// Utility fns for making the well-known paths of a run.
/// Each artifact path is a pure function of (root, conf_id, stage name),
/// so callers and tests can always predict the exact produced path.
impl Fs {
    /// $TEMPLATES
    pub fn templates_dir(&self) -> &Path {
        &self.templates
    }

    /// $PARAMS/conf_id
    pub fn conf_dir<'a>(&self, conf_id: &str, buf: &'a mut PathBuf) -> &'a Path {
        self.parts2(&self.params, conf_id, buf)
    }

    /// $PARAMS/conf_id/stage.yaml
    pub fn param_file<'a>(&self, conf_id: &str, stage: &str, buf: &'a mut PathBuf) -> &'a Path {
        self.parts3(&self.params, conf_id, file_name(stage, PARAM_EXT), buf)
    }

    /// $PARAMETRIZED/conf_id/stage.ipynb
    pub fn parametrized<'a>(&self, conf_id: &str, stage: &str, buf: &'a mut PathBuf) -> &'a Path {
        self.parts3(&self.parametrized, conf_id, file_name(stage, NOTEBOOK_EXT), buf)
    }

    /// $EXECUTED/conf_id/stage.ipynb
    pub fn executed<'a>(&self, conf_id: &str, stage: &str, buf: &'a mut PathBuf) -> &'a Path {
        self.parts3(&self.executed, conf_id, file_name(stage, NOTEBOOK_EXT), buf)
    }

    /// $EXECUTED/conf_id/stage.out.txt (stdout of a locally run stage)
    pub fn stage_stdout<'a>(&self, conf_id: &str, stage: &str, buf: &'a mut PathBuf) -> &'a Path {
        self.parts3(&self.executed, conf_id, file_name(stage, "out.txt"), buf)
    }

    /// $EXECUTED/conf_id/stage.err.txt (stderr of a locally run stage)
    pub fn stage_stderr<'a>(&self, conf_id: &str, stage: &str, buf: &'a mut PathBuf) -> &'a Path {
        self.parts3(&self.executed, conf_id, file_name(stage, "err.txt"), buf)
    }

    /// $REPORTS/conf_id/notebooks
    pub fn report_dir<'a>(&self, conf_id: &str, buf: &'a mut PathBuf) -> &'a Path {
        self.parts3(&self.reports, conf_id, "notebooks", buf)
    }

    /// $REPORTS/conf_id/notebooks/stage.html
    pub fn report<'a>(&self, conf_id: &str, stage: &str, buf: &'a mut PathBuf) -> &'a Path {
        buf.clear();
        buf.push(&self.reports);
        buf.push(conf_id);
        buf.push("notebooks");
        buf.push(file_name(stage, REPORT_EXT));
        &*buf
    }

    fn parts2<'a, T, U>(&self, p1: T, p2: U, buf: &'a mut PathBuf) -> &'a Path
    where
        T: AsRef<Path>,
        U: AsRef<Path>,
    {
        buf.clear();
        buf.push(p1);
        buf.push(p2);
        &*buf
    }

    fn parts3<'a, T, U, V>(&self, p1: T, p2: U, p3: V, buf: &'a mut PathBuf) -> &'a Path
    where
        T: AsRef<Path>,
        U: AsRef<Path>,
        V: AsRef<Path>,
    {
        buf.clear();
        buf.push(p1);
        buf.push(p2);
        buf.push(p3);
        &*buf
    }
}

/// `stage.ext`, without `set_extension`'s clobbering of dots in stage names.
fn file_name(stem: &str, ext: &str) -> String {
    let mut name = String::with_capacity(stem.len() + ext.len() + 1);
    name.push_str(stem);
    name.push('.');
    name.push_str(ext);
    name
}
