use std::path::{Path, PathBuf};
use std::{fs, io};

use anyhow::{Context, Result};

use crate::settings::Settings;

/// Defines fns for creating the well-known paths of a configuration's artifacts
mod paths;
pub use paths::{NOTEBOOK_EXT, PARAM_EXT, REPORT_EXT};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Can't perform IO operation: \"{0}\" is not whitelisted")]
    NotWhitelisted(String),
    #[error("Path has no parent dir: {0:?}")]
    NoParent(PathBuf),
    #[error("Filesystem path is not valid UTF-8")]
    PathEncoding,
}

/// All file operations in the crate should go through this struct.
///
/// Destructive operations check that the path in question is a child of one of
/// the whitelisted output roots (parametrized, executed, reports), otherwise
/// they will not be performed. Template and parameter roots are only ever read.
#[derive(Debug)]
pub struct Fs {
    /// Where the stage templates live
    templates: PathBuf,
    /// Where the per-configuration parameter files live
    params: PathBuf,
    /// Output root for parametrized notebooks
    parametrized: PathBuf,
    /// Output root for executed notebooks
    executed: PathBuf,
    /// Output root for rendered reports
    reports: PathBuf,
}

impl Fs {
    /// Create a new `Fs` with the run's root directories.
    pub fn new(settings: &Settings) -> Self {
        Self {
            templates: settings.templates.clone(),
            params: settings.params.clone(),
            parametrized: settings.parametrized.clone(),
            executed: settings.executed.clone(),
            reports: settings.reports.clone(),
        }
    }

    /// Check if path exists on disk.
    pub fn exists<T: AsRef<Path>>(&self, path: T) -> bool {
        let path = path.as_ref();
        path.exists() || path.is_symlink()
    }

    /// Check if path exists and is a directory.
    pub fn is_dir<T: AsRef<Path>>(&self, path: T) -> Result<bool> {
        let path = path.as_ref();
        if path.is_dir() || (path.is_symlink() && path.canonicalize()?.is_dir()) {
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Create a directory (uses `std::fs::create_dir_all`, so pre-existing
    /// directories are not an error and an entire tree can be created).
    pub fn create_dir<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        let path = path.as_ref();
        self.check_whitelist(path)?;
        fs::create_dir_all(path).context("creating dir")?;
        Ok(())
    }

    /// Create parent directory of a given path.
    pub fn create_parent_dir<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        let path = path.as_ref();
        let parent = path.parent().ok_or_else(|| Error::NoParent(path.to_path_buf()))?;
        self.check_whitelist(parent)?;
        fs::create_dir_all(parent).context("creating parent dir")?;
        Ok(())
    }

    /// Create a file, and return a writable `File` handle.
    pub fn create_file<T: AsRef<Path>>(&self, path: T) -> Result<fs::File> {
        let path = path.as_ref();
        self.check_whitelist(path)?;
        let f = fs::File::create(path).context("creating file")?;
        Ok(f)
    }

    /// Write entire str to a file.
    pub fn write_file<T: AsRef<Path>>(&self, path: T, text: &str) -> Result<()> {
        let path = path.as_ref();
        self.check_whitelist(path)?;
        fs::write(path, text).context("writing file")?;
        Ok(())
    }

    /// Read entire file into a String.
    pub fn read_to_buf<T: AsRef<Path>>(&self, path: T, strbuf: &mut String) -> Result<(), io::Error> {
        use std::io::Read;
        let path = path.as_ref();
        strbuf.clear();
        let cap = fs::metadata(path)?.len() as usize;
        if cap > strbuf.len() {
            strbuf.reserve(cap - strbuf.len());
        }
        let mut f = fs::File::open(path)?;
        f.read_to_string(strbuf)?;
        Ok(())
    }

    /// List entries in a directory.
    pub fn read_dir<T: AsRef<Path>>(&self, path: T) -> Result<fs::ReadDir, io::Error> {
        fs::read_dir(path)
    }

    fn is_whitelisted<T: AsRef<Path>>(&self, path: T) -> bool {
        let path = path.as_ref();
        path.starts_with(&self.parametrized)
            || path.starts_with(&self.executed)
            || path.starts_with(&self.reports)
    }

    fn check_whitelist(&self, path: &Path) -> Result<()> {
        if self.is_whitelisted(path) {
            Ok(())
        } else {
            Err(Error::NotWhitelisted(path.to_str().ok_or(Error::PathEncoding)?.to_owned()).into())
        }
    }
}
