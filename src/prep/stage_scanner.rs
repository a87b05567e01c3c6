use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::fs::{Fs, NOTEBOOK_EXT};

/// One position in the pipeline: a template notebook paired with the
/// configuration's parameter file of the same base name.
#[derive(Debug)]
pub struct Stage {
    /// Stage name (the template's file stem)
    pub name: String,
    /// Path to the template notebook
    pub template: PathBuf,
    /// Path to the configuration's parameter file for this stage
    pub params: PathBuf,
}

/// Produces the ordered sequence of active stages for one configuration.
///
/// Templates are listed non-recursively and sorted lexicographically, so the
/// resulting order is stable across runs. A template without a parameter file
/// under the configuration's directory is not part of this run's pipeline;
/// it is skipped without comment and no artifact paths are ever derived for it.
pub struct StageScanner<'a> {
    fs: &'a Fs,
    conf_id: &'a str,
}

impl<'a> StageScanner<'a> {
    pub fn new(fs: &'a Fs, conf_id: &'a str) -> Self {
        Self { fs, conf_id }
    }

    /// Scan the template directory. Restartable: a second scan over unchanged
    /// directories yields an identical sequence.
    pub fn scan(&self) -> Result<Vec<Stage>> {
        let templates = self.list_templates()?;

        let mut stages = Vec::with_capacity(templates.len());
        let mut buf = PathBuf::with_capacity(256);
        for template in templates {
            let Some(name) = template.file_stem().and_then(|stem| stem.to_str()) else {
                log::warn!("skipping template with non-utf8 name: {:?}", template);
                continue;
            };
            let params = self.fs.param_file(self.conf_id, name, &mut buf);
            if self.fs.exists(params) {
                stages.push(Stage {
                    name: name.to_owned(),
                    params: params.to_path_buf(),
                    template,
                });
            } else {
                log::debug!("no parameter file for stage \"{name}\"; skipping");
            }
        }
        Ok(stages)
    }

    fn list_templates(&self) -> Result<Vec<PathBuf>> {
        let dir = self.fs.templates_dir();
        let mut templates = Vec::with_capacity(16);
        let entries = self
            .fs
            .read_dir(dir)
            .with_context(|| format!("while listing template dir {:?}", dir))?;
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some(NOTEBOOK_EXT) {
                templates.push(path);
            }
        }
        // all entries share the same parent, so sorting the full paths
        // sorts by file name:
        templates.sort();
        Ok(templates)
    }
}
