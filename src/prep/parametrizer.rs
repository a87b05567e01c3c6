use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::fs::Fs;

use super::{notebook, Error, Stage};

/// Writes a parametrized copy of an active stage's template, with the values
/// from the stage's parameter file injected. Never executes anything.
///
/// Every active stage is parametrized before the first job is handed to a
/// runner, so a broken template or parameter file aborts the run before
/// anything is scheduled.
pub struct Parametrizer<'a> {
    fs: &'a Fs,
    pathbuf: PathBuf,
    strbuf: String,
}

impl<'a> Parametrizer<'a> {
    pub fn new(fs: &'a Fs) -> Self {
        Self {
            fs,
            pathbuf: PathBuf::with_capacity(256),
            strbuf: String::with_capacity(4096),
        }
    }

    /// Parametrize one stage, creating parent directories as needed.
    pub fn parametrize(&mut self, conf_id: &str, stage: &Stage) -> Result<()> {
        let mut nb = self.read_template(stage)?;
        let lines = self.read_param_lines(stage)?;
        notebook::inject_parameters(&mut nb, lines);

        let text = serde_json::to_string_pretty(&nb)
            .context("while serializing parametrized notebook")?;

        let out = self.fs.parametrized(conf_id, &stage.name, &mut self.pathbuf);
        self.fs.create_parent_dir(out)?;
        self.fs.write_file(out, &text)?;

        log::info!("parametrized stage \"{}\" to {:?}", stage.name, out);
        Ok(())
    }

    fn read_template(&mut self, stage: &Stage) -> Result<notebook::Notebook, Error> {
        let path = stage.template.display().to_string();
        self.fs
            .read_to_buf(&stage.template, &mut self.strbuf)
            .map_err(|e| Error::TemplateUnreadable(path.clone(), e))?;
        serde_json::from_str(&self.strbuf).map_err(|e| Error::TemplateInvalid(path, e))
    }

    fn read_param_lines(&mut self, stage: &Stage) -> Result<Vec<String>, Error> {
        let path = stage.params.display().to_string();
        self.fs
            .read_to_buf(&stage.params, &mut self.strbuf)
            .map_err(|e| Error::ParamsUnreadable(path.clone(), e))?;

        let value: serde_yaml::Value = serde_yaml::from_str(&self.strbuf)
            .map_err(|e| Error::ParamsInvalid(path.clone(), e))?;
        let params = match value {
            // an empty parameter file is a valid, empty override set:
            serde_yaml::Value::Null => serde_yaml::Mapping::new(),
            serde_yaml::Value::Mapping(map) => map,
            _ => return Err(Error::ParamsNotMapping(path)),
        };

        notebook::render_param_lines(&params).map_err(|e| Error::ParamsUnrenderable(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    const TEMPLATE: &str = r#"{
        "cells": [
            {"cell_type": "code", "execution_count": null, "outputs": [],
             "metadata": {"tags": ["parameters"]}, "source": ["depth = 1\n"]}
        ],
        "metadata": {},
        "nbformat": 4,
        "nbformat_minor": 5
    }"#;

    fn fixture(dir: &Path, template: &str, params: &str) -> Result<(Fs, Stage)> {
        let notebooks = dir.join("notebooks");
        fs::create_dir_all(&notebooks)?;
        fs::write(notebooks.join("a.ipynb"), template)?;
        let conf = dir.join("conf/run42");
        fs::create_dir_all(&conf)?;
        fs::write(conf.join("a.yaml"), params)?;

        let settings = Settings::test_fixture(dir, "run42");
        let stage = Stage {
            name: "a".to_owned(),
            template: notebooks.join("a.ipynb"),
            params: conf.join("a.yaml"),
        };
        Ok((Fs::new(&settings), stage))
    }

    #[test]
    fn writes_a_parametrized_copy() -> Result<()> {
        let dir = tempdir()?;
        let (fs, stage) = fixture(dir.path(), TEMPLATE, "depth: 3\n")?;

        Parametrizer::new(&fs).parametrize("run42", &stage)?;

        let out = dir.path().join("parametrized/run42/a.ipynb");
        let text = fs::read_to_string(&out)?;
        assert!(text.contains("injected-parameters"));
        assert!(text.contains("depth = 3"));
        // the template itself is untouched:
        assert!(!fs::read_to_string(dir.path().join("notebooks/a.ipynb"))?
            .contains("injected-parameters"));
        Ok(())
    }

    #[test]
    fn empty_parameter_file_still_parametrizes() -> Result<()> {
        let dir = tempdir()?;
        let (fs, stage) = fixture(dir.path(), TEMPLATE, "")?;

        Parametrizer::new(&fs).parametrize("run42", &stage)?;
        assert!(dir.path().join("parametrized/run42/a.ipynb").exists());
        Ok(())
    }

    #[test]
    fn unreadable_template_is_an_error() -> Result<()> {
        let dir = tempdir()?;
        let (fs, mut stage) = fixture(dir.path(), TEMPLATE, "depth: 3\n")?;
        stage.template = dir.path().join("notebooks/missing.ipynb");

        let result = Parametrizer::new(&fs).parametrize("run42", &stage);
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn malformed_params_are_an_error() -> Result<()> {
        let dir = tempdir()?;
        let (fs, stage) = fixture(dir.path(), TEMPLATE, "- not\n- a\n- mapping\n")?;

        let result = Parametrizer::new(&fs).parametrize("run42", &stage);
        assert!(result.is_err());
        // nothing was written:
        assert!(!dir.path().join("parametrized/run42/a.ipynb").exists());
        Ok(())
    }
}
