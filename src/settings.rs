use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::args::Args;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("--env-name requires --env-manager")]
    EnvNameWithoutManager,
}

/// Scheduler resource request. The individual values are passed through to
/// the scheduler opaquely; nothing here interprets them.
#[derive(Debug, Clone)]
pub struct Resources {
    pub cpus: u32,
    pub memory: String,
    pub walltime: String,
    pub queue: Option<String>,
}

/// External programs invoked for stage execution and job submission.
#[derive(Debug, Clone)]
pub struct Programs {
    pub papermill: String,
    pub jupyter: String,
    pub qsub: String,
    /// (manager, name) pair used to prefix every backend invocation
    pub env: Option<(String, String)>,
}

/// Settings are like Args, except all the logic has
/// been applied so e.g. defaults are added in.
#[derive(Debug)]
pub struct Settings {
    pub conf_id: String,
    pub templates: PathBuf,
    pub params: PathBuf,
    pub parametrized: PathBuf,
    pub executed: PathBuf,
    pub reports: PathBuf,
    pub resources: Resources,
    pub programs: Programs,
    /// false when --no-depend was given
    pub chain_deps: bool,
    pub verbose: u8,
}

impl TryFrom<Args> for Settings {
    type Error = anyhow::Error;
    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let root = PathBuf::from(&args.root);
        let dir_or = |dir: Option<String>, default: &str| match dir {
            Some(dir) => PathBuf::from(dir),
            None => root.join(default),
        };

        // an environment name is only usable with a manager to activate it;
        // a manager alone (e.g. from the environment) just means no activation.
        let env = match (args.env_manager, args.env_name) {
            (Some(manager), Some(name)) => Some((manager, name)),
            (None, Some(_)) => return Err(Error::EnvNameWithoutManager.into()),
            _ => None,
        };

        Ok(Self {
            templates: dir_or(args.templates, "notebooks"),
            params: dir_or(args.params, "conf"),
            parametrized: dir_or(args.parametrized, "parametrized"),
            executed: dir_or(args.executed, "executed"),
            reports: dir_or(args.reports, "reports"),
            conf_id: args.conf_id,
            resources: Resources {
                cpus: args.cpus,
                memory: args.memory,
                walltime: args.walltime,
                queue: args.queue,
            },
            programs: Programs {
                papermill: args.papermill,
                jupyter: args.jupyter,
                qsub: args.qsub,
                env,
            },
            chain_deps: !args.no_depend,
            verbose: args.verbose,
        })
    }
}

#[cfg(test)]
impl Settings {
    /// Settings rooted in a test directory, with stub program names.
    pub fn test_fixture(root: &Path, conf_id: &str) -> Self {
        Self {
            conf_id: conf_id.to_owned(),
            templates: root.join("notebooks"),
            params: root.join("conf"),
            parametrized: root.join("parametrized"),
            executed: root.join("executed"),
            reports: root.join("reports"),
            resources: Resources {
                cpus: 1,
                memory: "4gb".to_owned(),
                walltime: "04:00:00".to_owned(),
                queue: None,
            },
            programs: Programs {
                papermill: "papermill".to_owned(),
                jupyter: "jupyter".to_owned(),
                qsub: "qsub".to_owned(),
                env: None,
            },
            chain_deps: true,
            verbose: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn basic_args() -> Args {
        Args {
            conf_id: "run42".to_owned(),
            root: "/work".to_owned(),
            templates: None,
            params: None,
            parametrized: None,
            executed: None,
            reports: None,
            cpus: 4,
            memory: "16gb".to_owned(),
            walltime: "08:00:00".to_owned(),
            queue: Some("batch".to_owned()),
            no_depend: false,
            env_name: None,
            env_manager: None,
            papermill: "papermill".to_owned(),
            jupyter: "jupyter".to_owned(),
            qsub: "qsub".to_owned(),
            verbose: 0,
        }
    }

    #[test]
    fn roots_default_to_subdirs_of_root() -> Result<()> {
        let settings: Settings = basic_args().try_into()?;
        assert_eq!(settings.templates, PathBuf::from("/work/notebooks"));
        assert_eq!(settings.params, PathBuf::from("/work/conf"));
        assert_eq!(settings.parametrized, PathBuf::from("/work/parametrized"));
        assert_eq!(settings.executed, PathBuf::from("/work/executed"));
        assert_eq!(settings.reports, PathBuf::from("/work/reports"));
        Ok(())
    }

    #[test]
    fn explicit_roots_win_over_defaults() -> Result<()> {
        let mut args = basic_args();
        args.templates = Some("/elsewhere/nb".to_owned());
        let settings: Settings = args.try_into()?;
        assert_eq!(settings.templates, PathBuf::from("/elsewhere/nb"));
        assert_eq!(settings.params, PathBuf::from("/work/conf"));
        Ok(())
    }

    #[test]
    fn env_name_without_manager_is_an_error() {
        let mut args = basic_args();
        args.env_name = Some("geo".to_owned());
        let result: Result<Settings, _> = args.try_into();
        assert!(result.is_err());
    }

    #[test]
    fn env_manager_without_name_means_no_activation() -> Result<()> {
        let mut args = basic_args();
        args.env_manager = Some("/opt/bin/micromamba".to_owned());
        let settings: Settings = args.try_into()?;
        assert!(settings.programs.env.is_none());
        Ok(())
    }

    #[test]
    fn no_depend_disables_chaining() -> Result<()> {
        let mut args = basic_args();
        args.no_depend = true;
        let settings: Settings = args.try_into()?;
        assert!(!settings.chain_deps);
        Ok(())
    }
}
