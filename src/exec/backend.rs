use std::path::Path;

use crate::settings::Programs;

use super::{path_str, Error};

/// Renders the shell script that turns a parametrized notebook into an
/// executed notebook and a rendered report.
///
/// The same script text is submitted to the scheduler and run by the local
/// runner, so the two execution paths can never diverge in how the backend
/// is invoked.
pub struct BackendCmd<'a> {
    programs: &'a Programs,
}

impl<'a> BackendCmd<'a> {
    pub fn new(programs: &'a Programs) -> Self {
        Self { programs }
    }

    pub fn script(
        &self,
        parametrized: &Path,
        executed: &Path,
        report_dir: &Path,
    ) -> Result<String, Error> {
        let mut words: Vec<String> = Vec::with_capacity(16);

        self.push_invocation(&mut words, &self.programs.papermill);
        words.push(quote(path_str(parametrized)?));
        words.push(quote(path_str(executed)?));

        words.push("&&".to_owned());

        self.push_invocation(&mut words, &self.programs.jupyter);
        words.push("nbconvert".to_owned());
        words.push("--to".to_owned());
        words.push("html".to_owned());
        words.push("--output-dir".to_owned());
        words.push(quote(path_str(report_dir)?));
        words.push(quote(path_str(executed)?));

        Ok(words.join(" "))
    }

    /// One program invocation, prefixed with environment activation when the
    /// run asks for it.
    fn push_invocation(&self, words: &mut Vec<String>, program: &str) {
        if let Some((manager, name)) = &self.programs.env {
            words.push(quote(manager));
            words.push("run".to_owned());
            words.push("-n".to_owned());
            words.push(quote(name));
        }
        words.push(quote(program));
    }
}

/// Single-quote a word for the shell unless it only holds safe characters.
fn quote(s: &str) -> String {
    let safe = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ':' | '+' | '='));
    if safe {
        return s.to_owned();
    }

    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('\'');
    for c in s.chars() {
        if c == '\'' {
            quoted.push_str("'\\''");
        } else {
            quoted.push(c);
        }
    }
    quoted.push('\'');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Programs;

    fn programs() -> Programs {
        Programs {
            papermill: "papermill".to_owned(),
            jupyter: "jupyter".to_owned(),
            qsub: "qsub".to_owned(),
            env: None,
        }
    }

    #[test]
    fn script_runs_papermill_then_nbconvert() -> anyhow::Result<()> {
        let programs = programs();
        let script = BackendCmd::new(&programs).script(
            Path::new("/w/parametrized/run42/a.ipynb"),
            Path::new("/w/executed/run42/a.ipynb"),
            Path::new("/w/reports/run42/notebooks"),
        )?;
        assert_eq!(
            script,
            "papermill /w/parametrized/run42/a.ipynb /w/executed/run42/a.ipynb && \
             jupyter nbconvert --to html --output-dir /w/reports/run42/notebooks \
             /w/executed/run42/a.ipynb"
        );
        Ok(())
    }

    #[test]
    fn environment_activation_prefixes_every_invocation() -> anyhow::Result<()> {
        let mut programs = programs();
        programs.env = Some(("/opt/micromamba".to_owned(), "geo".to_owned()));
        let script = BackendCmd::new(&programs).script(
            Path::new("/w/p/a.ipynb"),
            Path::new("/w/e/a.ipynb"),
            Path::new("/w/r/notebooks"),
        )?;
        assert!(script.starts_with("/opt/micromamba run -n geo papermill"));
        assert!(script.contains("&& /opt/micromamba run -n geo jupyter nbconvert"));
        Ok(())
    }

    #[test]
    fn quoting_protects_spaces_and_quotes() {
        assert_eq!(quote("plain-word_1.txt"), "plain-word_1.txt");
        assert_eq!(quote("with space"), "'with space'");
        assert_eq!(quote("it's"), "'it'\\''s'");
        assert_eq!(quote(""), "''");
    }
}
