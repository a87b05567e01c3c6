use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Tag marking the template cell whose values parametrization overrides.
const PARAMETERS_TAG: &str = "parameters";
/// Tag carried by the cell we insert.
const INJECTED_TAG: &str = "injected-parameters";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("parameter names must be strings")]
    KeyNotString,
    #[error("unsupported value for parameter \"{0}\"")]
    UnsupportedValue(String),
}

/// Minimal notebook document model. Cells are typed because we insert one;
/// everything else is carried through untouched, so fields we don't know
/// about survive the round trip.
#[derive(Debug, Serialize, Deserialize)]
pub struct Notebook {
    #[serde(default)]
    pub cells: Vec<Cell>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Cell {
    pub cell_type: String,
    #[serde(default)]
    pub metadata: Value,
    #[serde(default)]
    pub source: Source,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Cell source is either a single string or a list of lines.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Source {
    Lines(Vec<String>),
    Text(String),
}

impl Default for Source {
    fn default() -> Self {
        Self::Lines(Vec::new())
    }
}

/// Insert a code cell holding the rendered parameter assignments, directly
/// after the last cell tagged `parameters`, or at the top of the notebook if
/// no cell carries that tag.
pub fn inject_parameters(nb: &mut Notebook, lines: Vec<String>) {
    let mut rest = Map::new();
    rest.insert("execution_count".to_owned(), Value::Null);
    rest.insert("outputs".to_owned(), json!([]));

    let cell = Cell {
        cell_type: "code".to_owned(),
        metadata: json!({ "tags": [INJECTED_TAG] }),
        source: Source::Lines(lines),
        rest,
    };

    let at = nb
        .cells
        .iter()
        .rposition(|c| has_tag(c, PARAMETERS_TAG))
        .map(|i| i + 1)
        .unwrap_or(0);
    nb.cells.insert(at, cell);
}

fn has_tag(cell: &Cell, tag: &str) -> bool {
    match cell.metadata.get("tags").and_then(Value::as_array) {
        Some(tags) => tags.iter().any(|t| t.as_str() == Some(tag)),
        None => false,
    }
}

/// Render a parameter mapping to python assignment lines, one per parameter.
pub fn render_param_lines(params: &serde_yaml::Mapping) -> Result<Vec<String>, RenderError> {
    let mut lines = Vec::with_capacity(params.len() + 1);
    lines.push("# Parameters\n".to_owned());
    for (key, value) in params {
        let key = key.as_str().ok_or(RenderError::KeyNotString)?;
        let mut line = String::with_capacity(64);
        line.push_str(key);
        line.push_str(" = ");
        render_value(key, value, &mut line)?;
        line.push('\n');
        lines.push(line);
    }
    Ok(lines)
}

fn render_value(key: &str, value: &serde_yaml::Value, out: &mut String) -> Result<(), RenderError> {
    use std::fmt::Write;
    match value {
        serde_yaml::Value::Null => out.push_str("None"),
        serde_yaml::Value::Bool(true) => out.push_str("True"),
        serde_yaml::Value::Bool(false) => out.push_str("False"),
        serde_yaml::Value::Number(n) => {
            let _ = write!(out, "{n}");
        }
        serde_yaml::Value::String(s) => render_str(s, out),
        serde_yaml::Value::Sequence(seq) => {
            out.push('[');
            for (i, v) in seq.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render_value(key, v, out)?;
            }
            out.push(']');
        }
        serde_yaml::Value::Mapping(map) => {
            out.push('{');
            for (i, (k, v)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render_value(key, k, out)?;
                out.push_str(": ");
                render_value(key, v, out)?;
            }
            out.push('}');
        }
        serde_yaml::Value::Tagged(_) => {
            return Err(RenderError::UnsupportedValue(key.to_owned()));
        }
    }
    Ok(())
}

fn render_str(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn params(yaml: &str) -> serde_yaml::Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn joined(lines: &[String]) -> String {
        lines.concat()
    }

    #[test]
    fn renders_scalars_as_python_literals() -> Result<()> {
        let lines = render_param_lines(&params(
            "depth: 3\nscale: 0.25\nlabel: tag A\nactive: true\nseed: null\n",
        ))?;
        let text = joined(&lines);
        assert!(text.starts_with("# Parameters\n"));
        assert!(text.contains("depth = 3\n"));
        assert!(text.contains("scale = 0.25\n"));
        assert!(text.contains("label = \"tag A\"\n"));
        assert!(text.contains("active = True\n"));
        assert!(text.contains("seed = None\n"));
        Ok(())
    }

    #[test]
    fn renders_sequences_and_mappings() -> Result<()> {
        let lines = render_param_lines(&params("bbox: [1, 2, 3]\nopts:\n  deep: false\n"))?;
        let text = joined(&lines);
        assert!(text.contains("bbox = [1, 2, 3]\n"));
        assert!(text.contains("opts = {\"deep\": False}\n"));
        Ok(())
    }

    #[test]
    fn escapes_strings() -> Result<()> {
        let lines = render_param_lines(&params(r#"title: 'say "hi"'"#))?;
        assert!(joined(&lines).contains(r#"title = "say \"hi\"""#));
        Ok(())
    }

    #[test]
    fn non_string_parameter_names_are_rejected() {
        let result = render_param_lines(&params("1: one\n"));
        assert!(matches!(result, Err(RenderError::KeyNotString)));
    }

    fn notebook(json: &str) -> Notebook {
        serde_json::from_str(json).unwrap()
    }

    const TAGGED_NB: &str = r##"{
        "cells": [
            {"cell_type": "markdown", "metadata": {}, "source": ["# intro\n"]},
            {"cell_type": "code", "execution_count": null, "outputs": [],
             "metadata": {"tags": ["parameters"]}, "source": ["depth = 1\n"]},
            {"cell_type": "code", "execution_count": null, "outputs": [],
             "metadata": {}, "source": ["print(depth)\n"]}
        ],
        "metadata": {"kernelspec": {"name": "python3"}},
        "nbformat": 4,
        "nbformat_minor": 5
    }"##;

    #[test]
    fn injects_after_the_parameters_cell() {
        let mut nb = notebook(TAGGED_NB);
        inject_parameters(&mut nb, vec!["depth = 3\n".to_owned()]);

        assert_eq!(nb.cells.len(), 4);
        assert!(has_tag(&nb.cells[2], INJECTED_TAG));
        match &nb.cells[2].source {
            Source::Lines(lines) => assert_eq!(lines, &["depth = 3\n"]),
            Source::Text(_) => panic!("injected cell should use line-based source"),
        }
    }

    #[test]
    fn injects_at_the_top_without_a_parameters_cell() {
        let mut nb = notebook(r#"{"cells": [{"cell_type": "code", "execution_count": null, "outputs": [], "metadata": {}, "source": "print(1)"}], "nbformat": 4, "nbformat_minor": 5}"#);
        inject_parameters(&mut nb, vec!["depth = 3\n".to_owned()]);

        assert!(has_tag(&nb.cells[0], INJECTED_TAG));
        assert_eq!(nb.cells.len(), 2);
    }

    #[test]
    fn unknown_notebook_fields_survive_a_round_trip() -> Result<()> {
        let nb = notebook(TAGGED_NB);
        let text = serde_json::to_string(&nb)?;
        assert!(text.contains("nbformat_minor"));
        assert!(text.contains("kernelspec"));
        Ok(())
    }
}
