/// Scans the template directory for the configuration's active stages.
mod stage_scanner;
pub use stage_scanner::{Stage, StageScanner};

/// Writes parametrized copies of stage templates.
mod parametrizer;
pub use parametrizer::Parametrizer;

/// Notebook document model and parameter-cell injection.
pub(crate) mod notebook;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Can't read template \"{0}\"")]
    TemplateUnreadable(String, #[source] std::io::Error),
    #[error("Template \"{0}\" is not a valid notebook document")]
    TemplateInvalid(String, #[source] serde_json::Error),
    #[error("Can't read parameter file \"{0}\"")]
    ParamsUnreadable(String, #[source] std::io::Error),
    #[error("Parameter file \"{0}\" is not valid yaml")]
    ParamsInvalid(String, #[source] serde_yaml::Error),
    #[error("Parameter file \"{0}\" does not hold a mapping of parameter names to values")]
    ParamsNotMapping(String),
    #[error("Can't render parameters from \"{0}\"")]
    ParamsUnrenderable(String, #[source] notebook::RenderError),
}
