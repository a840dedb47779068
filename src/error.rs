use thiserror::Error;

/// Failures the pipeline reports. None of them reach the user interface:
/// each is logged where it happens and the affected step is skipped.
#[derive(Debug, Error)]
pub enum VizError {
    #[error("failed to load data from '{source_name}': {reason}")]
    Fetch { source_name: String, reason: String },

    #[error("failed to render {container}: {reason}")]
    Render { container: String, reason: String },

    #[error("external spec '{path}' unavailable: {reason}")]
    ExternalSpec { path: String, reason: String },

    #[error("invalid config '{path}': {reason}")]
    Config { path: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl VizError {
    pub fn render(container: &str, reason: impl ToString) -> Self {
        VizError::Render {
            container: container.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn fetch(source_name: &str, reason: impl ToString) -> Self {
        VizError::Fetch {
            source_name: source_name.to_string(),
            reason: reason.to_string(),
        }
    }
}
