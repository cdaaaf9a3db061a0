use thiserror::Error;

#[derive(Debug, Error)]
pub enum McError {
    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("project file not found: {0}")]
    ProjectFileMissing(String),

    #[error("invalid slug '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidSlug(String),

    #[error("invalid stage: {0}")]
    InvalidStage(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, McError>;
