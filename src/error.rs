use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GardenOpsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Duplicate rule code in registry '{registry}': {code}")]
    DuplicateRuleCode { registry: String, code: String },

    #[error("Batch evaluation exceeded deadline of {0:?}")]
    DeadlineExceeded(Duration),

    #[error("Evaluation task failed: {0}")]
    Task(String),
}

pub type Result<T> = std::result::Result<T, GardenOpsError>;
