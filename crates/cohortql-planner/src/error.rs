use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid statement: {0}")]
    Statement(String),

    #[error(transparent)]
    Core(#[from] cohortql_core::error::Error),
}

impl From<PlanError> for cohortql_core::error::Error {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::Core(inner) => inner,
            other => cohortql_core::error::Error::MalformedTree(other.to_string()),
        }
    }
}
