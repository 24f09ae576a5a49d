use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile root must be an object, got {0}")]
    NotAnObject(&'static str),

    #[error("profile is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
