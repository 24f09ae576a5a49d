use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("keyword table is invalid: {0}")]
    KeywordTable(#[from] serde_yaml::Error),
    #[error("keyword table field '{0}' has no keyword sets")]
    EmptyField(String),
}
