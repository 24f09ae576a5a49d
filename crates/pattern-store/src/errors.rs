use entryfill_core_types::EngineIssue;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreErrorKind {
    #[error("pattern '{0}' not found")]
    NotFound(String),
    #[error("pattern '{name}' is malformed: {reason}")]
    MalformedPattern { name: String, reason: String },
    #[error("pattern name must not be empty")]
    EmptyName,
    #[error("store file is corrupt: {0}")]
    Corrupt(String),
    #[error("io failure: {0}")]
    Io(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error(transparent)]
pub struct StoreError(pub StoreErrorKind);

impl StoreError {
    pub fn new(kind: StoreErrorKind) -> Self {
        Self(kind)
    }

    pub fn kind(&self) -> &StoreErrorKind {
        &self.0
    }

    /// The engine-level issue this error reports as, if any.
    pub fn issue(&self) -> Option<EngineIssue> {
        match &self.0 {
            StoreErrorKind::MalformedPattern { name, reason } => Some(EngineIssue::MalformedPattern {
                name: name.clone(),
                reason: reason.clone(),
            }),
            _ => None,
        }
    }
}

impl From<StoreErrorKind> for StoreError {
    fn from(kind: StoreErrorKind) -> Self {
        StoreError(kind)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError(StoreErrorKind::Io(err.to_string()))
    }
}
