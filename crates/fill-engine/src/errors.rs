use page_model::PageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FillError {
    #[error("filling disabled by policy")]
    Disabled,
    #[error(transparent)]
    Page(#[from] PageError),
}
