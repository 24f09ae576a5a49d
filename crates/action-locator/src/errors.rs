//! Error types for locator system

use page_model::NodeId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// Locators are built for elements only
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    /// Deserialized locator carries no strategy at all
    #[error("locator records no strategy")]
    Empty,

    /// Hand-written selector outside the supported subset
    #[error("unsupported selector '{0}'")]
    InvalidSelector(String),
}
