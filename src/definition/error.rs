// Tue Oct 13 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("Malformed definition: {0}")]
    Malformed(String),
    #[error("Invalid number {value:?} for attribute {attribute}")]
    InvalidNumber { attribute: String, value: String },
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("Missing {0} document")]
    MissingDocument(&'static str),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
