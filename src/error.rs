// Tue Oct 13 2026 - Alex

use crate::definition::DefinitionError;
use crate::layout::LayoutError;
use crate::program::ProgramError;
use crate::symbol::SymbolError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Definition error: {0}")]
    Definition(#[from] DefinitionError),
    #[error("Symbol error: {0}")]
    Symbol(#[from] SymbolError),
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("Program error: {0}")]
    Program(#[from] ProgramError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Import cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, ImportError>;
