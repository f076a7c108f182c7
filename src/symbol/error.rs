// Tue Oct 13 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SymbolError {
    #[error("could not find a relevant symbol table for the current program (checked {candidates} candidates). is df-structures up to date?")]
    NoMatchingTable { candidates: usize },
    #[error("Fingerprint error: {0}")]
    Fingerprint(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
