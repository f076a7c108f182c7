// Tue Oct 13 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProgramError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Binary parse error: {0}")]
    BinaryParseError(String),
    #[error("Unsupported binary format: {0}")]
    UnsupportedFormat(String),
    #[error("No memory mapped at address 0x{0:x}")]
    NoMemory(u64),
    #[error("Read failed at address 0x{0:x}")]
    ReadFailed(u64),
    #[error("Conflicting data exists at address 0x{address:x} ({existing})")]
    DataConflict { address: u64, existing: String },
    #[error("Function already exists at address 0x{0:x}")]
    FunctionExists(u64),
    #[error("Function not found at address 0x{0:x}")]
    FunctionNotFound(u64),
}
