// Tue Oct 13 2026 - Alex

pub mod error;
pub mod fingerprint;
pub mod selector;

pub use error::SymbolError;
pub use fingerprint::{md5_hex, BinaryFingerprint};
pub use selector::SymbolTableSelector;
