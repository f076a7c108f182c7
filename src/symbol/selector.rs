// Tue Oct 13 2026 - Alex

use crate::definition::{SymbolTable, Symbols};
use crate::symbol::{BinaryFingerprint, SymbolError};
use log::{debug, info};

pub struct SymbolTableSelector;

impl SymbolTableSelector {
    /// Returns the first table whose declared constraints all hold for
    /// `fingerprint`. A table that declares neither constraint matches anything.
    pub fn select<'a>(symbols: &'a Symbols, fingerprint: &BinaryFingerprint) -> Result<&'a SymbolTable, SymbolError> {
        debug!("Matching {} symbol tables against {}", symbols.tables.len(), fingerprint);

        let table = symbols
            .tables
            .iter()
            .find(|table| Self::matches(table, fingerprint))
            .ok_or(SymbolError::NoMatchingTable {
                candidates: symbols.tables.len(),
            })?;

        info!("selected symbol table: {}", table.display_name());
        Ok(table)
    }

    pub fn matches(table: &SymbolTable, fingerprint: &BinaryFingerprint) -> bool {
        if let Some(timestamp) = table.binary_timestamp {
            if timestamp != fingerprint.timestamp {
                return false;
            }
        }
        if let Some(md5) = &table.md5_hash {
            if !md5.eq_ignore_ascii_case(&fingerprint.md5) {
                return false;
            }
        }
        true
    }
}
