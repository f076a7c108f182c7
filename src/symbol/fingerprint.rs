// Tue Oct 13 2026 - Alex

use crate::abi::ExecutableFormat;
use crate::program::Program;
use crate::symbol::SymbolError;
use goblin::Object;
use md5::{Digest, Md5};
use serde::Serialize;
use std::fmt;

pub fn md5_hex(data: &[u8]) -> String {
    let digest = Md5::digest(data);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// What identifies one build of the binary: the image MD5 and, for PE
/// images, the COFF link timestamp. Other formats report a timestamp of 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinaryFingerprint {
    pub timestamp: u64,
    pub md5: String,
}

impl BinaryFingerprint {
    pub fn new(timestamp: u64, md5: &str) -> Self {
        Self {
            timestamp,
            md5: md5.to_string(),
        }
    }

    pub fn from_program(program: &dyn Program) -> Self {
        let timestamp = match program.executable_format() {
            ExecutableFormat::Pe => program.link_timestamp().map(u64::from).unwrap_or(0),
            _ => 0,
        };
        Self {
            timestamp,
            md5: program.executable_md5().unwrap_or_default(),
        }
    }

    pub fn from_image(data: &[u8]) -> Result<Self, SymbolError> {
        let object = Object::parse(data).map_err(|e| SymbolError::Fingerprint(e.to_string()))?;
        let timestamp = match object {
            Object::PE(pe) => pe.header.coff_header.time_date_stamp as u64,
            _ => 0,
        };
        Ok(Self {
            timestamp,
            md5: md5_hex(data),
        })
    }
}

impl fmt::Display for BinaryFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timestamp=0x{:08x} md5={}", self.timestamp, if self.md5.is_empty() { "-" } else { &self.md5 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::InMemoryProgram;

    #[test]
    fn test_md5_hex() {
        assert_eq!(md5_hex(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(md5_hex(b"abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_timestamp_only_counts_for_pe() {
        let elf = InMemoryProgram::new(ExecutableFormat::Elf, 8)
            .with_md5("aa")
            .with_timestamp(100);
        assert_eq!(BinaryFingerprint::from_program(&elf), BinaryFingerprint::new(0, "aa"));

        let pe = InMemoryProgram::new(ExecutableFormat::Pe, 8)
            .with_md5("bb")
            .with_timestamp(100);
        assert_eq!(BinaryFingerprint::from_program(&pe), BinaryFingerprint::new(100, "bb"));
    }

    #[test]
    fn test_garbage_image_is_rejected() {
        assert!(BinaryFingerprint::from_image(b"not an executable").is_err());
    }
}
