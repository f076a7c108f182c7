// Tue Oct 13 2026 - Alex

use crate::layout::{DataOrganization, LayoutError};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum ExecutableFormat {
    Elf,
    MachO,
    Pe,
    Other(String),
}

impl ExecutableFormat {
    /// Accepts the analysis host's format names as well as short forms.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "executable and linking format (elf)" | "elf" => ExecutableFormat::Elf,
            "mac os x mach-o" | "mach-o" | "macho" => ExecutableFormat::MachO,
            "portable executable (pe)" | "pe" | "coff" => ExecutableFormat::Pe,
            _ => ExecutableFormat::Other(name.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ExecutableFormat::Elf => "Executable and Linking Format (ELF)",
            ExecutableFormat::MachO => "Mac OS X Mach-O",
            ExecutableFormat::Pe => "Portable Executable (PE)",
            ExecutableFormat::Other(name) => name,
        }
    }
}

impl fmt::Display for ExecutableFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AbiFamily {
    /// GCC and Clang on ELF and Mach-O.
    Itanium,
    Msvc,
}

impl fmt::Display for AbiFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiFamily::Itanium => write!(f, "Itanium"),
            AbiFamily::Msvc => write!(f, "MSVC"),
        }
    }
}

/// Everything about the target's C++ ABI that later stages need, decided once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbiProfile {
    pub family: AbiFamily,
    pub format: ExecutableFormat,
    pub pointer_size: usize,
    /// Inherited base regions are rounded up to a multiple of this.
    pub base_class_padding: usize,
    pub fstream_size: usize,
    pub deque_size: usize,
    /// Opaque `vector<bool>` size; `None` when the layout is spelled out.
    pub bit_vector_size: Option<usize>,
}

impl AbiProfile {
    pub fn resolve(format: &ExecutableFormat, pointer_size: usize) -> Result<Self, LayoutError> {
        if pointer_size != 4 && pointer_size != 8 {
            return Err(LayoutError::UnsupportedPointerSize(pointer_size));
        }

        let profile = match format {
            ExecutableFormat::Elf | ExecutableFormat::MachO => Self {
                family: AbiFamily::Itanium,
                format: format.clone(),
                pointer_size,
                base_class_padding: 1,
                fstream_size: 61 * pointer_size + 40,
                deque_size: 10 * pointer_size,
                bit_vector_size: None,
            },
            ExecutableFormat::Pe => Self {
                family: AbiFamily::Msvc,
                format: format.clone(),
                pointer_size,
                base_class_padding: pointer_size,
                fstream_size: 22 * pointer_size + 96,
                deque_size: 5 * pointer_size,
                bit_vector_size: Some(4 * pointer_size),
            },
            ExecutableFormat::Other(name) => return Err(LayoutError::UnsupportedExecutableFormat(name.clone())),
        };
        Ok(profile)
    }

    pub fn is_itanium(&self) -> bool {
        self.family == AbiFamily::Itanium
    }

    /// i386 System V caps 8-byte scalars at 4-byte alignment inside structs.
    pub fn organization(&self) -> DataOrganization {
        let max_alignment = match (self.family, self.pointer_size) {
            (AbiFamily::Itanium, 4) => 4,
            _ => 8,
        };
        DataOrganization::new(self.pointer_size, max_alignment)
    }
}

impl fmt::Display for AbiProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}-bit ({})", self.family, self.pointer_size * 8, self.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_itanium_sizes() {
        let abi = AbiProfile::resolve(&ExecutableFormat::Elf, 8).unwrap();
        assert_eq!(abi.family, AbiFamily::Itanium);
        assert_eq!(abi.base_class_padding, 1);
        assert_eq!(abi.fstream_size, 528);
        assert_eq!(abi.deque_size, 80);
        assert_eq!(abi.organization().max_alignment, 8);

        let abi32 = AbiProfile::resolve(&ExecutableFormat::MachO, 4).unwrap();
        assert_eq!(abi32.organization().max_alignment, 4);
    }

    #[test]
    fn test_msvc_sizes() {
        let abi = AbiProfile::resolve(&ExecutableFormat::Pe, 4).unwrap();
        assert_eq!(abi.family, AbiFamily::Msvc);
        assert_eq!(abi.base_class_padding, 4);
        assert_eq!(abi.fstream_size, 184);
        assert_eq!(abi.deque_size, 20);
        assert_eq!(abi.bit_vector_size, Some(16));
    }

    #[test]
    fn test_unsupported_format() {
        let format = ExecutableFormat::from_name("Raw Binary");
        assert!(matches!(
            AbiProfile::resolve(&format, 8),
            Err(LayoutError::UnsupportedExecutableFormat(_))
        ));
        assert!(matches!(
            AbiProfile::resolve(&ExecutableFormat::Elf, 2),
            Err(LayoutError::UnsupportedPointerSize(2))
        ));
    }

    #[test]
    fn test_host_format_names() {
        assert_eq!(ExecutableFormat::from_name("Portable Executable (PE)"), ExecutableFormat::Pe);
        assert_eq!(ExecutableFormat::from_name("Mac OS X Mach-O"), ExecutableFormat::MachO);
    }
}
