// Tue Oct 13 2026 - Alex

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VTableAddress {
    pub name: Option<String>,
    pub value: Option<u64>,
    pub mangled: Option<String>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlobalAddress {
    pub name: Option<String>,
    pub value: Option<u64>,
}

/// Resolved addresses for one specific build of the binary, plus the
/// fingerprint that identifies that build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    pub name: Option<String>,
    pub binary_timestamp: Option<u64>,
    pub md5_hash: Option<String>,
    pub os_type: Option<String>,
    pub vtables: Vec<VTableAddress>,
    pub globals: Vec<GlobalAddress>,
}

impl SymbolTable {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed)")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Symbols {
    pub tables: Vec<SymbolTable>,
}
