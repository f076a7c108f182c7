// Tue Oct 13 2026 - Alex

use crate::abi::ExecutableFormat;
use crate::layout::{DataType, Parameter};
use crate::program::{Address, AddressRange, ProgramError};
use serde::Serialize;
use std::fmt;

/// Provenance of a name or signature. Ordered from lowest to highest priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SourceType {
    Default,
    Analysis,
    Imported,
    UserDefined,
}

impl SourceType {
    pub fn is_lower_priority_than(self, other: SourceType) -> bool {
        self < other
    }
}

/// A `::`-separated namespace path, e.g. `df::unit`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    pub fn global() -> Self {
        Self(String::new())
    }

    pub fn child(&self, name: &str) -> Self {
        if self.0.is_empty() {
            Self(name.to_string())
        } else {
            Self(format!("{}::{}", self.0, name))
        }
    }

    pub fn path(&self) -> &str {
        &self.0
    }

    pub fn is_global(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            write!(f, "<global>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NamespaceKind {
    Namespace,
    Class,
}

/// A unit of listing data occupying part of a queried range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeUnit {
    pub range: AddressRange,
    pub data_type: String,
    pub defined: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionRecord {
    pub address: Address,
    pub name: String,
    pub namespace: Namespace,
    pub calling_convention: Option<String>,
    pub return_type: Option<DataType>,
    pub parameters: Vec<Parameter>,
    pub signature_source: SourceType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionUpdate {
    pub name: String,
    pub namespace: Namespace,
    pub calling_convention: String,
    pub return_type: Option<DataType>,
    pub parameters: Vec<Parameter>,
    pub source: SourceType,
}

/// The analysis host that owns program memory, the listing, symbols and
/// functions. The importer only talks to the binary through this seam.
pub trait Program {
    fn executable_format(&self) -> ExecutableFormat;
    fn pointer_size(&self) -> usize;

    /// Lowercase hex MD5 of the original executable, if the host recorded one.
    fn executable_md5(&self) -> Option<String>;
    /// COFF `TimeDateStamp` for PE images.
    fn link_timestamp(&self) -> Option<u32>;

    fn read_pointer(&self, addr: Address) -> Result<Address, ProgramError>;

    fn code_units(&self, range: AddressRange) -> Vec<CodeUnit>;
    fn clear_code_units(&mut self, range: AddressRange);
    fn create_data(&mut self, addr: Address, data_type: &DataType, length: u64) -> Result<(), ProgramError>;

    fn symbols_at(&self, addr: Address) -> Vec<String>;
    fn global_symbols(&self, name: &str) -> Vec<Address>;
    fn create_label(
        &mut self,
        addr: Address,
        name: &str,
        namespace: &Namespace,
        primary: bool,
        source: SourceType,
    ) -> Result<(), ProgramError>;

    fn get_or_create_namespace(&mut self, parent: &Namespace, name: &str, kind: NamespaceKind) -> Namespace;

    fn create_function(&mut self, addr: Address, name: &str, source: SourceType) -> Result<(), ProgramError>;
    fn function_at(&self, addr: Address) -> Option<FunctionRecord>;
    fn update_function(&mut self, addr: Address, update: FunctionUpdate) -> Result<(), ProgramError>;
}
