// Tue Oct 13 2026 - Alex

pub mod address;
pub mod error;
pub mod memory;
pub mod traits;

pub use address::{Address, AddressRange};
pub use error::ProgramError;
pub use memory::{DataRecord, InMemoryProgram, LabelRecord, Segment};
pub use traits::{CodeUnit, FunctionRecord, FunctionUpdate, Namespace, NamespaceKind, Program, SourceType};
