// Tue Oct 13 2026 - Alex

pub mod compiler;
pub mod composite;
pub mod containers;
pub mod datatype;
pub mod error;
pub mod registry;
pub mod vtable;

pub use compiler::{CompileOptions, TypeCompiler};
pub use composite::{
    align_up, BitField, CallingConvention, Component, Composite, CompositeKind, EnumType, EnumValue, FunctionDef,
    Parameter, TypeEntry, Typedef,
};
pub use datatype::{DataType, TypePath};
pub use error::LayoutError;
pub use registry::{Categories, DataOrganization, TypeRegistry};
pub use vtable::VTableCompiler;
