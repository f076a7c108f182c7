// Tue Oct 13 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("unexpected exe format {0}")]
    UnsupportedExecutableFormat(String),
    #[error("Unsupported pointer size: {0}")]
    UnsupportedPointerSize(usize),
    #[error("unnamed typed field {0}")]
    UnnamedNestedType(String),
    #[error("Undefined type referenced: {0}")]
    UndefinedType(String),
    #[error("Type has no name: {0}")]
    MissingTypeName(String),
    #[error("Unhandled type meta for {type_name}: {meta}")]
    UnhandledTypeKind { type_name: String, meta: String },
    #[error("Unhandled field meta/subtype: {meta}/{subtype}")]
    UnhandledFieldKind { meta: String, subtype: String },
    #[error("Field {0} needs an item type")]
    MissingItem(String),
    #[error("Static array {0} has neither a count nor an index enum")]
    MissingArrayExtent(String),
    #[error("Inheritance cycle through {0}")]
    InheritanceCycle(String),
    #[error("Invalid bitfield width {bits} for {name}")]
    InvalidBitfieldWidth { name: String, bits: i64 },
    #[error("Could not resolve signature of {method}: {source}")]
    UnresolvedMethodSignature {
        method: String,
        #[source]
        source: Box<LayoutError>,
    },
    #[error("Registry entry missing: {0}")]
    RegistryEntryMissing(String),
}
