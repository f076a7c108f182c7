// Tue Oct 13 2026 - Alex

pub mod error;
pub mod model;
pub mod parser;
pub mod symbols;

pub use error::DefinitionError;
pub use model::{CodeGen, EnumItem, Field, FieldId, Meta, TypeDef, TypeId, VMethod};
pub use parser::{decode_number, parse_codegen, parse_symbols, DefinitionParser, LD_NAMESPACE};
pub use symbols::{GlobalAddress, SymbolTable, Symbols, VTableAddress};
