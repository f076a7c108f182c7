// Tue Oct 13 2026 - Alex

pub mod hoist;
pub mod index;

pub use hoist::hoist_anonymous_types;
pub use index::{mark_subclassed, TypeIndex};

use crate::definition::CodeGen;
use crate::layout::LayoutError;
use log::info;

pub struct Preprocessor;

impl Preprocessor {
    /// Hoists nested types, indexes every type by name and computes which
    /// classes have subclasses.
    pub fn run(codegen: &mut CodeGen) -> Result<TypeIndex, LayoutError> {
        let hoisted = hoist_anonymous_types(codegen)?;
        let index = TypeIndex::build(codegen);
        mark_subclassed(codegen, &index);
        info!(
            "preprocessed {} types ({} hoisted from nested definitions)",
            codegen.type_count(),
            hoisted
        );
        Ok(index)
    }
}
