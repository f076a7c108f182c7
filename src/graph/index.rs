// Tue Oct 13 2026 - Alex

use crate::definition::{CodeGen, Meta, TypeId};
use std::collections::HashMap;

/// Name lookup over the type list, covering legacy original names.
#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    by_name: HashMap<String, TypeId>,
}

impl TypeIndex {
    pub fn build(codegen: &CodeGen) -> Self {
        let mut by_name = HashMap::new();
        for (id, def) in codegen.types() {
            if let Some(name) = &def.type_name {
                by_name.insert(name.clone(), id);
            }
            if let Some(original) = &def.original_name {
                by_name.insert(original.clone(), id);
            }
        }
        Self { by_name }
    }

    pub fn get(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// Marks every class that some other class inherits from. Runs to a fixed
/// point and returns the number of passes taken.
pub fn mark_subclassed(codegen: &mut CodeGen, index: &TypeIndex) -> usize {
    let mut passes = 0;
    loop {
        passes += 1;
        let mut changed = false;
        for id in codegen.type_list().to_vec() {
            let def = codegen.type_def(id);
            if def.meta != Meta::ClassType {
                continue;
            }
            let parent = def.inherits_from.as_deref().and_then(|name| index.get(name));
            if let Some(parent) = parent {
                let parent = codegen.type_def_mut(parent);
                if !parent.has_subclasses {
                    parent.has_subclasses = true;
                    changed = true;
                }
            }
        }
        if !changed {
            return passes;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::TypeDef;

    fn class(name: &str, parent: Option<&str>) -> TypeDef {
        TypeDef {
            type_name: Some(name.to_string()),
            inherits_from: parent.map(str::to_string),
            meta: Meta::ClassType,
            ..Default::default()
        }
    }

    #[test]
    fn test_index_includes_original_names() {
        let mut codegen = CodeGen::new();
        let unit = codegen.add_global_type(TypeDef {
            original_name: Some("creaturest".to_string()),
            ..class("unit", None)
        });

        let index = TypeIndex::build(&codegen);
        assert_eq!(index.get("unit"), Some(unit));
        assert_eq!(index.get("creaturest"), Some(unit));
        assert_eq!(index.get("missing"), None);
    }

    #[test]
    fn test_subclass_closure() {
        let mut codegen = CodeGen::new();
        let root = codegen.add_global_type(class("item", None));
        let mid = codegen.add_global_type(class("item_weaponst", Some("item")));
        let leaf = codegen.add_global_type(class("item_swordst", Some("item_weaponst")));
        let index = TypeIndex::build(&codegen);

        mark_subclassed(&mut codegen, &index);
        assert!(codegen.type_def(root).has_subclasses);
        assert!(codegen.type_def(mid).has_subclasses);
        assert!(!codegen.type_def(leaf).has_subclasses);
    }

    #[test]
    fn test_structs_do_not_mark_parents() {
        let mut codegen = CodeGen::new();
        let base = codegen.add_global_type(class("base", None));
        codegen.add_global_type(TypeDef {
            meta: Meta::StructType,
            ..class("derived", Some("base"))
        });
        let index = TypeIndex::build(&codegen);

        mark_subclassed(&mut codegen, &index);
        assert!(!codegen.type_def(base).has_subclasses);
    }
}
