// Tue Oct 13 2026 - Alex

use crate::definition::{CodeGen, Field, FieldId, Meta, TypeId};
use crate::layout::LayoutError;
use log::trace;
use std::collections::HashSet;

/// Local name of a compound declared `ld:anon-compound`.
pub const ANON_COMPOUND: &str = "(anon compound)";

/// Gives every nested type a top-level name of the form `<owner>::<name>`
/// and appends it to the type list. Returns the number of types hoisted.
pub fn hoist_anonymous_types(codegen: &mut CodeGen) -> Result<usize, LayoutError> {
    let mut hoister = Hoister {
        hoisted: Vec::new(),
        seen: HashSet::new(),
    };

    for global in codegen.globals().to_vec() {
        hoister.walk_field(codegen, "", global)?;
    }
    for id in codegen.type_list().to_vec() {
        hoister.walk_type(codegen, id)?;
    }

    let count = hoister.hoisted.len();
    codegen.extend_type_list(hoister.hoisted);
    Ok(count)
}

struct Hoister {
    hoisted: Vec<TypeId>,
    seen: HashSet<TypeId>,
}

impl Hoister {
    fn walk_type(&mut self, codegen: &mut CodeGen, id: TypeId) -> Result<(), LayoutError> {
        let prefix = format!("{}::", codegen.type_def(id).name());
        for field in codegen.type_def(id).fields.clone() {
            self.walk_field(codegen, &prefix, field)?;
        }
        Ok(())
    }

    /// Follows the `item` chain starting at `field`.
    fn walk_field(&mut self, codegen: &mut CodeGen, prefix: &str, field: FieldId) -> Result<(), LayoutError> {
        let mut current = Some(field);
        while let Some(f) = current {
            if let Some(owned) = codegen.field(f).owned_type {
                if self.seen.insert(owned) {
                    self.hoist(codegen, prefix, f, owned)?;
                    self.hoisted.push(owned);
                    self.walk_type(codegen, owned)?;
                }
            }
            current = codegen.field(f).item;
        }
        Ok(())
    }

    fn hoist(&mut self, codegen: &mut CodeGen, prefix: &str, f: FieldId, owned: TypeId) -> Result<(), LayoutError> {
        let field = codegen.field(f).clone();
        let def = codegen.type_def(owned);
        let local = def
            .type_name
            .clone()
            .or_else(|| def.anon_compound.then(|| ANON_COMPOUND.to_string()))
            .or_else(|| field.anon_name.clone())
            .or_else(|| field.name.clone())
            .ok_or_else(|| LayoutError::UnnamedNestedType(format!("{}{}", prefix, field.display_name())))?;

        match &field.meta {
            Meta::Compound => {
                let meta = if field.subtype.is_empty() {
                    Meta::StructType
                } else {
                    Meta::parse(&format!("{}-type", field.subtype))
                };
                codegen.type_def_mut(owned).meta = meta;
            }
            Meta::StaticArray => {
                let wrapper = codegen.add_field(Field {
                    meta: Meta::StaticArray,
                    index_enum: field.index_enum.clone(),
                    count: field.count,
                    item: field.item,
                    ..Default::default()
                });
                let def = codegen.type_def_mut(owned);
                def.meta = Meta::StaticArray;
                def.fields.push(wrapper);
            }
            _ => {}
        }

        let name = format!("{}{}", prefix, local);
        trace!("hoisting nested type {}", name);
        codegen.type_def_mut(owned).type_name = Some(name.clone());
        codegen.field_mut(f).type_name = Some(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::TypeDef;

    fn named_type(codegen: &mut CodeGen, name: &str) -> TypeId {
        codegen.add_global_type(TypeDef {
            type_name: Some(name.to_string()),
            meta: Meta::StructType,
            ..Default::default()
        })
    }

    fn compound_field(codegen: &mut CodeGen, owner: TypeId, name: Option<&str>, anon: Option<&str>) -> FieldId {
        let field = codegen.add_field(Field {
            name: name.map(str::to_string),
            anon_name: anon.map(str::to_string),
            meta: Meta::Compound,
            ..Default::default()
        });
        codegen.type_def_mut(owner).fields.push(field);
        field
    }

    #[test]
    fn test_nested_names_follow_owner_path() {
        let mut codegen = CodeGen::new();
        let baz = named_type(&mut codegen, "Baz");
        let foo = compound_field(&mut codegen, baz, Some("foo"), Some("bar"));
        let bar = codegen.owned_type(foo);
        let inner = compound_field(&mut codegen, bar, None, Some("inner"));
        let inner_type = codegen.owned_type(inner);

        assert_eq!(hoist_anonymous_types(&mut codegen).unwrap(), 2);
        assert_eq!(codegen.type_def(bar).type_name.as_deref(), Some("Baz::bar"));
        assert_eq!(codegen.type_def(bar).meta, Meta::StructType);
        assert_eq!(codegen.type_def(inner_type).type_name.as_deref(), Some("Baz::bar::inner"));
        assert_eq!(codegen.field(foo).type_name.as_deref(), Some("Baz::bar"));
        assert_eq!(codegen.type_list(), &[baz, bar, inner_type]);
    }

    #[test]
    fn test_subtype_selects_nested_kind() {
        let mut codegen = CodeGen::new();
        let owner = named_type(&mut codegen, "unit");
        let field = compound_field(&mut codegen, owner, Some("flags"), None);
        codegen.field_mut(field).subtype = "bitfield".to_string();
        let nested = codegen.owned_type(field);

        hoist_anonymous_types(&mut codegen).unwrap();
        assert_eq!(codegen.type_def(nested).meta, Meta::BitfieldType);
        assert_eq!(codegen.type_def(nested).type_name.as_deref(), Some("unit::flags"));
    }

    #[test]
    fn test_static_array_gets_wrapper_field() {
        let mut codegen = CodeGen::new();
        let owner = named_type(&mut codegen, "map");
        let item = codegen.add_field(Field {
            meta: Meta::Number,
            subtype: "int16_t".to_string(),
            ..Default::default()
        });
        let array = codegen.add_field(Field {
            name: Some("tiles".to_string()),
            meta: Meta::StaticArray,
            count: Some(16),
            item: Some(item),
            ..Default::default()
        });
        codegen.type_def_mut(owner).fields.push(array);
        let nested = codegen.owned_type(array);
        codegen.type_def_mut(nested).type_name = Some("tile_row".to_string());

        hoist_anonymous_types(&mut codegen).unwrap();
        let def = codegen.type_def(nested);
        assert_eq!(def.type_name.as_deref(), Some("map::tile_row"));
        assert_eq!(def.meta, Meta::StaticArray);
        assert_eq!(def.fields.len(), 1);
        let wrapper = codegen.field(def.fields[0]);
        assert_eq!(wrapper.count, Some(16));
        assert_eq!(wrapper.item, Some(item));
    }

    #[test]
    fn test_unnamed_nested_type_fails() {
        let mut codegen = CodeGen::new();
        let owner = named_type(&mut codegen, "Baz");
        let field = compound_field(&mut codegen, owner, None, None);
        codegen.owned_type(field);

        assert!(matches!(
            hoist_anonymous_types(&mut codegen),
            Err(LayoutError::UnnamedNestedType(name)) if name == "Baz::(unnamed)"
        ));
    }

    #[test]
    fn test_anon_compound_gets_placeholder_name() {
        let mut codegen = CodeGen::new();
        let owner = named_type(&mut codegen, "Baz");
        let field = compound_field(&mut codegen, owner, None, None);
        let nested = codegen.owned_type(field);
        codegen.type_def_mut(nested).anon_compound = true;

        hoist_anonymous_types(&mut codegen).unwrap();
        assert_eq!(codegen.type_def(nested).type_name.as_deref(), Some("Baz::(anon compound)"));
        assert_eq!(codegen.field(field).type_name.as_deref(), Some("Baz::(anon compound)"));
    }

    #[test]
    fn test_globals_use_empty_prefix() {
        let mut codegen = CodeGen::new();
        let item = codegen.add_field(Field {
            meta: Meta::Compound,
            ..Default::default()
        });
        let global = codegen.add_global_object(Field {
            name: Some("world".to_string()),
            item: Some(item),
            ..Default::default()
        });
        let nested = codegen.owned_type(item);
        codegen.type_def_mut(nested).type_name = Some("world_data".to_string());

        hoist_anonymous_types(&mut codegen).unwrap();
        assert_eq!(codegen.type_def(nested).type_name.as_deref(), Some("world_data"));
        assert_eq!(codegen.field(item).type_name.as_deref(), Some("world_data"));
        assert_eq!(codegen.globals(), &[global]);
    }
}
