// Tue Oct 13 2026 - Alex

use crate::abi::{AbiProfile, StdTypes};
use crate::definition::{CodeGen, FieldId, Meta, TypeDef, TypeId};
use crate::graph::TypeIndex;
use crate::layout::composite::align_up;
use crate::layout::{
    Categories, Composite, CompositeKind, DataType, EnumType, LayoutError, TypePath, TypeRegistry, Typedef,
    VTableCompiler,
};
use log::{debug, trace};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Point base-class pointers at a `virtual_<name>` union of every subclass.
    pub polymorphic_pointers: bool,
}

/// Turns type definitions into registry entries. Results are memoized in
/// the registry itself: a type that already exists there is returned as is.
pub struct TypeCompiler<'a> {
    pub(crate) codegen: &'a CodeGen,
    pub(crate) index: &'a TypeIndex,
    pub(crate) registry: &'a mut TypeRegistry,
    pub(crate) abi: &'a AbiProfile,
    pub(crate) std: &'a StdTypes,
    pub(crate) categories: &'a Categories,
    options: CompileOptions,
}

impl<'a> TypeCompiler<'a> {
    pub fn new(
        codegen: &'a CodeGen,
        index: &'a TypeIndex,
        registry: &'a mut TypeRegistry,
        abi: &'a AbiProfile,
        std: &'a StdTypes,
        categories: &'a Categories,
    ) -> Self {
        Self {
            codegen,
            index,
            registry,
            abi,
            std,
            categories,
            options: CompileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &TypeRegistry {
        self.registry
    }

    pub fn compile(&mut self, name: &str) -> Result<DataType, LayoutError> {
        let id = self.lookup(name)?;
        self.compile_type(id)
    }

    pub fn compile_type(&mut self, id: TypeId) -> Result<DataType, LayoutError> {
        let def = self.codegen.type_def(id);
        let name = type_name(def)?;

        let category = match def.meta {
            Meta::EnumType => &self.categories.enums,
            _ => &self.categories.root,
        };
        if self.registry.contains(category, name) {
            return Ok(DataType::named(TypePath::new(category, name)));
        }

        trace!("compiling {} ({})", name, def.meta);
        match def.meta {
            Meta::EnumType => self.compile_enum(def),
            Meta::BitfieldType => self.compile_bitfield(def),
            Meta::StructType => self.compile_struct(id),
            Meta::ClassType => self.compile_class(id),
            Meta::StaticArray => {
                let field = *def.fields.first().ok_or_else(|| LayoutError::MissingItem(name.to_string()))?;
                let element = self.resolve_field(field)?;
                Ok(self.registry.create(&self.categories.root, Typedef::new(name, element)))
            }
            _ => Err(LayoutError::UnhandledTypeKind {
                type_name: name.to_string(),
                meta: def.meta.to_string(),
            }),
        }
    }

    pub(crate) fn lookup(&self, name: &str) -> Result<TypeId, LayoutError> {
        self.index
            .get(name)
            .ok_or_else(|| LayoutError::UndefinedType(name.to_string()))
    }

    fn compile_enum(&mut self, def: &TypeDef) -> Result<DataType, LayoutError> {
        let name = type_name(def)?;
        let size = match def.base_type.as_deref() {
            None | Some("") => 4,
            Some(base) => self
                .registry
                .get_in(&self.categories.std, base)
                .and_then(|_| self.registry.size_of(&DataType::named(TypePath::new(&self.categories.std, base))))
                .ok_or_else(|| LayoutError::UndefinedType(base.to_string()))?,
        };

        let mut enum_type = EnumType::new(name, size);
        let mut previous = -1i64;
        for item in &def.enum_items {
            let value = item.value.unwrap_or_else(|| previous.wrapping_add(1));
            let item_name = item.name.clone().unwrap_or_else(|| format!("_unk_{}", value));
            enum_type.add(&item_name, value);
            previous = value;
        }

        Ok(self.registry.create(&self.categories.enums, enum_type))
    }

    fn compile_bitfield(&mut self, def: &TypeDef) -> Result<DataType, LayoutError> {
        let name = type_name(def)?;
        let mut bitfield = Composite::structure(name).with_minimum_alignment(4);
        for &field in &def.fields {
            let f = self.codegen.field(field);
            let bits = f.count.unwrap_or(1);
            bitfield.add_bitfield(self.std.uint32.clone(), bits, member_name(def, field, self.codegen))?;
        }
        Ok(self.registry.create(&self.categories.root, bitfield))
    }

    /// Registers an empty composite (plus an alias for a legacy-named type)
    /// so that references back to the type resolve while it is being built.
    fn begin_composite(&mut self, def: &TypeDef, kind: CompositeKind) -> Result<(TypePath, Option<String>), LayoutError> {
        let name = type_name(def)?;
        let struct_name = def.original_name.as_deref().unwrap_or(name);
        let dt = self.registry.put(&self.categories.root, Composite::new(struct_name, kind));
        let path = dt.path().cloned().ok_or_else(|| LayoutError::RegistryEntryMissing(struct_name.to_string()))?;

        let alias = match &def.original_name {
            Some(_) => {
                self.registry.put(&self.categories.root, Typedef::new(name, dt));
                Some(name.to_string())
            }
            None => None,
        };
        Ok((path, alias))
    }

    fn finish_composite(&mut self, path: &TypePath, alias: Option<String>) -> DataType {
        let dt = DataType::named(path.clone());
        self.registry.commit(&dt);
        match alias {
            Some(alias) => self.registry.create(&self.categories.root, Typedef::new(&alias, dt)),
            None => dt,
        }
    }

    fn compile_struct(&mut self, id: TypeId) -> Result<DataType, LayoutError> {
        let def = self.codegen.type_def(id);
        let kind = if def.is_union { CompositeKind::Union } else { CompositeKind::Struct };
        let (path, alias) = self.begin_composite(def, kind)?;
        self.add_struct_fields(&path, id)?;
        Ok(self.finish_composite(&path, alias))
    }

    fn compile_class(&mut self, id: TypeId) -> Result<DataType, LayoutError> {
        let def = self.codegen.type_def(id);
        let (path, alias) = self.begin_composite(def, CompositeKind::Struct)?;

        let vtable = VTableCompiler::new(self).compile(id)?;
        self.registry
            .add_component(&path, DataType::pointer_to(vtable), 0, Some("_vtable".to_string()), None)?;
        self.add_struct_fields(&path, id)?;

        let dt = self.finish_composite(&path, alias);
        self.add_to_base_class_union(id, DataType::named(path))?;
        self.refresh_base_class_unions(id)?;
        Ok(dt)
    }

    /// Appends the inherited fields, then the type's own fields, to `target`.
    fn add_struct_fields(&mut self, target: &TypePath, id: TypeId) -> Result<(), LayoutError> {
        self.check_inheritance(id)?;
        self.append_fields(target, id)
    }

    /// Fails when the `inherits-from` chain starting at `id` loops back on itself.
    fn check_inheritance(&self, id: TypeId) -> Result<(), LayoutError> {
        let mut seen = HashSet::new();
        let mut current = id;
        while seen.insert(current) {
            match &self.codegen.type_def(current).inherits_from {
                Some(parent) => current = self.lookup(parent)?,
                None => return Ok(()),
            }
        }
        Err(LayoutError::InheritanceCycle(self.codegen.type_def(id).name().to_string()))
    }

    fn append_fields(&mut self, target: &TypePath, id: TypeId) -> Result<(), LayoutError> {
        let codegen = self.codegen;
        let def = codegen.type_def(id);
        if let Some(parent) = &def.inherits_from {
            let parent = self.lookup(parent)?;
            self.append_fields(target, parent)?;

            let unit = self.abi.base_class_padding;
            let composite = self.registry.composite_mut(target)?;
            if unit > 1 && composite.length() % unit != 0 {
                let padding = align_up(composite.length(), unit) - composite.data_end();
                composite.add(
                    DataType::array_of(DataType::undefined(1), padding),
                    padding,
                    1,
                    None,
                    Some(format!("base class padding for {}", def.name())),
                );
            }
        }

        for &field in &def.fields {
            let data_type = self.resolve_field(field)?;
            let name = member_name(def, field, codegen);
            let size = codegen.field(field).size;
            self.registry.add_component(target, data_type, size, name, None)?;
        }
        Ok(())
    }

    /// The data type of one field.
    pub fn resolve_field(&mut self, id: FieldId) -> Result<DataType, LayoutError> {
        let field = self.codegen.field(id);
        let subtype = field.subtype.as_str();
        let resolved = match &field.meta {
            Meta::Primitive => match subtype {
                "stl-string" => Some(self.std.string.clone()),
                "stl-fstream" => Some(self.std.fstream.clone()),
                _ => None,
            },
            Meta::Container => match subtype {
                "stl-vector" => {
                    let element = self.resolve_item(id)?;
                    Some(self.vector_of(element)?)
                }
                "stl-bit-vector" => Some(self.std.vector_bool.clone()),
                "stl-set" => {
                    let element = self.resolve_item(id)?;
                    Some(self.set_of(element)?)
                }
                "stl-deque" => {
                    let element = self.resolve_item(id)?;
                    Some(self.deque_of(element))
                }
                "df-flagarray" => Some(self.std.bit_array.clone()),
                "df-array" => {
                    let element = self.resolve_item(id)?;
                    Some(self.df_array_of(element)?)
                }
                "df-linked-list" => Some(self.compile_reference(id)?),
                _ => None,
            },
            Meta::Number => match subtype {
                "bool" => Some(DataType::Bool),
                "s-float" => Some(DataType::float(4)),
                "d-float" => Some(DataType::float(8)),
                other => self.std.integer(other).cloned(),
            },
            Meta::Pointer => Some(self.resolve_pointer(id)?),
            Meta::Global | Meta::Compound => {
                if field.force_enum_size {
                    Some(self.forced_enum_base(id)?)
                } else {
                    Some(self.compile_reference(id)?)
                }
            }
            Meta::StaticArray => Some(self.resolve_static_array(id)?),
            Meta::Bytes => match subtype {
                "padding" => Some(DataType::array_of(DataType::undefined(1), field.size)),
                "static-string" => Some(DataType::String),
                _ => None,
            },
            _ => None,
        };

        resolved.ok_or_else(|| LayoutError::UnhandledFieldKind {
            meta: field.meta.to_string(),
            subtype: field.subtype.clone(),
        })
    }

    fn resolve_item(&mut self, id: FieldId) -> Result<Option<DataType>, LayoutError> {
        match self.codegen.field(id).item {
            Some(item) => self.resolve_field(item).map(Some),
            None => Ok(None),
        }
    }

    fn compile_reference(&mut self, id: FieldId) -> Result<DataType, LayoutError> {
        let field = self.codegen.field(id);
        let name = field
            .type_name
            .as_deref()
            .ok_or_else(|| LayoutError::MissingTypeName(field.display_name().to_string()))?;
        self.compile(name)
    }

    fn forced_enum_base(&self, id: FieldId) -> Result<DataType, LayoutError> {
        let field = self.codegen.field(id);
        let base = field.base_type.as_deref().unwrap_or("");
        if self.registry.contains(&self.categories.std, base) {
            Ok(DataType::named(TypePath::new(&self.categories.std, base)))
        } else {
            Err(LayoutError::UndefinedType(base.to_string()))
        }
    }

    fn resolve_pointer(&mut self, id: FieldId) -> Result<DataType, LayoutError> {
        let Some(item) = self.codegen.field(id).item else {
            return Ok(DataType::pointer_to(DataType::Default));
        };

        if self.options.polymorphic_pointers {
            let target = self.codegen.field(item);
            if matches!(target.meta, Meta::Global | Meta::Compound) {
                let parent = target.type_name.as_deref().and_then(|name| self.index.get(name));
                if let Some(parent) = parent {
                    if self.codegen.type_def(parent).has_subclasses {
                        let union = self.base_class_union(parent)?;
                        return Ok(DataType::pointer_to(union));
                    }
                }
            }
        }

        let target = self.resolve_field(item)?;
        Ok(DataType::pointer_to(target))
    }

    fn resolve_static_array(&mut self, id: FieldId) -> Result<DataType, LayoutError> {
        let field = self.codegen.field(id);
        let item = field
            .item
            .ok_or_else(|| LayoutError::MissingItem(field.display_name().to_string()))?;

        let count = match (field.count, field.index_enum.as_deref()) {
            (Some(count), _) => count,
            (None, Some(index_enum)) => {
                let items = &self.codegen.type_def(self.lookup(index_enum)?).enum_items;
                let first = items.first().and_then(|i| i.value).unwrap_or(0);
                items.len() as i64 + first
            }
            (None, None) => return Err(LayoutError::MissingArrayExtent(field.display_name().to_string())),
        };

        let element = self.resolve_field(item)?;
        Ok(DataType::array_of(element, count.max(0) as usize))
    }

    /// `virtual_<name>`: a union of a class and every class derived from it.
    pub fn base_class_union(&mut self, id: TypeId) -> Result<DataType, LayoutError> {
        let def = self.codegen.type_def(id);
        let union_name = format!("virtual_{}", def.symbol_name());
        if self.registry.contains(&self.categories.root, &union_name) {
            return Ok(DataType::named(TypePath::new(&self.categories.root, &union_name)));
        }

        let dt = self.registry.put(&self.categories.root, Composite::union(&union_name));
        let path = dt.path().cloned().ok_or_else(|| LayoutError::RegistryEntryMissing(union_name.clone()))?;
        let member = self.compile_type(id)?;
        self.registry
            .add_component(&path, member, 0, Some(type_name(def)?.to_string()), None)?;
        self.registry.commit(&dt);
        Ok(dt)
    }

    fn add_to_base_class_union(&mut self, id: TypeId, own: DataType) -> Result<(), LayoutError> {
        let def = self.codegen.type_def(id);
        let Some(parent) = &def.inherits_from else {
            return Ok(());
        };

        let member = if def.has_subclasses { self.base_class_union(id)? } else { own };
        let parent = self.lookup(parent)?;
        let union = self.base_class_union(parent)?;
        if let Some(path) = union.path() {
            debug!("adding {} to {}", member, path.name);
            self.registry.add_component(path, member, 0, None, None)?;
        }
        Ok(())
    }

    /// Members of a `virtual_<name>` union may have been added while their
    /// class was still being built. Once a class is complete, the unions of
    /// the class and of every ancestor are re-laid out, innermost first.
    fn refresh_base_class_unions(&mut self, id: TypeId) -> Result<(), LayoutError> {
        let mut current = Some(id);
        while let Some(class) = current {
            let def = self.codegen.type_def(class);
            let union = TypePath::new(&self.categories.root, &format!("virtual_{}", def.symbol_name()));
            if self.registry.get(&union).is_some() {
                self.registry.refresh_union(&union)?;
            }
            current = match &def.inherits_from {
                Some(parent) => Some(self.lookup(parent)?),
                None => None,
            };
        }
        Ok(())
    }
}

fn type_name(def: &TypeDef) -> Result<&str, LayoutError> {
    def.type_name
        .as_deref()
        .ok_or_else(|| LayoutError::MissingTypeName(def.meta.to_string()))
}

/// A field's member name: its own name, else `<owner>_<anon-name>`.
pub(crate) fn member_name(owner: &TypeDef, field: FieldId, codegen: &CodeGen) -> Option<String> {
    let field = codegen.field(field);
    if let Some(name) = &field.name {
        return Some(name.clone());
    }
    field
        .anon_name
        .as_ref()
        .map(|anon| format!("{}_{}", owner.name(), anon))
}
