// Tue Oct 13 2026 - Alex

use std::fmt;

pub type TypeId = usize;
pub type FieldId = usize;

/// The `ld:meta` tag of a type or field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Meta {
    #[default]
    Unset,
    Primitive,
    Number,
    Pointer,
    Global,
    Compound,
    Container,
    StaticArray,
    Bytes,
    EnumType,
    BitfieldType,
    StructType,
    ClassType,
    Other(String),
}

impl Meta {
    pub fn parse(value: &str) -> Self {
        match value {
            "" => Self::Unset,
            "primitive" => Self::Primitive,
            "number" => Self::Number,
            "pointer" => Self::Pointer,
            "global" => Self::Global,
            "compound" => Self::Compound,
            "container" => Self::Container,
            "static-array" => Self::StaticArray,
            "bytes" => Self::Bytes,
            "enum-type" => Self::EnumType,
            "bitfield-type" => Self::BitfieldType,
            "struct-type" => Self::StructType,
            "class-type" => Self::ClassType,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Unset => "",
            Self::Primitive => "primitive",
            Self::Number => "number",
            Self::Pointer => "pointer",
            Self::Global => "global",
            Self::Compound => "compound",
            Self::Container => "container",
            Self::StaticArray => "static-array",
            Self::Bytes => "bytes",
            Self::EnumType => "enum-type",
            Self::BitfieldType => "bitfield-type",
            Self::StructType => "struct-type",
            Self::ClassType => "class-type",
            Self::Other(other) => other,
        }
    }
}

impl fmt::Display for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnumItem {
    pub name: Option<String>,
    pub value: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VMethod {
    pub name: Option<String>,
    pub anon_name: Option<String>,
    pub arguments: Vec<FieldId>,
    pub return_type: Option<FieldId>,
    pub is_destructor: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeDef {
    pub type_name: Option<String>,
    pub original_name: Option<String>,
    pub inherits_from: Option<String>,
    pub base_type: Option<String>,
    pub meta: Meta,
    pub subtype: String,
    pub is_union: bool,
    pub anon_compound: bool,
    pub has_subclasses: bool,
    pub fields: Vec<FieldId>,
    pub enum_items: Vec<EnumItem>,
    pub vmethods: Vec<VMethod>,
}

impl TypeDef {
    pub fn name(&self) -> &str {
        self.type_name.as_deref().unwrap_or("")
    }

    /// The name the binary's own symbols use: the legacy name when one exists.
    pub fn symbol_name(&self) -> &str {
        self.original_name.as_deref().unwrap_or_else(|| self.name())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Field {
    pub name: Option<String>,
    pub anon_name: Option<String>,
    pub type_name: Option<String>,
    pub base_type: Option<String>,
    pub owned_type: Option<TypeId>,
    pub meta: Meta,
    pub subtype: String,
    pub size: usize,
    pub count: Option<i64>,
    pub item: Option<FieldId>,
    pub index_enum: Option<String>,
    pub force_enum_size: bool,
}

impl Field {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.anon_name.as_deref())
            .unwrap_or("(unnamed)")
    }
}

/// Arena holding the lowered type graph. Fields and types refer to each other
/// by index; `type_list` is the ordered set of top-level types to create.
#[derive(Debug, Clone, Default)]
pub struct CodeGen {
    types: Vec<TypeDef>,
    fields: Vec<Field>,
    type_list: Vec<TypeId>,
    globals: Vec<FieldId>,
}

impl CodeGen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_type(&mut self, def: TypeDef) -> TypeId {
        self.types.push(def);
        self.types.len() - 1
    }

    /// Adds a type and lists it as a top-level (global) type.
    pub fn add_global_type(&mut self, def: TypeDef) -> TypeId {
        let id = self.add_type(def);
        self.type_list.push(id);
        id
    }

    pub fn add_field(&mut self, field: Field) -> FieldId {
        self.fields.push(field);
        self.fields.len() - 1
    }

    pub fn add_global_object(&mut self, field: Field) -> FieldId {
        let id = self.add_field(field);
        self.globals.push(id);
        id
    }

    pub fn type_def(&self, id: TypeId) -> &TypeDef {
        &self.types[id]
    }

    pub fn type_def_mut(&mut self, id: TypeId) -> &mut TypeDef {
        &mut self.types[id]
    }

    pub fn field(&self, id: FieldId) -> &Field {
        &self.fields[id]
    }

    pub fn field_mut(&mut self, id: FieldId) -> &mut Field {
        &mut self.fields[id]
    }

    /// Returns the type nested inside a field, creating an empty one on first use.
    pub fn owned_type(&mut self, field: FieldId) -> TypeId {
        if let Some(id) = self.fields[field].owned_type {
            return id;
        }
        let id = self.add_type(TypeDef::default());
        self.fields[field].owned_type = Some(id);
        id
    }

    pub fn type_list(&self) -> &[TypeId] {
        &self.type_list
    }

    pub fn extend_type_list(&mut self, ids: impl IntoIterator<Item = TypeId>) {
        self.type_list.extend(ids);
    }

    pub fn globals(&self) -> &[FieldId] {
        &self.globals
    }

    pub fn types(&self) -> impl Iterator<Item = (TypeId, &TypeDef)> {
        self.type_list.iter().map(move |&id| (id, &self.types[id]))
    }

    pub fn type_count(&self) -> usize {
        self.type_list.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owned_type_is_created_once() {
        let mut codegen = CodeGen::new();
        let field = codegen.add_field(Field::default());

        let a = codegen.owned_type(field);
        let b = codegen.owned_type(field);
        assert_eq!(a, b);
        assert_eq!(codegen.type_count(), 0);
    }

    #[test]
    fn test_meta_round_trip_keeps_unknown_kinds() {
        assert_eq!(Meta::parse("class-type"), Meta::ClassType);
        assert_eq!(Meta::parse("flag-bit").as_str(), "flag-bit");
    }
}
