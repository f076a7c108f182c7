// Tue Oct 13 2026 - Alex

use crate::layout::{DataType, LayoutError};
use serde::Serialize;
use std::fmt;

const BITFIELD_UNIT_BITS: u32 = 32;

pub fn align_up(value: usize, alignment: usize) -> usize {
    if alignment <= 1 {
        return value;
    }
    value.div_ceil(alignment) * alignment
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeKind {
    Struct,
    Union,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BitField {
    pub bit_offset: u32,
    pub bit_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    pub offset: usize,
    pub length: usize,
    pub name: Option<String>,
    pub data_type: DataType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitfield: Option<BitField>,
}

impl Component {
    pub fn end(&self) -> usize {
        self.offset + self.length
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "+0x{:x} {} {} ({} bytes)",
            self.offset,
            self.data_type,
            self.name.as_deref().unwrap_or("(unnamed)"),
            self.length
        )
    }
}

/// Struct or union with C-like default alignment. Length is always the
/// data end rounded up to the effective alignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Composite {
    pub name: String,
    pub kind: CompositeKind,
    components: Vec<Component>,
    length: usize,
    alignment: usize,
    minimum_alignment: usize,
    #[serde(skip)]
    data_end: usize,
    #[serde(skip)]
    open_unit: Option<(usize, u32)>,
}

impl Composite {
    pub fn new(name: &str, kind: CompositeKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            components: Vec::new(),
            length: 0,
            alignment: 1,
            minimum_alignment: 1,
            data_end: 0,
            open_unit: None,
        }
    }

    pub fn structure(name: &str) -> Self {
        Self::new(name, CompositeKind::Struct)
    }

    pub fn union(name: &str) -> Self {
        Self::new(name, CompositeKind::Union)
    }

    pub fn with_minimum_alignment(mut self, alignment: usize) -> Self {
        self.set_minimum_alignment(alignment);
        self
    }

    pub fn set_minimum_alignment(&mut self, alignment: usize) {
        self.minimum_alignment = alignment.max(1);
        self.recompute_length();
    }

    pub fn is_union(&self) -> bool {
        self.kind == CompositeKind::Union
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name.as_deref() == Some(name))
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// End of the last component, before trailing alignment padding.
    pub fn data_end(&self) -> usize {
        self.data_end
    }

    pub fn alignment(&self) -> usize {
        self.alignment.max(self.minimum_alignment)
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Appends a component. Struct members are placed at the next offset
    /// aligned for their type; union members all start at 0.
    pub fn add(
        &mut self,
        data_type: DataType,
        length: usize,
        alignment: usize,
        name: Option<String>,
        comment: Option<String>,
    ) -> &Component {
        self.open_unit = None;
        let alignment = alignment.max(1);
        let offset = match self.kind {
            CompositeKind::Struct => align_up(self.data_end, alignment),
            CompositeKind::Union => 0,
        };
        self.data_end = self.data_end.max(offset + length);
        self.alignment = self.alignment.max(alignment);
        self.components.push(Component {
            offset,
            length,
            name,
            data_type,
            comment,
            bitfield: None,
        });
        self.recompute_length();
        &self.components[self.components.len() - 1]
    }

    /// Packs `bits` into the current 32-bit storage unit, opening a new one
    /// when the field does not fit.
    pub fn add_bitfield(
        &mut self,
        base: DataType,
        bits: i64,
        name: Option<String>,
    ) -> Result<&Component, LayoutError> {
        let unit_bytes = (BITFIELD_UNIT_BITS / 8) as usize;
        let bit_size = u32::try_from(bits)
            .ok()
            .filter(|b| *b > 0 && *b <= BITFIELD_UNIT_BITS)
            .ok_or_else(|| LayoutError::InvalidBitfieldWidth {
                name: name.clone().unwrap_or_else(|| self.name.clone()),
                bits,
            })?;

        let (unit_offset, used) = match self.open_unit {
            Some((offset, used)) if used + bit_size <= BITFIELD_UNIT_BITS => (offset, used),
            _ => {
                let offset = match self.kind {
                    CompositeKind::Struct => align_up(self.data_end, unit_bytes),
                    CompositeKind::Union => 0,
                };
                (offset, 0)
            }
        };

        self.open_unit = Some((unit_offset, used + bit_size));
        self.data_end = self.data_end.max(unit_offset + unit_bytes);
        self.alignment = self.alignment.max(unit_bytes);
        self.components.push(Component {
            offset: unit_offset,
            length: unit_bytes,
            name,
            data_type: base,
            comment: None,
            bitfield: Some(BitField {
                bit_offset: used,
                bit_size,
            }),
        });
        self.recompute_length();
        Ok(&self.components[self.components.len() - 1])
    }

    /// Drops every component, keeping the name and minimum alignment.
    pub fn clear(&mut self) {
        self.components.clear();
        self.data_end = 0;
        self.alignment = 1;
        self.open_unit = None;
        self.recompute_length();
    }

    fn recompute_length(&mut self) {
        self.length = align_up(self.data_end, self.alignment());
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumValue {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumType {
    pub name: String,
    pub size: usize,
    pub values: Vec<EnumValue>,
}

impl EnumType {
    pub fn new(name: &str, size: usize) -> Self {
        Self {
            name: name.to_string(),
            size,
            values: Vec::new(),
        }
    }

    pub fn add(&mut self, name: &str, value: i64) {
        self.values.push(EnumValue {
            name: name.to_string(),
            value,
        });
    }

    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.values.iter().find(|v| v.name == name).map(|v| v.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CallingConvention {
    Thiscall,
}

impl CallingConvention {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallingConvention::Thiscall => "__thiscall",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Parameter {
    pub name: Option<String>,
    pub data_type: DataType,
}

/// A function signature. `return_type` of `None` means a still-undefined return.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDef {
    pub name: String,
    pub calling_convention: CallingConvention,
    pub return_type: Option<DataType>,
    pub parameters: Vec<Parameter>,
}

impl FunctionDef {
    pub fn thiscall(name: &str) -> Self {
        Self {
            name: name.to_string(),
            calling_convention: CallingConvention::Thiscall,
            return_type: None,
            parameters: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Typedef {
    pub name: String,
    pub target: DataType,
}

impl Typedef {
    pub fn new(name: &str, target: DataType) -> Self {
        Self {
            name: name.to_string(),
            target,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "entry", rename_all = "snake_case")]
pub enum TypeEntry {
    Composite(Composite),
    Enum(EnumType),
    Typedef(Typedef),
    Function(FunctionDef),
}

impl TypeEntry {
    pub fn name(&self) -> &str {
        match self {
            TypeEntry::Composite(c) => &c.name,
            TypeEntry::Enum(e) => &e.name,
            TypeEntry::Typedef(t) => &t.name,
            TypeEntry::Function(f) => &f.name,
        }
    }

    pub fn as_composite(&self) -> Option<&Composite> {
        match self {
            TypeEntry::Composite(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumType> {
        match self {
            TypeEntry::Enum(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionDef> {
        match self {
            TypeEntry::Function(f) => Some(f),
            _ => None,
        }
    }
}

impl From<Composite> for TypeEntry {
    fn from(c: Composite) -> Self {
        TypeEntry::Composite(c)
    }
}

impl From<EnumType> for TypeEntry {
    fn from(e: EnumType) -> Self {
        TypeEntry::Enum(e)
    }
}

impl From<Typedef> for TypeEntry {
    fn from(t: Typedef) -> Self {
        TypeEntry::Typedef(t)
    }
}

impl From<FunctionDef> for TypeEntry {
    fn from(f: FunctionDef) -> Self {
        TypeEntry::Function(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_struct_alignment_and_tail_padding() {
        let mut st = Composite::structure("s");
        st.add(DataType::Bool, 1, 1, Some("flag".into()), None);
        st.add(DataType::signed(4), 4, 4, Some("id".into()), None);
        st.add(DataType::Char, 1, 1, Some("c".into()), None);

        assert_eq!(st.components()[1].offset, 4);
        assert_eq!(st.components()[2].offset, 8);
        assert_eq!(st.data_end(), 9);
        assert_eq!(st.length(), 12);
        assert_eq!(st.alignment(), 4);
    }

    #[test]
    fn test_union_members_share_offset() {
        let mut un = Composite::union("u");
        un.add(DataType::String, 16, 1, Some("_Buf".into()), None);
        un.add(DataType::pointer_to(DataType::Char), 8, 8, Some("_Ptr".into()), None);
        assert!(un.components().iter().all(|c| c.offset == 0));
        assert_eq!(un.length(), 16);
    }

    #[test]
    fn test_minimum_alignment_rounds_length() {
        let mut st = Composite::structure("opaque").with_minimum_alignment(8);
        st.add(DataType::undefined(44), 44, 1, None, None);
        assert_eq!(st.length(), 48);
    }

    #[test]
    fn test_bitfields_pack_into_units() {
        let mut st = Composite::structure("flags");
        st.add_bitfield(DataType::unsigned(4), 1, Some("a".into())).unwrap();
        st.add_bitfield(DataType::unsigned(4), 30, Some("b".into())).unwrap();
        st.add_bitfield(DataType::unsigned(4), 2, Some("c".into())).unwrap();

        let c = st.components();
        assert_eq!((c[0].offset, c[0].bitfield.unwrap().bit_offset), (0, 0));
        assert_eq!((c[1].offset, c[1].bitfield.unwrap().bit_offset), (0, 1));
        assert_eq!((c[2].offset, c[2].bitfield.unwrap().bit_offset), (4, 0));
        assert_eq!(st.length(), 8);

        assert!(st.add_bitfield(DataType::unsigned(4), 0, None).is_err());
        assert!(st.add_bitfield(DataType::unsigned(4), 33, None).is_err());
    }
}
