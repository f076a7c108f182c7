// Tue Oct 13 2026 - Alex

use crate::definition::model::{CodeGen, EnumItem, Field, FieldId, Meta, TypeDef, TypeId, VMethod};
use crate::definition::symbols::{GlobalAddress, SymbolTable, Symbols, VTableAddress};
use crate::definition::DefinitionError;
use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use std::io::BufRead;

pub const LD_NAMESPACE: &str = "http://github.com/peterix/dfhack/lowered-data-definition";

const IGNORED_ELEMENTS: &[&str] = &[
    "enum-attr",
    "item-attr",
    "code-helper",
    "extra-include",
    "custom-methods",
    "cmethod",
    "comment",
];

const IGNORED_ATTRIBUTES: &[&str] = &[
    "last-value",
    "ref-target",
    "pointer-type",
    "comment",
    "init-value",
    "aux-value",
    "since",
    "refers-to",
    "ret-type",
    "instance-vector",
    "key-field",
    "is-array",
    "is-list",
    "default-value",
    "use-key-name",
    "index-refers-to",
    "has-bad-pointers",
    "custom-methods",
    "filename",
    "item-type",
    "df-list-link-type",
    "df-list-link-field",
];

const IGNORED_LD_ATTRIBUTES: &[&str] = &["level", "is-container", "bits", "unsigned", "in-union"];

/// One open element. Indices point into the documents under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Ignored,
    Symbols,
    SymbolTable(usize),
    BinaryTimestamp(usize),
    Md5Hash(usize),
    VTableAddress(usize, usize),
    GlobalAddress(usize, usize),
    CodeGen,
    Type(TypeId),
    Field(FieldId),
    VMethod(TypeId, usize),
    EnumItem(TypeId, usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Scope {
    Plain,
    Lowered,
    Foreign(String),
}

impl Scope {
    fn resolve(result: ResolveResult<'_>) -> Self {
        match result {
            ResolveResult::Unbound => Scope::Plain,
            ResolveResult::Bound(ns) if ns.as_ref() == LD_NAMESPACE.as_bytes() => Scope::Lowered,
            ResolveResult::Bound(ns) => Scope::Foreign(String::from_utf8_lossy(ns.as_ref()).into_owned()),
            ResolveResult::Unknown(prefix) => Scope::Foreign(String::from_utf8_lossy(&prefix).into_owned()),
        }
    }
}

struct Attr {
    scope: Scope,
    name: String,
    value: String,
}

/// Streaming reader for `codegen.out.xml` and `symbols.xml`. Both documents
/// can be fed to the same parser; each one fills in its half of the result.
#[derive(Debug, Default)]
pub struct DefinitionParser {
    codegen: Option<CodeGen>,
    symbols: Option<Symbols>,
    stack: Vec<Frame>,
}

impl DefinitionParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse<R: BufRead>(&mut self, source: R) -> Result<(), DefinitionError> {
        let mut reader = NsReader::from_reader(source);
        reader.config_mut().trim_text(true);
        self.stack.clear();

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => self.start_element(&reader, &e)?,
                Event::Empty(e) => {
                    self.start_element(&reader, &e)?;
                    self.stack.pop();
                }
                Event::End(_) => {
                    self.stack.pop();
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(())
    }

    pub fn codegen(&self) -> Option<&CodeGen> {
        self.codegen.as_ref()
    }

    pub fn symbols(&self) -> Option<&Symbols> {
        self.symbols.as_ref()
    }

    pub fn into_parts(self) -> (Option<CodeGen>, Option<Symbols>) {
        (self.codegen, self.symbols)
    }

    fn start_element<R>(&mut self, reader: &NsReader<R>, e: &BytesStart<'_>) -> Result<(), DefinitionError> {
        if self.stack.last() == Some(&Frame::Ignored) {
            self.stack.push(Frame::Ignored);
            return Ok(());
        }

        let (ns, local) = reader.resolve_element(e.name());
        let scope = Scope::resolve(ns);
        let name = String::from_utf8_lossy(local.as_ref()).into_owned();

        let frame = self.open_element(&scope, &name)?;
        if frame != Frame::Ignored {
            for attr in collect_attributes(reader, e)? {
                self.apply_attribute(frame, &name, attr)?;
            }
        }
        self.stack.push(frame);
        Ok(())
    }

    fn open_element(&mut self, scope: &Scope, name: &str) -> Result<Frame, DefinitionError> {
        let top = self.stack.last().copied();
        match scope {
            Scope::Plain => self.open_plain_element(top, name),
            Scope::Lowered => self.open_lowered_element(top, name),
            Scope::Foreign(uri) => {
                warn!("Unhandled XML element namespace: {}", uri);
                Ok(Frame::Ignored)
            }
        }
    }

    fn open_plain_element(&mut self, top: Option<Frame>, name: &str) -> Result<Frame, DefinitionError> {
        match name {
            "enum-item" => {
                let owner = self.owned_type(top, name)?;
                let def = self.codegen_mut(name)?.type_def_mut(owner);
                def.enum_items.push(EnumItem::default());
                Ok(Frame::EnumItem(owner, def.enum_items.len() - 1))
            }
            "virtual-methods" => top.ok_or_else(|| missing_parent(name)),
            "vmethod" => {
                let owner = self.owned_type(top, name)?;
                let def = self.codegen_mut(name)?.type_def_mut(owner);
                def.vmethods.push(VMethod::default());
                Ok(Frame::VMethod(owner, def.vmethods.len() - 1))
            }
            "ret-type" => match top {
                Some(Frame::VMethod(owner, index)) => {
                    let codegen = self.codegen_mut(name)?;
                    let field = codegen.add_field(Field::default());
                    codegen.type_def_mut(owner).vmethods[index].return_type = Some(field);
                    Ok(Frame::Field(field))
                }
                _ => Err(missing_parent(name)),
            },
            "data-definition" => {
                debug!("Starting symbols document");
                self.symbols = Some(Symbols::default());
                Ok(Frame::Symbols)
            }
            "symbol-table" => match (top, self.symbols.as_mut()) {
                (Some(Frame::Symbols), Some(symbols)) => {
                    symbols.tables.push(SymbolTable::default());
                    Ok(Frame::SymbolTable(symbols.tables.len() - 1))
                }
                _ => Err(missing_parent(name)),
            },
            "binary-timestamp" => self.symbol_table_child(top, name).map(Frame::BinaryTimestamp),
            "md5-hash" => self.symbol_table_child(top, name).map(Frame::Md5Hash),
            "global-address" => {
                let table = self.symbol_table_child(top, name)?;
                let globals = &mut self.symbols_mut(name)?.tables[table].globals;
                globals.push(GlobalAddress::default());
                Ok(Frame::GlobalAddress(table, globals.len() - 1))
            }
            "vtable-address" => {
                let table = self.symbol_table_child(top, name)?;
                let vtables = &mut self.symbols_mut(name)?.tables[table].vtables;
                vtables.push(VTableAddress::default());
                Ok(Frame::VTableAddress(table, vtables.len() - 1))
            }
            other => {
                if !IGNORED_ELEMENTS.contains(&other) {
                    warn!("Unhandled XML element name: {}", other);
                }
                Ok(Frame::Ignored)
            }
        }
    }

    fn open_lowered_element(&mut self, top: Option<Frame>, name: &str) -> Result<Frame, DefinitionError> {
        match name {
            "data-definition" => {
                debug!("Starting codegen document");
                self.codegen = Some(CodeGen::new());
                Ok(Frame::CodeGen)
            }
            "global-type" => match top {
                Some(Frame::CodeGen) => {
                    let id = self.codegen_mut(name)?.add_global_type(TypeDef::default());
                    Ok(Frame::Type(id))
                }
                _ => Err(missing_parent(name)),
            },
            "global-object" => match top {
                Some(Frame::CodeGen) => {
                    let id = self.codegen_mut(name)?.add_global_object(Field::default());
                    Ok(Frame::Field(id))
                }
                _ => Err(missing_parent(name)),
            },
            "field" => {
                let codegen = self.codegen_mut(name)?;
                let field = codegen.add_field(Field::default());
                match top {
                    Some(Frame::Type(owner)) => codegen.type_def_mut(owner).fields.push(field),
                    Some(Frame::VMethod(owner, index)) => {
                        codegen.type_def_mut(owner).vmethods[index].arguments.push(field)
                    }
                    Some(Frame::Field(parent)) => {
                        let owner = codegen.owned_type(parent);
                        codegen.type_def_mut(owner).fields.push(field);
                    }
                    _ => return Err(missing_parent(name)),
                }
                Ok(Frame::Field(field))
            }
            "item" => match top {
                Some(Frame::Field(parent)) => {
                    let codegen = self.codegen_mut(name)?;
                    let item = codegen.add_field(Field::default());
                    codegen.field_mut(parent).item = Some(item);
                    Ok(Frame::Field(item))
                }
                _ => Err(missing_parent(name)),
            },
            other => {
                warn!("Unhandled XML element name: ld:{}", other);
                Ok(Frame::Ignored)
            }
        }
    }

    fn apply_attribute(&mut self, frame: Frame, element: &str, attr: Attr) -> Result<(), DefinitionError> {
        match attr.scope {
            Scope::Plain => self.apply_plain_attribute(frame, element, &attr.name, attr.value),
            Scope::Lowered => self.apply_lowered_attribute(frame, element, &attr.name, attr.value),
            Scope::Foreign(uri) => {
                warn!("Unhandled XML attribute namespace: {}", uri);
                Ok(())
            }
        }
    }

    fn apply_plain_attribute(
        &mut self,
        frame: Frame,
        element: &str,
        name: &str,
        value: String,
    ) -> Result<(), DefinitionError> {
        match (name, frame) {
            ("type-name", Frame::Field(f)) => self.codegen_mut(element)?.field_mut(f).type_name = Some(value),
            ("type-name", _) => {
                let owner = self.owned_type(Some(frame), element)?;
                self.codegen_mut(element)?.type_def_mut(owner).type_name = Some(value);
            }
            ("base-type", Frame::Field(f)) => self.codegen_mut(element)?.field_mut(f).base_type = Some(value),
            ("base-type", _) => {
                let owner = self.owned_type(Some(frame), element)?;
                self.codegen_mut(element)?.type_def_mut(owner).base_type = Some(value);
            }
            ("name", _) => self.set_name(frame, element, value)?,
            ("value", _) => self.set_value(frame, element, value)?,
            ("count", Frame::Field(f)) => {
                let count = decode_number(name, &value)?;
                self.codegen_mut(element)?.field_mut(f).count = Some(count);
            }
            ("size", Frame::Field(f)) => {
                let size = decode_number(name, &value)?;
                let size = usize::try_from(size).map_err(|_| invalid_number(name, &value))?;
                self.codegen_mut(element)?.field_mut(f).size = size;
            }
            ("index-enum", Frame::Field(f)) => self.codegen_mut(element)?.field_mut(f).index_enum = Some(value),
            ("is-destructor", Frame::VMethod(owner, index)) => {
                self.codegen_mut(element)?.type_def_mut(owner).vmethods[index].is_destructor = true;
            }
            ("inherits-from", _) => {
                let owner = self.owned_type(Some(frame), element)?;
                self.codegen_mut(element)?.type_def_mut(owner).inherits_from = Some(value);
            }
            ("original-name", _) => {
                let owner = self.owned_type(Some(frame), element)?;
                self.codegen_mut(element)?.type_def_mut(owner).original_name = Some(value);
            }
            ("is-union", _) => {
                let owner = self.owned_type(Some(frame), element)?;
                self.codegen_mut(element)?.type_def_mut(owner).is_union = value.eq_ignore_ascii_case("true");
            }
            ("os-type", Frame::SymbolTable(table)) => {
                self.symbols_mut(element)?.tables[table].os_type = Some(value);
            }
            ("offset", Frame::VTableAddress(table, index)) => {
                let offset = decode_number(name, &value)?;
                self.symbols_mut(element)?.tables[table].vtables[index].offset = Some(offset);
            }
            ("mangled", Frame::VTableAddress(table, index)) => {
                self.symbols_mut(element)?.tables[table].vtables[index].mangled = Some(value);
            }
            ("count" | "size" | "index-enum" | "is-destructor" | "os-type" | "offset" | "mangled", _) => {
                return Err(misplaced_attribute(name, element));
            }
            (other, _) => {
                if !IGNORED_ATTRIBUTES.contains(&other) {
                    warn!("Unhandled XML attribute name: {}", other);
                }
            }
        }
        Ok(())
    }

    fn apply_lowered_attribute(
        &mut self,
        frame: Frame,
        element: &str,
        name: &str,
        value: String,
    ) -> Result<(), DefinitionError> {
        match (name, frame) {
            ("meta", Frame::Field(f)) => self.codegen_mut(element)?.field_mut(f).meta = Meta::parse(&value),
            ("meta", Frame::Type(t)) => self.codegen_mut(element)?.type_def_mut(t).meta = Meta::parse(&value),
            ("subtype", Frame::Field(f)) => self.codegen_mut(element)?.field_mut(f).subtype = value,
            ("subtype", Frame::Type(t)) => self.codegen_mut(element)?.type_def_mut(t).subtype = value,
            ("typedef-name", _) => {
                let owner = self.owned_type(Some(frame), element)?;
                self.codegen_mut(element)?.type_def_mut(owner).type_name = Some(value);
            }
            ("anon-name", Frame::Field(f)) => self.codegen_mut(element)?.field_mut(f).anon_name = Some(value),
            ("anon-name", Frame::VMethod(owner, index)) => {
                self.codegen_mut(element)?.type_def_mut(owner).vmethods[index].anon_name = Some(value);
            }
            ("enum-size-forced", Frame::Field(f)) => self.codegen_mut(element)?.field_mut(f).force_enum_size = true,
            ("anon-compound", _) => {
                let owner = self.owned_type(Some(frame), element)?;
                self.codegen_mut(element)?.type_def_mut(owner).anon_compound = true;
            }
            ("meta" | "subtype" | "anon-name" | "enum-size-forced", _) => {
                return Err(misplaced_attribute(&format!("ld:{}", name), element));
            }
            (other, _) => {
                if !IGNORED_LD_ATTRIBUTES.contains(&other) {
                    warn!("Unhandled XML attribute name: ld:{}", other);
                }
            }
        }
        Ok(())
    }

    fn set_name(&mut self, frame: Frame, element: &str, value: String) -> Result<(), DefinitionError> {
        match frame {
            Frame::Field(f) => self.codegen_mut(element)?.field_mut(f).name = Some(value),
            Frame::VMethod(owner, index) => {
                self.codegen_mut(element)?.type_def_mut(owner).vmethods[index].name = Some(value)
            }
            Frame::EnumItem(owner, index) => {
                self.codegen_mut(element)?.type_def_mut(owner).enum_items[index].name = Some(value)
            }
            Frame::SymbolTable(table) => self.symbols_mut(element)?.tables[table].name = Some(value),
            Frame::VTableAddress(table, index) => {
                self.symbols_mut(element)?.tables[table].vtables[index].name = Some(value)
            }
            Frame::GlobalAddress(table, index) => {
                self.symbols_mut(element)?.tables[table].globals[index].name = Some(value)
            }
            _ => return Err(misplaced_attribute("name", element)),
        }
        Ok(())
    }

    fn set_value(&mut self, frame: Frame, element: &str, value: String) -> Result<(), DefinitionError> {
        if let Frame::Md5Hash(table) = frame {
            self.symbols_mut(element)?.tables[table].md5_hash = Some(value);
            return Ok(());
        }

        let number = decode_number("value", &value)?;
        match frame {
            Frame::BinaryTimestamp(table) => {
                self.symbols_mut(element)?.tables[table].binary_timestamp = Some(number as u64)
            }
            Frame::EnumItem(owner, index) => {
                self.codegen_mut(element)?.type_def_mut(owner).enum_items[index].value = Some(number)
            }
            Frame::VTableAddress(table, index) => {
                self.symbols_mut(element)?.tables[table].vtables[index].value = Some(number as u64)
            }
            Frame::GlobalAddress(table, index) => {
                self.symbols_mut(element)?.tables[table].globals[index].value = Some(number as u64)
            }
            _ => return Err(misplaced_attribute("value", element)),
        }
        Ok(())
    }

    /// The type that owns children of `frame`: the type itself, or the
    /// nested type of a field (created on first use).
    fn owned_type(&mut self, frame: Option<Frame>, element: &str) -> Result<TypeId, DefinitionError> {
        match frame {
            Some(Frame::Type(id)) => Ok(id),
            Some(Frame::Field(field)) => Ok(self.codegen_mut(element)?.owned_type(field)),
            _ => Err(missing_parent(element)),
        }
    }

    fn symbol_table_child(&self, top: Option<Frame>, element: &str) -> Result<usize, DefinitionError> {
        match top {
            Some(Frame::SymbolTable(table)) => Ok(table),
            _ => Err(missing_parent(element)),
        }
    }

    fn codegen_mut(&mut self, element: &str) -> Result<&mut CodeGen, DefinitionError> {
        self.codegen.as_mut().ok_or_else(|| missing_parent(element))
    }

    fn symbols_mut(&mut self, element: &str) -> Result<&mut Symbols, DefinitionError> {
        self.symbols.as_mut().ok_or_else(|| missing_parent(element))
    }
}

fn collect_attributes<R>(reader: &NsReader<R>, e: &BytesStart<'_>) -> Result<Vec<Attr>, DefinitionError> {
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.as_namespace_binding().is_some() {
            continue;
        }
        let (ns, local) = reader.resolve_attribute(attr.key);
        attrs.push(Attr {
            scope: Scope::resolve(ns),
            name: String::from_utf8_lossy(local.as_ref()).into_owned(),
            value: attr.unescape_value()?.into_owned(),
        });
    }
    Ok(attrs)
}

fn missing_parent(element: &str) -> DefinitionError {
    DefinitionError::Malformed(format!("<{}> appears outside of an element that can contain it", element))
}

fn misplaced_attribute(attribute: &str, element: &str) -> DefinitionError {
    DefinitionError::Malformed(format!("attribute {} is not valid on <{}>", attribute, element))
}

fn invalid_number(attribute: &str, value: &str) -> DefinitionError {
    DefinitionError::InvalidNumber {
        attribute: attribute.to_string(),
        value: value.to_string(),
    }
}

/// Decodes an integer literal: optional sign, then `0x`/`0X`/`#` hex,
/// leading-zero octal, or decimal. Magnitudes up to `u64::MAX` are accepted
/// so that high addresses survive the round trip through `i64`.
pub fn decode_number(attribute: &str, value: &str) -> Result<i64, DefinitionError> {
    let text = value.trim();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let (radix, digits) = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        (16, hex)
    } else if let Some(hex) = digits.strip_prefix('#') {
        (16, hex)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };

    if digits.is_empty() || digits.starts_with(['-', '+']) {
        return Err(invalid_number(attribute, value));
    }

    let magnitude = u64::from_str_radix(digits, radix).map_err(|_| invalid_number(attribute, value))?;
    let number = magnitude as i64;
    Ok(if negative { number.wrapping_neg() } else { number })
}

pub fn parse_codegen<R: BufRead>(source: R) -> Result<CodeGen, DefinitionError> {
    let mut parser = DefinitionParser::new();
    parser.parse(source)?;
    parser.codegen.ok_or(DefinitionError::MissingDocument("codegen"))
}

pub fn parse_symbols<R: BufRead>(source: R) -> Result<Symbols, DefinitionError> {
    let mut parser = DefinitionParser::new();
    parser.parse(source)?;
    parser.symbols.ok_or(DefinitionError::MissingDocument("symbols"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const CODEGEN: &str = r#"<?xml version="1.0"?>
<ld:data-definition xmlns:ld="http://github.com/peterix/dfhack/lowered-data-definition">
  <ld:global-type ld:meta="enum-type" type-name="job_type" base-type="int16_t">
    <enum-item name="A"/>
    <enum-item name="B" value="5"/>
    <enum-item/>
    <enum-attr name="caption" />
  </ld:global-type>
  <ld:global-type ld:meta="class-type" type-name="unit" original-name="creaturest" inherits-from="base">
    <ld:field ld:meta="number" ld:subtype="int32_t" name="id" size="4"/>
    <ld:field ld:meta="compound" ld:anon-name="status">
      <ld:field ld:meta="number" ld:subtype="bool" name="alive"/>
    </ld:field>
    <ld:field ld:meta="pointer" name="next" ref-target="unit">
      <ld:item ld:meta="global" type-name="unit"/>
    </ld:field>
    <virtual-methods>
      <vmethod is-destructor="true"/>
      <vmethod name="getName">
        <ld:field ld:meta="number" ld:subtype="int32_t" name="idx"/>
        <ret-type ld:meta="primitive" ld:subtype="stl-string"/>
      </vmethod>
      <vmethod ld:anon-name="anon_1"/>
    </virtual-methods>
    <code-helper name="describe">ignored text</code-helper>
  </ld:global-type>
  <ld:global-object name="world">
    <ld:item ld:meta="global" type-name="world"/>
  </ld:global-object>
</ld:data-definition>
"#;

    const SYMBOLS: &str = r#"<data-definition>
  <symbol-table name="v0.47.05 linux64" os-type="linux">
    <md5-hash value="ABCDEF"/>
    <global-address name="world" value="0x1e7ef38"/>
    <vtable-address name="unit" mangled="_ZTV4unit" offset="0x10"/>
  </symbol-table>
  <symbol-table name="v0.47.05 win64" os-type="windows">
    <binary-timestamp value="0x5e3dc7b0"/>
    <vtable-address name="unit" value="0x141a2b3c0"/>
  </symbol-table>
</data-definition>
"#;

    #[test]
    fn test_parse_codegen_types() {
        let codegen = parse_codegen(CODEGEN.as_bytes()).unwrap();
        assert_eq!(codegen.type_count(), 2);

        let (_, job) = codegen.types().next().unwrap();
        assert_eq!(job.meta, Meta::EnumType);
        assert_eq!(job.base_type.as_deref(), Some("int16_t"));
        assert_eq!(job.enum_items.len(), 3);
        assert_eq!(job.enum_items[1].value, Some(5));
        assert_eq!(job.enum_items[2].name, None);

        let (_, unit) = codegen.types().nth(1).unwrap();
        assert_eq!(unit.original_name.as_deref(), Some("creaturest"));
        assert_eq!(unit.inherits_from.as_deref(), Some("base"));
        assert_eq!(unit.fields.len(), 3);
        assert_eq!(unit.vmethods.len(), 3);
        assert!(unit.vmethods[0].is_destructor);
        assert_eq!(unit.vmethods[1].arguments.len(), 1);
        assert!(unit.vmethods[1].return_type.is_some());
        assert_eq!(unit.vmethods[2].anon_name.as_deref(), Some("anon_1"));

        let status = codegen.field(unit.fields[1]);
        assert_eq!(status.anon_name.as_deref(), Some("status"));
        let nested = codegen.type_def(status.owned_type.unwrap());
        assert_eq!(nested.fields.len(), 1);

        let next = codegen.field(unit.fields[2]);
        let item = codegen.field(next.item.unwrap());
        assert_eq!(item.meta, Meta::Global);
        assert_eq!(item.type_name.as_deref(), Some("unit"));

        assert_eq!(codegen.globals().len(), 1);
    }

    #[test]
    fn test_parse_symbol_tables() {
        let symbols = parse_symbols(SYMBOLS.as_bytes()).unwrap();
        assert_eq!(symbols.tables.len(), 2);

        let linux = &symbols.tables[0];
        assert_eq!(linux.md5_hash.as_deref(), Some("ABCDEF"));
        assert_eq!(linux.binary_timestamp, None);
        assert_eq!(linux.os_type.as_deref(), Some("linux"));
        assert_eq!(linux.globals[0].value, Some(0x1e7ef38));
        assert_eq!(linux.vtables[0].mangled.as_deref(), Some("_ZTV4unit"));
        assert_eq!(linux.vtables[0].offset, Some(0x10));
        assert_eq!(linux.vtables[0].value, None);

        let windows = &symbols.tables[1];
        assert_eq!(windows.binary_timestamp, Some(0x5e3dc7b0));
        assert_eq!(windows.vtables[0].value, Some(0x141a2b3c0));
    }

    #[test]
    fn test_unknown_elements_are_opaque() {
        let xml = r#"<ld:data-definition xmlns:ld="http://github.com/peterix/dfhack/lowered-data-definition">
  <ld:global-type ld:meta="struct-type" type-name="a" ld:brand-new="x" whatever="y">
    <future-thing name="x"><ld:field name="hidden"/></future-thing>
    <ld:field ld:meta="number" ld:subtype="int8_t" name="kept"/>
  </ld:global-type>
</ld:data-definition>"#;
        let codegen = parse_codegen(xml.as_bytes()).unwrap();
        let (_, a) = codegen.types().next().unwrap();
        assert_eq!(a.fields.len(), 1);
        assert_eq!(codegen.field(a.fields[0]).name.as_deref(), Some("kept"));
    }

    #[test]
    fn test_name_without_named_element_is_malformed() {
        let xml = r#"<data-definition name="oops"/>"#;
        let err = parse_symbols(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, DefinitionError::Malformed(_)));
    }

    #[test]
    fn test_field_outside_type_is_malformed() {
        let xml = r#"<ld:data-definition xmlns:ld="http://github.com/peterix/dfhack/lowered-data-definition">
  <ld:field name="stray"/>
</ld:data-definition>"#;
        assert!(matches!(
            parse_codegen(xml.as_bytes()),
            Err(DefinitionError::Malformed(_))
        ));
    }

    #[test]
    fn test_missing_document() {
        assert!(matches!(
            parse_codegen(SYMBOLS.as_bytes()),
            Err(DefinitionError::MissingDocument("codegen"))
        ));
    }

    #[test]
    fn test_decode_number() {
        assert_eq!(decode_number("v", "42").unwrap(), 42);
        assert_eq!(decode_number("v", "-7").unwrap(), -7);
        assert_eq!(decode_number("v", "0x1F").unwrap(), 31);
        assert_eq!(decode_number("v", "#ff").unwrap(), 255);
        assert_eq!(decode_number("v", "010").unwrap(), 8);
        assert_eq!(decode_number("v", "0").unwrap(), 0);
        assert_eq!(decode_number("v", "0xffffffffffffffff").unwrap(), -1);
        assert!(decode_number("v", "0x").is_err());
        assert!(decode_number("v", "12z").is_err());
        assert!(decode_number("v", "--1").is_err());
    }
}
