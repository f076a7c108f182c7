// Tue Oct 13 2026 - Alex

use crate::abi::ExecutableFormat;
use crate::layout::DataType;
use crate::program::{
    Address, AddressRange, CodeUnit, FunctionRecord, FunctionUpdate, Namespace, NamespaceKind, Program,
    ProgramError, SourceType,
};
use crate::symbol::fingerprint::md5_hex;
use goblin::elf::program_header::PT_LOAD;
use goblin::mach::Mach;
use goblin::Object;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Segment {
    pub name: String,
    pub start: Address,
    pub bytes: Vec<u8>,
}

impl Segment {
    pub fn range(&self) -> AddressRange {
        AddressRange::new(self.start, self.bytes.len() as u64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataRecord {
    pub range: AddressRange,
    pub data_type: String,
    pub defined: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelRecord {
    pub address: Address,
    pub name: String,
    pub namespace: Namespace,
    pub primary: bool,
    pub source: SourceType,
}

/// A self-contained analysis host: program memory loaded from an image (or
/// assembled by hand), plus the listing, labels, namespaces and functions the
/// importer writes.
#[derive(Debug, Clone)]
pub struct InMemoryProgram {
    format: ExecutableFormat,
    pointer_size: usize,
    md5: Option<String>,
    timestamp: Option<u32>,
    segments: Vec<Segment>,
    image_symbols: HashMap<String, Vec<Address>>,
    listing: BTreeMap<Address, DataRecord>,
    labels: BTreeMap<Address, Vec<LabelRecord>>,
    namespaces: BTreeMap<Namespace, NamespaceKind>,
    functions: BTreeMap<Address, FunctionRecord>,
}

impl InMemoryProgram {
    pub fn new(format: ExecutableFormat, pointer_size: usize) -> Self {
        Self {
            format,
            pointer_size,
            md5: None,
            timestamp: None,
            segments: Vec::new(),
            image_symbols: HashMap::new(),
            listing: BTreeMap::new(),
            labels: BTreeMap::new(),
            namespaces: BTreeMap::new(),
            functions: BTreeMap::new(),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ProgramError> {
        let mut file = File::open(path.as_ref())?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        Self::from_image(&data)
    }

    pub fn from_image(data: &[u8]) -> Result<Self, ProgramError> {
        let object = Object::parse(data).map_err(|e| ProgramError::BinaryParseError(e.to_string()))?;

        let mut program = match object {
            Object::Elf(elf) => {
                let mut program = Self::new(ExecutableFormat::Elf, if elf.is_64 { 8 } else { 4 });
                for (index, header) in elf.program_headers.iter().enumerate() {
                    if header.p_type != PT_LOAD {
                        continue;
                    }
                    let bytes = file_slice(data, header.p_offset, header.p_filesz);
                    program.add_segment(&format!("LOAD{}", index), Address::new(header.p_vaddr), bytes);
                }
                for sym in elf.syms.iter() {
                    if sym.st_value == 0 {
                        continue;
                    }
                    if let Some(name) = elf.strtab.get_at(sym.st_name) {
                        program.add_image_symbol(name, Address::new(sym.st_value));
                    }
                }
                for sym in elf.dynsyms.iter() {
                    if sym.st_value == 0 {
                        continue;
                    }
                    if let Some(name) = elf.dynstrtab.get_at(sym.st_name) {
                        program.add_image_symbol(name, Address::new(sym.st_value));
                    }
                }
                program
            }
            Object::PE(pe) => {
                let mut program = Self::new(ExecutableFormat::Pe, if pe.is_64 { 8 } else { 4 });
                let image_base = pe.image_base as u64;
                for section in &pe.sections {
                    let name = section.name().unwrap_or("").to_string();
                    let bytes = file_slice(
                        data,
                        section.pointer_to_raw_data as u64,
                        section.size_of_raw_data as u64,
                    );
                    program.add_segment(&name, Address::new(image_base + section.virtual_address as u64), bytes);
                }
                for export in &pe.exports {
                    if let Some(name) = export.name {
                        program.add_image_symbol(name, Address::new(image_base + export.rva as u64));
                    }
                }
                program.timestamp = Some(pe.header.coff_header.time_date_stamp);
                program
            }
            Object::Mach(Mach::Binary(macho)) => {
                let mut program = Self::new(ExecutableFormat::MachO, if macho.is_64 { 8 } else { 4 });
                for segment in &macho.segments {
                    let name = std::str::from_utf8(&segment.segname)
                        .unwrap_or("")
                        .trim_end_matches('\0')
                        .to_string();
                    let bytes = file_slice(data, segment.fileoff, segment.filesize);
                    program.add_segment(&name, Address::new(segment.vmaddr), bytes);
                }
                for (name, nlist) in macho.symbols().flatten() {
                    if nlist.n_value != 0 {
                        program.add_image_symbol(name, Address::new(nlist.n_value));
                    }
                }
                program
            }
            Object::Mach(Mach::Fat(_)) => {
                return Err(ProgramError::UnsupportedFormat("fat Mach-O binaries".to_string()))
            }
            _ => return Err(ProgramError::UnsupportedFormat("unrecognized object file".to_string())),
        };

        program.md5 = Some(md5_hex(data));
        Ok(program)
    }

    pub fn with_segment(mut self, start: Address, bytes: Vec<u8>) -> Self {
        let name = format!("seg_{:x}", start.as_u64());
        self.add_segment(&name, start, bytes);
        self
    }

    pub fn with_md5(mut self, md5: &str) -> Self {
        self.md5 = Some(md5.to_string());
        self
    }

    pub fn with_timestamp(mut self, timestamp: u32) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_symbol(mut self, name: &str, addr: Address) -> Self {
        self.add_image_symbol(name, addr);
        self
    }

    /// Seeds listing data, e.g. an undefined placeholder left by auto-analysis.
    pub fn with_data(mut self, addr: Address, length: u64, data_type: &str, defined: bool) -> Self {
        self.listing.insert(
            addr,
            DataRecord {
                range: AddressRange::new(addr, length),
                data_type: data_type.to_string(),
                defined,
            },
        );
        self
    }

    pub fn with_function(mut self, addr: Address, name: &str, source: SourceType) -> Self {
        self.functions.insert(addr, new_function(addr, name, source));
        self
    }

    pub fn add_segment(&mut self, name: &str, start: Address, bytes: Vec<u8>) {
        self.segments.push(Segment {
            name: name.to_string(),
            start,
            bytes,
        });
    }

    pub fn add_image_symbol(&mut self, name: &str, addr: Address) {
        self.image_symbols.entry(name.to_string()).or_default().push(addr);
    }

    pub fn write_pointer(&mut self, addr: Address, value: Address) -> Result<(), ProgramError> {
        let size = self.pointer_size;
        let bytes = value.as_u64().to_le_bytes();
        let (segment, offset) = self.locate_mut(addr, size as u64)?;
        segment.bytes[offset..offset + size].copy_from_slice(&bytes[..size]);
        Ok(())
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn listing(&self) -> impl Iterator<Item = &DataRecord> {
        self.listing.values()
    }

    pub fn data_at(&self, addr: Address) -> Option<&DataRecord> {
        self.listing.get(&addr)
    }

    pub fn labels(&self) -> impl Iterator<Item = &LabelRecord> {
        self.labels.values().flatten()
    }

    pub fn labels_at(&self, addr: Address) -> &[LabelRecord] {
        self.labels.get(&addr).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionRecord> {
        self.functions.values()
    }

    pub fn namespaces(&self) -> impl Iterator<Item = (&Namespace, &NamespaceKind)> {
        self.namespaces.iter()
    }

    fn locate(&self, addr: Address, len: u64) -> Result<(&Segment, usize), ProgramError> {
        self.segments
            .iter()
            .find(|s| s.range().contains(addr) && s.range().contains(addr + (len.max(1) - 1)))
            .map(|s| (s, (addr - s.start) as usize))
            .ok_or(ProgramError::NoMemory(addr.as_u64()))
    }

    fn locate_mut(&mut self, addr: Address, len: u64) -> Result<(&mut Segment, usize), ProgramError> {
        self.segments
            .iter_mut()
            .find(|s| s.range().contains(addr) && s.range().contains(addr + (len.max(1) - 1)))
            .map(|s| {
                let offset = (addr - s.start) as usize;
                (s, offset)
            })
            .ok_or(ProgramError::NoMemory(addr.as_u64()))
    }

    fn overlapping(&self, range: AddressRange) -> impl Iterator<Item = &DataRecord> {
        self.listing
            .range(..range.end())
            .map(|(_, record)| record)
            .filter(move |record| record.range.overlaps(&range))
    }
}

impl Program for InMemoryProgram {
    fn executable_format(&self) -> ExecutableFormat {
        self.format.clone()
    }

    fn pointer_size(&self) -> usize {
        self.pointer_size
    }

    fn executable_md5(&self) -> Option<String> {
        self.md5.clone()
    }

    fn link_timestamp(&self) -> Option<u32> {
        self.timestamp
    }

    fn read_pointer(&self, addr: Address) -> Result<Address, ProgramError> {
        let size = self.pointer_size;
        let (segment, offset) = self.locate(addr, size as u64)?;
        let raw = segment
            .bytes
            .get(offset..offset + size)
            .ok_or(ProgramError::ReadFailed(addr.as_u64()))?;
        let mut bytes = [0u8; 8];
        bytes[..size].copy_from_slice(raw);
        Ok(Address::new(u64::from_le_bytes(bytes)))
    }

    fn code_units(&self, range: AddressRange) -> Vec<CodeUnit> {
        self.overlapping(range)
            .map(|record| CodeUnit {
                range: record.range,
                data_type: record.data_type.clone(),
                defined: record.defined,
            })
            .collect()
    }

    fn clear_code_units(&mut self, range: AddressRange) {
        let doomed: Vec<Address> = self
            .overlapping(range)
            .map(|record| record.range.start())
            .collect();
        for addr in doomed {
            self.listing.remove(&addr);
        }
    }

    fn create_data(&mut self, addr: Address, data_type: &DataType, length: u64) -> Result<(), ProgramError> {
        let range = AddressRange::new(addr, length);
        self.locate(addr, length)?;
        if let Some(existing) = self.overlapping(range).next() {
            return Err(ProgramError::DataConflict {
                address: addr.as_u64(),
                existing: existing.data_type.clone(),
            });
        }
        self.listing.insert(
            addr,
            DataRecord {
                range,
                data_type: data_type.display_name(),
                defined: true,
            },
        );
        Ok(())
    }

    fn symbols_at(&self, addr: Address) -> Vec<String> {
        let mut names: Vec<String> = self.labels_at(addr).iter().map(|l| l.name.clone()).collect();
        for (name, addrs) in &self.image_symbols {
            if addrs.contains(&addr) {
                names.push(name.clone());
            }
        }
        names
    }

    fn global_symbols(&self, name: &str) -> Vec<Address> {
        let mut found = self.image_symbols.get(name).cloned().unwrap_or_default();
        for label in self.labels() {
            if label.name == name && label.namespace.is_global() && !found.contains(&label.address) {
                found.push(label.address);
            }
        }
        found
    }

    fn create_label(
        &mut self,
        addr: Address,
        name: &str,
        namespace: &Namespace,
        primary: bool,
        source: SourceType,
    ) -> Result<(), ProgramError> {
        let labels = self.labels.entry(addr).or_default();
        if primary {
            for label in labels.iter_mut() {
                label.primary = false;
            }
        }
        if let Some(existing) = labels
            .iter_mut()
            .find(|l| l.name == name && &l.namespace == namespace)
        {
            existing.primary = existing.primary || primary;
            existing.source = existing.source.max(source);
            return Ok(());
        }
        labels.push(LabelRecord {
            address: addr,
            name: name.to_string(),
            namespace: namespace.clone(),
            primary,
            source,
        });
        Ok(())
    }

    fn get_or_create_namespace(&mut self, parent: &Namespace, name: &str, kind: NamespaceKind) -> Namespace {
        let namespace = parent.child(name);
        self.namespaces.entry(namespace.clone()).or_insert(kind);
        namespace
    }

    fn create_function(&mut self, addr: Address, name: &str, source: SourceType) -> Result<(), ProgramError> {
        if self.functions.contains_key(&addr) {
            return Err(ProgramError::FunctionExists(addr.as_u64()));
        }
        self.locate(addr, 1)?;
        self.functions.insert(addr, new_function(addr, name, source));
        Ok(())
    }

    fn function_at(&self, addr: Address) -> Option<FunctionRecord> {
        self.functions.get(&addr).cloned()
    }

    fn update_function(&mut self, addr: Address, update: FunctionUpdate) -> Result<(), ProgramError> {
        let function = self
            .functions
            .get_mut(&addr)
            .ok_or(ProgramError::FunctionNotFound(addr.as_u64()))?;
        function.name = update.name;
        function.namespace = update.namespace;
        function.calling_convention = Some(update.calling_convention);
        function.return_type = update.return_type;
        function.parameters = update.parameters;
        function.signature_source = update.source;
        Ok(())
    }
}

fn new_function(addr: Address, name: &str, source: SourceType) -> FunctionRecord {
    FunctionRecord {
        address: addr,
        name: name.to_string(),
        namespace: Namespace::global(),
        calling_convention: None,
        return_type: None,
        parameters: Vec::new(),
        signature_source: source,
    }
}

fn file_slice(data: &[u8], offset: u64, size: u64) -> Vec<u8> {
    let start = (offset as usize).min(data.len());
    let end = (offset.saturating_add(size) as usize).min(data.len());
    data[start..end].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program() -> InMemoryProgram {
        InMemoryProgram::new(ExecutableFormat::Elf, 8).with_segment(Address::new(0x1000), vec![0u8; 0x100])
    }

    #[test]
    fn test_pointer_round_trip() {
        let mut program = program();
        program.write_pointer(Address::new(0x1008), Address::new(0xdead_beef)).unwrap();
        assert_eq!(program.read_pointer(Address::new(0x1008)).unwrap(), Address::new(0xdead_beef));
        assert!(program.read_pointer(Address::new(0x10fc)).is_err());
    }

    #[test]
    fn test_create_data_conflicts_with_existing() {
        let mut program = program().with_data(Address::new(0x1010), 4, "int", true);

        let err = program
            .create_data(Address::new(0x100c), &DataType::Default, 8)
            .unwrap_err();
        assert!(matches!(err, ProgramError::DataConflict { .. }));

        program.clear_code_units(AddressRange::new(Address::new(0x1010), 1));
        assert!(program.create_data(Address::new(0x100c), &DataType::Default, 8).is_ok());
    }

    #[test]
    fn test_primary_label_demotes_previous() {
        let mut program = program();
        let global = Namespace::global();
        program.create_label(Address::new(0x1000), "a", &global, true, SourceType::Imported).unwrap();
        program.create_label(Address::new(0x1000), "b", &global, true, SourceType::Imported).unwrap();

        let labels = program.labels_at(Address::new(0x1000));
        assert_eq!(labels.len(), 2);
        assert!(!labels[0].primary);
        assert!(labels[1].primary);
        assert_eq!(program.global_symbols("b"), vec![Address::new(0x1000)]);
    }

    #[test]
    fn test_create_function_twice_fails() {
        let mut program = program();
        program.create_function(Address::new(0x1020), "f", SourceType::Imported).unwrap();
        assert!(matches!(
            program.create_function(Address::new(0x1020), "g", SourceType::Imported),
            Err(ProgramError::FunctionExists(0x1020))
        ));
    }
}
