// Tue Oct 13 2026 - Alex

use crate::abi::{AbiProfile, StdTypes};
use crate::config::ImportConfig;
use crate::definition::{parse_codegen, parse_symbols};
use crate::engine::TaskMonitor;
use crate::error::ImportError;
use crate::graph::Preprocessor;
use crate::labeler::{AddressLabeler, LabelSummary};
use crate::layout::{Categories, CompileOptions, TypeCompiler, TypeRegistry};
use crate::program::Program;
use crate::symbol::{BinaryFingerprint, SymbolTableSelector};
use log::info;
use serde::Serialize;
use std::io::BufRead;

#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub symbol_table: String,
    pub abi: String,
    pub erased: usize,
    pub types_defined: usize,
    pub types_created: usize,
    pub labels: LabelSummary,
}

/// Runs one import: definitions in, types and labels out. Nothing is rolled
/// back when a step fails; whatever was created until then stays.
pub struct Importer {
    config: ImportConfig,
    monitor: TaskMonitor,
}

impl Importer {
    pub fn new(config: ImportConfig) -> Self {
        let monitor = TaskMonitor::new().with_progress_bar(config.show_progress);
        Self { config, monitor }
    }

    pub fn with_monitor(mut self, monitor: TaskMonitor) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    pub fn monitor(&self) -> &TaskMonitor {
        &self.monitor
    }

    /// An empty registry laid out for `program`'s ABI.
    pub fn registry_for(program: &dyn Program) -> Result<TypeRegistry, ImportError> {
        let abi = AbiProfile::resolve(&program.executable_format(), program.pointer_size())?;
        Ok(TypeRegistry::new(abi.organization()))
    }

    pub fn run<C: BufRead, S: BufRead>(
        &self,
        program: &mut dyn Program,
        registry: &mut TypeRegistry,
        codegen_xml: C,
        symbols_xml: S,
    ) -> Result<ImportSummary, ImportError> {
        self.config.validate().map_err(ImportError::Config)?;
        let abi = AbiProfile::resolve(&program.executable_format(), program.pointer_size())?;
        if registry.organization() != abi.organization() {
            return Err(ImportError::Config(format!(
                "type registry is laid out for {}-byte pointers, program uses {}",
                registry.pointer_size(),
                abi.pointer_size
            )));
        }

        self.step("Parsing codegen.out.xml...")?;
        let mut codegen = parse_codegen(codegen_xml)?;
        self.step("Parsing symbols.xml...")?;
        let symbols = parse_symbols(symbols_xml)?;

        let fingerprint = BinaryFingerprint::from_program(program);
        let table = SymbolTableSelector::select(&symbols, &fingerprint)?;

        let mut summary = ImportSummary {
            symbol_table: table.display_name().to_string(),
            abi: abi.to_string(),
            ..ImportSummary::default()
        };

        let categories = Categories::new(&self.config.root_category);
        if self.config.erase_existing {
            self.step("erasing existing data types...")?;
            summary.erased = registry.remove_category(&categories.root);
        }

        self.step("creating stdlib types...")?;
        let std = StdTypes::create(registry, &abi, &categories);
        let std_types = registry.len();

        self.step("Preprocessing types...")?;
        let index = Preprocessor::run(&mut codegen)?;
        summary.types_defined = codegen.type_count();

        self.step("Creating data types...")?;
        let options = CompileOptions {
            polymorphic_pointers: self.config.polymorphic_pointers,
        };
        let mut compiler = TypeCompiler::new(&codegen, &index, registry, &abi, &std, &categories).with_options(options);
        self.monitor.initialize(codegen.type_count() as u64);
        for (i, &id) in codegen.type_list().iter().enumerate() {
            self.monitor.check_cancelled()?;
            compiler.compile_type(id)?;
            self.monitor.set_progress(i as u64 + 1);
        }

        let mut labeler = AddressLabeler::new(program, &self.monitor, root_namespace(&categories));
        if self.config.label_vtables {
            labeler.label_vtables(table, compiler.registry(), &categories)?;
        }
        if self.config.label_globals {
            labeler.label_globals(table, &mut compiler)?;
        }
        summary.labels = labeler.into_summary();
        summary.types_created = compiler.registry().len().saturating_sub(std_types);
        self.monitor.finish();

        info!(
            "imported {} types ({} registry entries), labelled {} vtables and {} globals",
            summary.types_defined,
            summary.types_created,
            summary.labels.vtables,
            summary.labels.globals
        );
        Ok(summary)
    }

    fn step(&self, message: &str) -> Result<(), ImportError> {
        self.monitor.check_cancelled()?;
        self.monitor.initialize(0);
        self.monitor.set_message(message);
        Ok(())
    }
}

/// Class namespaces live under a namespace named after the root category.
fn root_namespace(categories: &Categories) -> &str {
    categories.root.rsplit('/').next().unwrap_or(&categories.root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::ExecutableFormat;
    use crate::layout::{DataType, EnumType, TypePath};
    use crate::program::{Address, InMemoryProgram, SourceType};

    const CODEGEN: &str = r#"<?xml version="1.0"?>
<ld:data-definition xmlns:ld="http://github.com/peterix/dfhack/lowered-data-definition">
  <ld:global-type ld:meta="struct-type" type-name="Point">
    <ld:field ld:meta="number" ld:subtype="int32_t" name="x"/>
    <ld:field ld:meta="number" ld:subtype="int32_t" name="y"/>
  </ld:global-type>
  <ld:global-type ld:meta="class-type" type-name="Shape">
    <virtual-methods>
      <vmethod name="area"><ret-type ld:meta="number" ld:subtype="s-float"/></vmethod>
    </virtual-methods>
  </ld:global-type>
  <ld:global-type ld:meta="class-type" type-name="Shape2" inherits-from="Shape">
    <virtual-methods>
      <vmethod name="area"><ret-type ld:meta="number" ld:subtype="s-float"/></vmethod>
    </virtual-methods>
  </ld:global-type>
  <ld:global-object name="cursor">
    <ld:item ld:meta="global" type-name="Point"/>
  </ld:global-object>
</ld:data-definition>
"#;

    const SYMBOLS: &str = r#"<data-definition>
  <symbol-table name="other build" os-type="linux">
    <md5-hash value="ffff"/>
  </symbol-table>
  <symbol-table name="test build" os-type="linux">
    <md5-hash value="ABCD"/>
    <vtable-address name="Shape2" value="0x1000"/>
    <global-address name="cursor" value="0x1040"/>
  </symbol-table>
</data-definition>
"#;

    fn program() -> InMemoryProgram {
        let mut program = InMemoryProgram::new(ExecutableFormat::Elf, 8)
            .with_segment(Address::new(0x1000), vec![0u8; 0x100])
            .with_md5("abcd");
        program.write_pointer(Address::new(0x1000), Address::new(0x1080)).unwrap();
        program.write_pointer(Address::new(0x1008), Address::new(0x1090)).unwrap();
        program
    }

    fn quiet() -> ImportConfig {
        ImportConfig::default().with_progress(false)
    }

    #[test]
    fn test_end_to_end_import() {
        let mut program = program();
        let mut registry = Importer::registry_for(&program).unwrap();
        let summary = Importer::new(quiet())
            .run(&mut program, &mut registry, CODEGEN.as_bytes(), SYMBOLS.as_bytes())
            .unwrap();

        assert_eq!(summary.symbol_table, "test build");
        assert_eq!(summary.types_defined, 3);

        let shape2 = registry.composite(&TypePath::new("df", "Shape2")).unwrap();
        assert_eq!(shape2.length(), 8);
        assert_eq!(shape2.components().len(), 1);

        let vtable = registry.composite(&TypePath::new("df/vtables", "vtable_Shape2")).unwrap();
        let slots: Vec<_> = vtable.components().iter().map(|c| c.name.as_deref().unwrap_or("")).collect();
        assert_eq!(slots, vec!["_super", "area"]);
        assert_eq!(vtable.length(), 16);
        let parent = registry.composite(&TypePath::new("df/vtables", "vtable_Shape")).unwrap();
        assert_eq!(parent.components().len(), 1);

        assert!(program
            .labels_at(Address::new(0x1000))
            .iter()
            .any(|l| l.name == "vtable_Shape2" && l.primary));
        for addr in [0x1080, 0x1090] {
            let function = program.function_at(Address::new(addr)).unwrap();
            assert_eq!(function.name, "area");
            assert_eq!(function.namespace.path(), "df::Shape2");
            assert_eq!(function.signature_source, SourceType::Imported);
        }
        assert_eq!(summary.labels.functions.len(), 2);

        assert_eq!(program.data_at(Address::new(0x1040)).unwrap().data_type, "Point");
        assert_eq!(summary.labels.globals, 1);
    }

    #[test]
    fn test_no_matching_table_leaves_registry_untouched() {
        let mut program = program().with_md5("0000");
        let mut registry = Importer::registry_for(&program).unwrap();
        registry.put("df", EnumType::new("leftover", 4));

        let result = Importer::new(quiet()).run(&mut program, &mut registry, CODEGEN.as_bytes(), SYMBOLS.as_bytes());
        assert!(matches!(result, Err(ImportError::Symbol(_))));
        assert!(registry.contains("df", "leftover"));
        assert_eq!(program.labels().count(), 0);
    }

    #[test]
    fn test_existing_root_is_erased() {
        let mut program = program();
        let mut registry = Importer::registry_for(&program).unwrap();
        registry.put("df", EnumType::new("leftover", 4));
        registry.put("df/old", EnumType::new("stale", 4));
        registry.put("other", EnumType::new("kept", 4));

        let summary = Importer::new(quiet())
            .run(&mut program, &mut registry, CODEGEN.as_bytes(), SYMBOLS.as_bytes())
            .unwrap();
        assert_eq!(summary.erased, 2);
        assert!(!registry.contains("df", "leftover"));
        assert!(!registry.has_category("df/old"));
        assert!(registry.contains("other", "kept"));
    }

    #[test]
    fn test_label_steps_can_be_disabled() {
        let mut program = program();
        let mut registry = Importer::registry_for(&program).unwrap();
        let config = quiet().with_labels(false, false);

        let summary = Importer::new(config)
            .run(&mut program, &mut registry, CODEGEN.as_bytes(), SYMBOLS.as_bytes())
            .unwrap();
        assert_eq!(summary.labels.vtables, 0);
        assert_eq!(program.labels().count(), 0);
        assert!(registry.contains("df", "Point"));
    }

    #[test]
    fn test_cancelled_import_stops_before_types() {
        let mut program = program();
        let mut registry = Importer::registry_for(&program).unwrap();
        let importer = Importer::new(quiet());
        importer.monitor().cancel();

        let result = importer.run(&mut program, &mut registry, CODEGEN.as_bytes(), SYMBOLS.as_bytes());
        assert!(matches!(result, Err(ImportError::Cancelled)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_registry_must_match_program() {
        let mut program = program();
        let mut registry = TypeRegistry::new(crate::layout::DataOrganization::new(4, 4));
        let result = Importer::new(quiet()).run(&mut program, &mut registry, CODEGEN.as_bytes(), SYMBOLS.as_bytes());
        assert!(matches!(result, Err(ImportError::Config(_))));
    }

    #[test]
    fn test_pe_programs_use_msvc_layouts() {
        let mut program = InMemoryProgram::new(ExecutableFormat::Pe, 8).with_md5("abcd");
        let mut registry = Importer::registry_for(&program).unwrap();
        let summary = Importer::new(quiet().with_labels(false, false))
            .run(&mut program, &mut registry, CODEGEN.as_bytes(), SYMBOLS.as_bytes())
            .unwrap();
        assert!(summary.abi.starts_with("MSVC 64-bit"));
        let string = DataType::named(TypePath::new("df/std", "string"));
        assert_eq!(registry.size_of(&string), Some(32));
    }
}
