// Tue Oct 13 2026 - Alex

use crate::definition::SymbolTable;
use crate::engine::TaskMonitor;
use crate::error::ImportError;
use crate::labeler::{LabelSummary, PlacedLabel, RecoveredFunction};
use crate::layout::{
    CallingConvention, Categories, Composite, DataType, FunctionDef, LayoutError, TypeCompiler, TypePath,
    TypeRegistry,
};
use crate::program::{Address, AddressRange, FunctionUpdate, Namespace, NamespaceKind, Program, SourceType};
use log::{debug, error, info, warn};
use std::collections::HashMap;

/// Applies compiled layouts at the addresses of the selected symbol table
/// and recovers the functions each vtable points at.
pub struct AddressLabeler<'p> {
    program: &'p mut dyn Program,
    monitor: &'p TaskMonitor,
    root_namespace: String,
    summary: LabelSummary,
}

impl<'p> AddressLabeler<'p> {
    pub fn new(program: &'p mut dyn Program, monitor: &'p TaskMonitor, root_namespace: &str) -> Self {
        Self {
            program,
            monitor,
            root_namespace: root_namespace.to_string(),
            summary: LabelSummary::default(),
        }
    }

    pub fn summary(&self) -> &LabelSummary {
        &self.summary
    }

    pub fn into_summary(self) -> LabelSummary {
        self.summary
    }

    pub fn label_vtables(
        &mut self,
        table: &SymbolTable,
        registry: &TypeRegistry,
        categories: &Categories,
    ) -> Result<usize, ImportError> {
        self.monitor.set_message("Labelling vtables...");
        self.monitor.initialize(table.vtables.len() as u64);

        let root = self
            .program
            .get_or_create_namespace(&Namespace::global(), &self.root_namespace, NamespaceKind::Namespace);

        let mut labeled = 0;
        for (i, vtable) in table.vtables.iter().enumerate() {
            self.monitor.check_cancelled()?;
            self.monitor.set_progress(i as u64);

            let Some(class_name) = vtable.name.as_deref() else {
                continue;
            };
            let vtable_name = format!("vtable_{}", class_name);
            let path = TypePath::new(&categories.vtables, &vtable_name);
            let Some(layout) = registry.composite(&path) else {
                debug!("no vtable layout for {}", class_name);
                continue;
            };

            let class = self.program.get_or_create_namespace(&root, class_name, NamespaceKind::Class);
            let offset = vtable.offset.unwrap_or(0);

            let mut targets = Vec::new();
            if let Some(value) = vtable.value {
                targets.push(Address::new(value).offset(offset));
            }
            if let Some(mangled) = vtable.mangled.as_deref() {
                let found = self.program.global_symbols(mangled);
                if found.is_empty() {
                    debug!("mangled vtable symbol {} not found", mangled);
                }
                targets.extend(found.into_iter().map(|addr| addr.offset(offset)));
            }

            let data_type = DataType::named(path.clone());
            for addr in targets {
                self.label_data(addr, &data_type, &vtable_name, 0, registry);
                self.label_vmethods(addr, &class, layout, registry);
                labeled += 1;
            }
        }

        self.summary.vtables += labeled;
        Ok(labeled)
    }

    /// Labels each global object that has an address in `table`. Global
    /// types are resolved through `compiler`, which may still create
    /// container layouts on the way.
    pub fn label_globals(&mut self, table: &SymbolTable, compiler: &mut TypeCompiler<'_>) -> Result<usize, ImportError> {
        let codegen = compiler.codegen;
        self.monitor.set_message("Labelling globals...");
        self.monitor.initialize(codegen.globals().len() as u64);

        let addresses: HashMap<&str, Address> = table
            .globals
            .iter()
            .filter_map(|g| Some((g.name.as_deref()?, Address::new(g.value?))))
            .collect();

        let mut labeled = 0;
        for (i, &object) in codegen.globals().iter().enumerate() {
            self.monitor.check_cancelled()?;
            self.monitor.set_progress(i as u64);

            let field = codegen.field(object);
            let Some(name) = field.name.as_deref() else {
                continue;
            };
            let Some(&addr) = addresses.get(name) else {
                continue;
            };

            let item = field.item.ok_or_else(|| LayoutError::MissingItem(name.to_string()))?;
            let data_type = compiler.resolve_field(item)?;
            let size = codegen.field(item).size;
            self.label_data(addr, &data_type, name, size, compiler.registry());
            labeled += 1;
        }

        self.summary.globals += labeled;
        Ok(labeled)
    }

    /// Places `data_type` at `addr` and gives it a primary label. Undefined
    /// placeholders in the way are cleared; anything else is reported and
    /// left alone.
    pub fn label_data(&mut self, addr: Address, data_type: &DataType, name: &str, size: usize, registry: &TypeRegistry) {
        let category = data_type.path().map(TypePath::category_name).unwrap_or_default();
        info!("labelling {} as {} ({}::{})", addr, name, category, data_type.display_name());

        let length = registry.size_of(data_type).unwrap_or(size).max(1) as u64;
        for unit in self.program.code_units(AddressRange::new(addr, length)) {
            if !unit.defined || is_undefined(&unit.data_type) {
                self.program.clear_code_units(unit.range);
                continue;
            }

            let owner = self
                .program
                .symbols_at(unit.range.start())
                .into_iter()
                .next()
                .unwrap_or_else(|| "(unnamed)".to_string());
            warn!("overlapping {} {}", unit.data_type, owner);
            self.summary.overlaps += 1;
        }

        if let Err(e) = self.program.create_data(addr, data_type, length) {
            error!("{}", e);
        }
        if let Err(e) = self
            .program
            .create_label(addr, name, &Namespace::global(), true, SourceType::Imported)
        {
            error!("failed to label {} as {}: {}", addr, name, e);
        }

        self.summary.labels.push(PlacedLabel {
            address: addr,
            name: name.to_string(),
            data_type: data_type.display_name(),
            length,
        });
    }

    /// Walks the slots of a vtable placed at `addr`, descending into the
    /// embedded `_super` table, which shares the same base address.
    pub fn label_vmethods(&mut self, addr: Address, class: &Namespace, layout: &Composite, registry: &TypeRegistry) {
        for component in layout.components() {
            let Some(name) = component.name.as_deref() else {
                continue;
            };

            if name == "_super" {
                match component.data_type.path().and_then(|p| registry.composite(p)) {
                    Some(parent) => self.label_vmethods(addr, class, parent, registry),
                    None => warn!("vtable {} has an unresolved _super", layout.name),
                }
                continue;
            }

            let slot = addr + component.offset as u64;
            let target = match self.program.read_pointer(slot) {
                Ok(target) => target,
                Err(e) => {
                    warn!("cannot read {} slot {}: {}", layout.name, name, e);
                    continue;
                }
            };

            let signature = slot_signature(&component.data_type, registry);
            self.recover_function(target, name, class, signature);
        }
    }

    /// Creates a function at `target`, or takes over an existing one whose
    /// signature came from a lower priority source. Otherwise only a label
    /// is added.
    fn recover_function(&mut self, target: Address, name: &str, class: &Namespace, signature: Option<&FunctionDef>) {
        let created = self.program.create_function(target, name, SourceType::Imported).is_ok();
        let reusable = created
            || self
                .program
                .function_at(target)
                .is_some_and(|f| f.signature_source.is_lower_priority_than(SourceType::Imported));

        if !reusable {
            match self.program.create_label(target, name, class, false, SourceType::Imported) {
                Ok(()) => self.summary.method_labels.push((target, name.to_string())),
                Err(e) => error!("failed to label {} as {}: {}", target, name, e),
            }
            return;
        }

        let update = FunctionUpdate {
            name: name.to_string(),
            namespace: class.clone(),
            calling_convention: CallingConvention::Thiscall.as_str().to_string(),
            return_type: signature.and_then(|s| s.return_type.clone()),
            parameters: signature.map(|s| s.parameters.clone()).unwrap_or_default(),
            source: SourceType::Imported,
        };
        match self.program.update_function(target, update) {
            Ok(()) => self.summary.functions.push(RecoveredFunction {
                address: target,
                name: name.to_string(),
                namespace: class.clone(),
                created,
            }),
            Err(e) => error!("failed to update function {} at {}: {}", name, target, e),
        }
    }
}

/// The function definition behind a vtable slot's function pointer.
fn slot_signature<'r>(slot: &DataType, registry: &'r TypeRegistry) -> Option<&'r FunctionDef> {
    match slot {
        DataType::Pointer { target } => registry.get(target.path()?)?.as_function(),
        _ => None,
    }
}

/// Host placeholder types: `undefined`, `undefined1` .. `undefined8`.
fn is_undefined(type_name: &str) -> bool {
    match type_name.strip_prefix("undefined") {
        Some("") => true,
        Some(width) => width.parse::<usize>().is_ok(),
        None => false,
    }
}
