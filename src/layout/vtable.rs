// Tue Oct 13 2026 - Alex

use crate::abi::AbiFamily;
use crate::definition::{TypeId, VMethod};
use crate::layout::{Composite, DataType, FunctionDef, LayoutError, Parameter, TypeCompiler, TypePath};
use log::trace;

/// Builds `vtable_<name>` structs: the base class table as `_super`, then
/// one function pointer per declared virtual method.
pub struct VTableCompiler<'c, 'a> {
    compiler: &'c mut TypeCompiler<'a>,
}

impl<'c, 'a> VTableCompiler<'c, 'a> {
    pub fn new(compiler: &'c mut TypeCompiler<'a>) -> Self {
        Self { compiler }
    }

    pub fn compile(&mut self, id: TypeId) -> Result<DataType, LayoutError> {
        let codegen = self.compiler.codegen;
        let def = codegen.type_def(id);
        let class_name = def.symbol_name().to_string();
        let vtable_name = format!("vtable_{}", class_name);
        let category = self.compiler.categories.vtables.clone();

        if self.compiler.registry.contains(&category, &vtable_name) {
            return Ok(DataType::named(TypePath::new(&category, &vtable_name)));
        }

        let dt = self.compiler.registry.put(&category, Composite::structure(&vtable_name));
        let path = TypePath::new(&category, &vtable_name);

        if let Some(parent) = &def.inherits_from {
            let parent = self.compiler.lookup(parent)?;
            let parent_table = self.compile(parent)?;
            self.slot(&path, parent_table, "_super")?;
        }

        for (index, method) in def.vmethods.iter().enumerate() {
            if method.is_destructor {
                self.add_destructor(&path, &class_name, method)?;
                continue;
            }

            let method_name = match (&method.name, &method.anon_name) {
                (Some(name), _) => name.clone(),
                (None, Some(anon)) => format!("{}_{}", class_name, anon),
                (None, None) => format!("{}_vmethod{}", class_name, index),
            };
            let signature = self.method_signature(&format!("{}::{}", class_name, method_name), method, false)?;
            self.slot(&path, DataType::pointer_to(signature), &method_name)?;
        }

        self.compiler.registry.commit(&dt);
        Ok(dt)
    }

    /// Itanium tables carry a complete-object and a deleting destructor. MSVC
    /// has a single slot taking an implicit `deleting` flag.
    fn add_destructor(&mut self, path: &TypePath, class_name: &str, method: &VMethod) -> Result<(), LayoutError> {
        let method_name = format!("~{}", class_name);
        let full_name = format!("{}::{}", class_name, method_name);

        match self.compiler.abi.family {
            AbiFamily::Itanium => {
                let signature = DataType::pointer_to(self.method_signature(&full_name, method, false)?);
                self.slot(path, signature.clone(), &method_name)?;
                self.slot(path, signature, &format!("{}(deleting)", method_name))?;
            }
            AbiFamily::Msvc => {
                let implicit_flag = method.arguments.is_empty();
                let signature = DataType::pointer_to(self.method_signature(&full_name, method, implicit_flag)?);
                self.slot(path, signature, &method_name)?;
            }
        }
        Ok(())
    }

    /// Registers `<class>::<method>` as a thiscall function definition.
    fn method_signature(&mut self, full_name: &str, method: &VMethod, deleting_flag: bool) -> Result<DataType, LayoutError> {
        trace!("resolving signature of {}", full_name);
        let wrap = |source: LayoutError| LayoutError::UnresolvedMethodSignature {
            method: full_name.to_string(),
            source: Box::new(source),
        };

        let mut function = FunctionDef::thiscall(full_name);
        function.return_type = match method.return_type {
            Some(ret) => Some(self.compiler.resolve_field(ret).map_err(wrap)?),
            None if method.anon_name.is_none() => Some(DataType::Void),
            None => None,
        };

        let codegen = self.compiler.codegen;
        for &arg in &method.arguments {
            let field = codegen.field(arg);
            let name = field.name.clone().or_else(|| field.anon_name.clone());
            let data_type = self.compiler.resolve_field(arg).map_err(wrap)?;
            function.parameters.push(Parameter { name, data_type });
        }
        if deleting_flag {
            function.parameters.push(Parameter {
                name: Some("deleting".to_string()),
                data_type: DataType::Bool,
            });
        }

        let methods = self.compiler.categories.methods.clone();
        Ok(self.compiler.registry.create(&methods, function))
    }

    fn slot(&mut self, path: &TypePath, data_type: DataType, name: &str) -> Result<(), LayoutError> {
        self.compiler
            .registry
            .add_component(path, data_type, 0, Some(name.to_string()), None)
    }
}
