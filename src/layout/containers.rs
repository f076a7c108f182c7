// Tue Oct 13 2026 - Alex

use crate::abi::AbiFamily;
use crate::layout::{Composite, DataType, LayoutError, TypeCompiler, TypePath, Typedef};

/// Standard container layouts, one per element type, named `kind<element>`.
impl<'a> TypeCompiler<'a> {
    pub fn vector_of(&mut self, element: Option<DataType>) -> Result<DataType, LayoutError> {
        let element = self.container_element(element);
        let name = format!("vector<{}>", element.display_name());
        if let Some(existing) = self.existing(&self.categories.std, &name) {
            return Ok(existing);
        }

        let pointer = DataType::pointer_to(element);
        let dt = self.registry.put(&self.categories.std, Composite::structure(&name));
        let path = entry_path(&dt)?;
        for member in ["_M_start", "_M_finish", "_M_end_of_storage"] {
            self.registry
                .add_component(&path, pointer.clone(), 0, Some(member.to_string()), None)?;
        }
        self.registry.commit(&dt);
        Ok(dt)
    }

    pub fn set_of(&mut self, element: Option<DataType>) -> Result<DataType, LayoutError> {
        let element = self.container_element(element);
        let element_name = element.display_name();
        let name = format!("set<{}>", element_name);
        if let Some(existing) = self.existing(&self.categories.std, &name) {
            return Ok(existing);
        }

        let std = self.categories.std.clone();
        let node = self
            .registry
            .create(&std, Composite::structure(&format!("_Rb_tree_node<{}>", element_name)));
        let node_path = entry_path(&node)?;
        let node_pointer = DataType::pointer_to(node.clone());

        let set = self.registry.put(&std, Composite::structure(&name));
        let set_path = entry_path(&set)?;

        match self.abi.family {
            AbiFamily::Itanium => {
                let base = self
                    .registry
                    .create(&std, Composite::structure(&format!("_Rb_tree_node_base<{}>", element_name)));
                let base_path = entry_path(&base)?;
                self.member(&base_path, DataType::Bool, "_M_color")?;
                self.member(&base_path, node_pointer.clone(), "_M_parent")?;
                self.member(&base_path, node_pointer.clone(), "_M_left")?;
                self.member(&base_path, node_pointer, "_M_right")?;

                self.member(&node_path, base.clone(), "_M_base")?;
                self.member(&set_path, base, "_M_header")?;
            }
            AbiFamily::Msvc => {
                self.member(&node_path, node_pointer.clone(), "_Left")?;
                self.member(&node_path, node_pointer.clone(), "_Parent")?;
                self.member(&node_path, node_pointer.clone(), "_Right")?;
                self.member(&node_path, DataType::Bool, "_Color")?;
                self.member(&node_path, DataType::Bool, "_Isnil")?;

                self.member(&set_path, node_pointer, "_Myhead")?;
            }
        }

        self.member(&node_path, element, "_M_value_field")?;
        self.member(&set_path, self.std.size_t.clone(), "_M_node_count")?;
        self.registry.commit(&set);
        Ok(set)
    }

    /// `deque<T>` is an alias of the opaque deque; only the name varies.
    pub fn deque_of(&mut self, element: Option<DataType>) -> DataType {
        let element = element.unwrap_or(DataType::Default);
        let name = format!("deque<{}>", element.display_name());
        if let Some(existing) = self.existing(&self.categories.std, &name) {
            return existing;
        }
        self.registry
            .put(&self.categories.std, Typedef::new(&name, self.std.deque.clone()))
    }

    pub fn df_array_of(&mut self, element: Option<DataType>) -> Result<DataType, LayoutError> {
        let element = element.unwrap_or(DataType::Default);
        let name = format!("DfArray<{}>", element.display_name());
        if let Some(existing) = self.existing(&self.categories.root, &name) {
            return Ok(existing);
        }

        let dt = self.registry.put(&self.categories.root, Composite::structure(&name));
        let path = entry_path(&dt)?;
        self.member(&path, DataType::pointer_to(element), "ptr")?;
        self.member(&path, self.std.int.clone(), "length")?;
        self.registry.commit(&dt);
        Ok(dt)
    }

    /// Element type of a tree or vector; the host has no sub-byte `bool`
    /// element, so those become `int8_t`.
    fn container_element(&self, element: Option<DataType>) -> DataType {
        match element {
            None => DataType::Default,
            Some(DataType::Bool) => self.std.int8.clone(),
            Some(element) => element,
        }
    }

    fn existing(&self, category: &str, name: &str) -> Option<DataType> {
        self.registry
            .contains(category, name)
            .then(|| DataType::named(TypePath::new(category, name)))
    }

    fn member(&mut self, target: &TypePath, data_type: DataType, name: &str) -> Result<(), LayoutError> {
        self.registry
            .add_component(target, data_type, 0, Some(name.to_string()), None)
    }
}

fn entry_path(dt: &DataType) -> Result<TypePath, LayoutError> {
    dt.path()
        .cloned()
        .ok_or_else(|| LayoutError::RegistryEntryMissing(dt.display_name()))
}

#[cfg(test)]
mod tests {
    use crate::abi::ExecutableFormat;
    use crate::layout::compiler::tests::Fixture;
    use crate::layout::{DataType, TypePath};

    const CONTAINERS: &str = r#"
        <ld:global-type ld:meta="struct-type" type-name="holder">
          <ld:field ld:meta="container" ld:subtype="stl-vector" name="ids">
            <ld:item ld:meta="number" ld:subtype="int32_t"/>
          </ld:field>
          <ld:field ld:meta="container" ld:subtype="stl-vector" name="more_ids">
            <ld:item ld:meta="number" ld:subtype="int32_t"/>
          </ld:field>
          <ld:field ld:meta="container" ld:subtype="stl-vector" name="small">
            <ld:item ld:meta="number" ld:subtype="int16_t"/>
          </ld:field>
          <ld:field ld:meta="container" ld:subtype="stl-vector" name="untyped"/>
          <ld:field ld:meta="container" ld:subtype="stl-set" name="flags">
            <ld:item ld:meta="number" ld:subtype="bool"/>
          </ld:field>
          <ld:field ld:meta="container" ld:subtype="stl-deque" name="queue">
            <ld:item ld:meta="number" ld:subtype="int32_t"/>
          </ld:field>
          <ld:field ld:meta="container" ld:subtype="df-array" name="arr">
            <ld:item ld:meta="number" ld:subtype="uint8_t"/>
          </ld:field>
        </ld:global-type>"#;

    fn member_type(fx: &Fixture, name: &str) -> DataType {
        fx.composite("df", "holder").component(name).unwrap().data_type.clone()
    }

    #[test]
    fn test_containers_are_shared_per_element_type() {
        let mut fx = Fixture::new(ExecutableFormat::Elf, 8, CONTAINERS);
        fx.compile("holder").unwrap();

        let ids = member_type(&fx, "ids");
        assert_eq!(ids, member_type(&fx, "more_ids"));
        assert_eq!(ids, DataType::named(TypePath::new("df/std", "vector<int32_t>")));
        assert_ne!(ids, member_type(&fx, "small"));
        assert_eq!(
            member_type(&fx, "untyped"),
            DataType::named(TypePath::new("df/std", "vector<undefined>"))
        );
        assert_eq!(fx.member_names("df/std", "vector<int32_t>"), vec!["_M_start", "_M_finish", "_M_end_of_storage"]);
        assert_eq!(fx.composite("df/std", "vector<int32_t>").length(), 24);
    }

    #[test]
    fn test_itanium_set_layout() {
        let mut fx = Fixture::new(ExecutableFormat::Elf, 8, CONTAINERS);
        fx.compile("holder").unwrap();

        assert_eq!(member_type(&fx, "flags"), DataType::named(TypePath::new("df/std", "set<int8_t>")));
        assert_eq!(fx.member_names("df/std", "set<int8_t>"), vec!["_M_header", "_M_node_count"]);
        assert_eq!(
            fx.member_names("df/std", "_Rb_tree_node_base<int8_t>"),
            vec!["_M_color", "_M_parent", "_M_left", "_M_right"]
        );
        assert_eq!(fx.member_names("df/std", "_Rb_tree_node<int8_t>"), vec!["_M_base", "_M_value_field"]);
        assert_eq!(fx.composite("df/std", "set<int8_t>").length(), 40);
    }

    #[test]
    fn test_msvc_set_layout() {
        let mut fx = Fixture::new(ExecutableFormat::Pe, 4, CONTAINERS);
        fx.compile("holder").unwrap();

        assert_eq!(fx.member_names("df/std", "set<int8_t>"), vec!["_Myhead", "_M_node_count"]);
        assert_eq!(fx.composite("df/std", "set<int8_t>").length(), 8);
        let node = fx.composite("df/std", "_Rb_tree_node<int8_t>");
        assert_eq!(node.component("_Color").unwrap().offset, 12);
        assert_eq!(node.component("_M_value_field").unwrap().offset, 14);
    }

    #[test]
    fn test_deque_and_df_array() {
        let mut fx = Fixture::new(ExecutableFormat::Elf, 8, CONTAINERS);
        fx.compile("holder").unwrap();

        let queue = member_type(&fx, "queue");
        assert_eq!(queue, DataType::named(TypePath::new("df/std", "deque<int32_t>")));
        assert_eq!(fx.registry.size_of(&queue), Some(80));

        assert_eq!(fx.member_names("df", "DfArray<uint8_t>"), vec!["ptr", "length"]);
        assert_eq!(fx.composite("df", "DfArray<uint8_t>").length(), 16);
    }

    #[test]
    fn test_fixed_containers_and_linked_list() {
        let mut fx = Fixture::new(
            ExecutableFormat::Elf,
            8,
            r#"<ld:global-type ld:meta="struct-type" type-name="job_list_link">
                 <ld:field ld:meta="pointer" name="next"><ld:item ld:meta="global" type-name="job_list_link"/></ld:field>
               </ld:global-type>
               <ld:global-type ld:meta="struct-type" type-name="world">
                 <ld:field ld:meta="container" ld:subtype="stl-bit-vector" name="visible"/>
                 <ld:field ld:meta="container" ld:subtype="df-flagarray" name="flags"/>
                 <ld:field ld:meta="container" ld:subtype="df-linked-list" type-name="job_list_link" name="jobs"/>
               </ld:global-type>"#,
        );
        fx.compile("world").unwrap();
        let world = fx.composite("df", "world");

        let visible = world.component("visible").unwrap();
        assert_eq!(visible.data_type, DataType::named(TypePath::new("df/std", "vector<bool>")));
        assert_eq!(visible.length, 40);

        let flags = world.component("flags").unwrap();
        assert_eq!(flags.data_type, DataType::named(TypePath::new("df", "BitArray")));
        assert_eq!((flags.offset, flags.length), (40, 16));

        let jobs = world.component("jobs").unwrap();
        assert_eq!(jobs.data_type, DataType::named(TypePath::new("df", "job_list_link")));
        assert_eq!((jobs.offset, jobs.length), (56, 8));
    }
}
