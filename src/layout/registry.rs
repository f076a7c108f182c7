// Tue Oct 13 2026 - Alex

use crate::layout::{Composite, DataType, LayoutError, TypeEntry, TypePath};
use indexmap::IndexMap;
use log::info;

/// Category paths under the import root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Categories {
    pub root: String,
    pub std: String,
    pub enums: String,
    pub vtables: String,
    pub methods: String,
}

impl Categories {
    pub fn new(root: &str) -> Self {
        Self {
            root: root.to_string(),
            std: format!("{}/std", root),
            enums: format!("{}/enums", root),
            vtables: format!("{}/vtables", root),
            methods: format!("{}/vtables/methods", root),
        }
    }
}

impl Default for Categories {
    fn default() -> Self {
        Self::new("df")
    }
}

/// Pointer width and the largest alignment any primitive can demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataOrganization {
    pub pointer_size: usize,
    pub max_alignment: usize,
}

impl DataOrganization {
    pub fn new(pointer_size: usize, max_alignment: usize) -> Self {
        Self {
            pointer_size,
            max_alignment,
        }
    }
}

/// The category tree the importer writes into. Entries are keyed by
/// category path then name, and `put` replaces what was there.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    organization: DataOrganization,
    categories: IndexMap<String, IndexMap<String, TypeEntry>>,
}

impl TypeRegistry {
    pub fn new(organization: DataOrganization) -> Self {
        Self {
            organization,
            categories: IndexMap::new(),
        }
    }

    pub fn organization(&self) -> DataOrganization {
        self.organization
    }

    pub fn pointer_size(&self) -> usize {
        self.organization.pointer_size
    }

    pub fn create_category(&mut self, path: &str) {
        self.categories.entry(path.to_string()).or_default();
    }

    pub fn has_category(&self, path: &str) -> bool {
        self.categories.contains_key(path)
    }

    /// Removes a category and everything below it. Returns how many entries went.
    pub fn remove_category(&mut self, path: &str) -> usize {
        let prefix = format!("{}/", path);
        let doomed: Vec<String> = self
            .categories
            .keys()
            .filter(|k| k.as_str() == path || k.starts_with(&prefix))
            .cloned()
            .collect();

        let mut removed = 0;
        for key in doomed {
            if let Some(entries) = self.categories.shift_remove(&key) {
                removed += entries.len();
            }
        }
        removed
    }

    pub fn get(&self, path: &TypePath) -> Option<&TypeEntry> {
        self.categories.get(&path.category)?.get(&path.name)
    }

    pub fn get_in(&self, category: &str, name: &str) -> Option<&TypeEntry> {
        self.categories.get(category)?.get(name)
    }

    pub fn contains(&self, category: &str, name: &str) -> bool {
        self.get_in(category, name).is_some()
    }

    pub fn get_mut(&mut self, path: &TypePath) -> Option<&mut TypeEntry> {
        self.categories.get_mut(&path.category)?.get_mut(&path.name)
    }

    pub fn composite(&self, path: &TypePath) -> Option<&Composite> {
        self.get(path)?.as_composite()
    }

    pub fn composite_mut(&mut self, path: &TypePath) -> Result<&mut Composite, LayoutError> {
        match self.get_mut(path) {
            Some(TypeEntry::Composite(c)) => Ok(c),
            _ => Err(LayoutError::RegistryEntryMissing(path.to_string())),
        }
    }

    /// Stores an entry, replacing any previous entry of the same name.
    pub fn put(&mut self, category: &str, entry: impl Into<TypeEntry>) -> DataType {
        let entry = entry.into();
        let path = TypePath::new(category, entry.name());
        self.categories
            .entry(category.to_string())
            .or_default()
            .insert(path.name.clone(), entry);
        DataType::named(path)
    }

    /// `put`, reported as a finished type.
    pub fn create(&mut self, category: &str, entry: impl Into<TypeEntry>) -> DataType {
        let dt = self.put(category, entry);
        self.commit(&dt);
        dt
    }

    /// Reports an entry that was registered early and has since been filled in.
    pub fn commit(&self, data_type: &DataType) {
        if let Some(path) = data_type.path() {
            info!("created data type {}::{}", path.category_name(), path.name);
        }
    }

    /// Size in bytes, or `None` for types whose length comes from their use
    /// (strings, function definitions, void).
    pub fn size_of(&self, data_type: &DataType) -> Option<usize> {
        match data_type {
            DataType::Void | DataType::String | DataType::TerminatedString => None,
            DataType::Default | DataType::Bool | DataType::Char => Some(1),
            DataType::Undefined { size } => Some(*size),
            DataType::Integer { size, .. } | DataType::Float { size } => Some(*size),
            DataType::Pointer { .. } => Some(self.organization.pointer_size),
            DataType::Array { element, count } => self.size_of(element).map(|s| s * count),
            DataType::Named { path } => match self.get(path)? {
                TypeEntry::Composite(c) => Some(c.length()),
                TypeEntry::Enum(e) => Some(e.size),
                TypeEntry::Typedef(t) => self.size_of(&t.target),
                TypeEntry::Function(_) => None,
            },
        }
    }

    pub fn alignment_of(&self, data_type: &DataType) -> usize {
        let natural = match data_type {
            DataType::Integer { size, .. } | DataType::Float { size } => *size,
            DataType::Pointer { .. } => self.organization.pointer_size,
            DataType::Array { element, .. } => self.alignment_of(element),
            DataType::Named { path } => match self.get(path) {
                Some(TypeEntry::Composite(c)) => c.alignment(),
                Some(TypeEntry::Enum(e)) => e.size,
                Some(TypeEntry::Typedef(t)) => self.alignment_of(&t.target),
                _ => 1,
            },
            _ => 1,
        };
        natural.clamp(1, self.organization.max_alignment)
    }

    /// Resolves typedef chains down to the underlying type.
    pub fn resolve<'a>(&'a self, data_type: &'a DataType) -> &'a DataType {
        let mut current = data_type;
        for _ in 0..64 {
            match current {
                DataType::Named { path } => match self.get(path) {
                    Some(TypeEntry::Typedef(t)) => current = &t.target,
                    _ => return current,
                },
                _ => return current,
            }
        }
        current
    }

    /// Appends a component of `data_type` to a registry composite, using
    /// `length_hint` when the type itself has no fixed size.
    pub fn add_component(
        &mut self,
        target: &TypePath,
        data_type: DataType,
        length_hint: usize,
        name: Option<String>,
        comment: Option<String>,
    ) -> Result<(), LayoutError> {
        let length = self.size_of(&data_type).unwrap_or(length_hint).max(1);
        let alignment = self.alignment_of(&data_type);
        self.composite_mut(target)?
            .add(data_type, length, alignment, name, comment);
        Ok(())
    }

    /// Recomputes every member length of a union from the current sizes of
    /// the member types. Structs are left alone.
    pub fn refresh_union(&mut self, path: &TypePath) -> Result<(), LayoutError> {
        let members: Vec<_> = match self.composite(path) {
            Some(union) if union.is_union() => union
                .components()
                .iter()
                .map(|c| {
                    let length = self.size_of(&c.data_type).unwrap_or(c.length).max(1);
                    let alignment = self.alignment_of(&c.data_type);
                    (c.data_type.clone(), length, alignment, c.name.clone(), c.comment.clone())
                })
                .collect(),
            Some(_) => return Ok(()),
            None => return Err(LayoutError::RegistryEntryMissing(path.to_string())),
        };

        let union = self.composite_mut(path)?;
        union.clear();
        for (data_type, length, alignment, name, comment) in members {
            union.add(data_type, length, alignment, name, comment);
        }
        Ok(())
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &IndexMap<String, TypeEntry>)> {
        self.categories.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(|c| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
