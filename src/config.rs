// Tue Oct 13 2026 - Alex

use crate::error::ImportError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    /// Category everything is imported under, also the root namespace of
    /// class namespaces.
    pub root_category: String,
    pub erase_existing: bool,
    pub polymorphic_pointers: bool,
    pub label_vtables: bool,
    pub label_globals: bool,
    pub show_progress: bool,
    pub verbosity: usize,
    pub log_file: Option<PathBuf>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            root_category: "df".to_string(),
            erase_existing: true,
            polymorphic_pointers: false,
            label_vtables: true,
            label_globals: true,
            show_progress: true,
            verbosity: 1,
            log_file: None,
        }
    }
}

impl ImportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ImportError> {
        let contents = fs::read_to_string(path)?;
        let config: ImportConfig = serde_json::from_str(&contents)?;
        config.validate().map_err(ImportError::Config)?;
        Ok(config)
    }

    pub fn with_root_category(mut self, root: &str) -> Self {
        self.root_category = root.to_string();
        self
    }

    pub fn with_erase_existing(mut self, erase: bool) -> Self {
        self.erase_existing = erase;
        self
    }

    pub fn with_polymorphic_pointers(mut self, enabled: bool) -> Self {
        self.polymorphic_pointers = enabled;
        self
    }

    pub fn with_labels(mut self, vtables: bool, globals: bool) -> Self {
        self.label_vtables = vtables;
        self.label_globals = globals;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn with_verbosity(mut self, verbosity: usize) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_log_file(mut self, path: PathBuf) -> Self {
        self.log_file = Some(path);
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.root_category.is_empty() {
            return Err("root_category must not be empty".to_string());
        }
        if self.root_category.split('/').any(str::is_empty) {
            return Err(format!("root_category {:?} has an empty path segment", self.root_category));
        }
        if self.root_category.contains("::") {
            return Err("root_category is a category path; use '/' as the separator".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ImportConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.root_category, "df");
        assert!(config.erase_existing);
        assert!(!config.polymorphic_pointers);
    }

    #[test]
    fn test_validate_rejects_bad_roots() {
        assert!(ImportConfig::new().with_root_category("").validate().is_err());
        assert!(ImportConfig::new().with_root_category("df//x").validate().is_err());
        assert!(ImportConfig::new().with_root_category("df::x").validate().is_err());
        assert!(ImportConfig::new().with_root_category("games/df").validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: ImportConfig = serde_json::from_str(r#"{"polymorphic_pointers": true, "label_globals": false}"#).unwrap();
        assert!(config.polymorphic_pointers);
        assert!(!config.label_globals);
        assert!(config.label_vtables);
        assert_eq!(config.root_category, "df");
    }
}
