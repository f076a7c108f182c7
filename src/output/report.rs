// Tue Oct 13 2026 - Alex

use crate::engine::ImportSummary;
use crate::error::ImportError;
use crate::labeler::{PlacedLabel, RecoveredFunction};
use crate::layout::{Component, DataType, TypeEntry, TypePath, TypeRegistry};
use itertools::Itertools;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportStatistics {
    pub categories: usize,
    pub composites: usize,
    pub enums: usize,
    pub typedefs: usize,
    pub functions: usize,
    pub vtables_labeled: usize,
    pub globals_labeled: usize,
    pub functions_recovered: usize,
    pub overlaps: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentReport {
    pub offset: usize,
    pub length: usize,
    pub name: Option<String>,
    pub data_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeReport {
    pub name: String,
    pub entry: &'static str,
    pub size: Option<usize>,
    pub alignment: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryReport {
    pub path: String,
    pub types: Vec<TypeReport>,
}

/// Everything one import produced, in a form meant for `serde_json`.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub symbol_table: String,
    pub abi: String,
    pub statistics: ReportStatistics,
    pub categories: Vec<CategoryReport>,
    pub labels: Vec<PlacedLabel>,
    pub functions: Vec<RecoveredFunction>,
}

impl ImportReport {
    pub fn build(registry: &TypeRegistry, summary: &ImportSummary) -> Self {
        let mut statistics = ReportStatistics {
            vtables_labeled: summary.labels.vtables,
            globals_labeled: summary.labels.globals,
            functions_recovered: summary.labels.functions.len(),
            overlaps: summary.labels.overlaps,
            ..ReportStatistics::default()
        };

        let categories = registry
            .categories()
            .sorted_by(|a, b| a.0.cmp(b.0))
            .map(|(path, entries)| {
                statistics.categories += 1;
                let types = entries
                    .values()
                    .sorted_by(|a, b| a.name().cmp(b.name()))
                    .map(|entry| {
                        match entry {
                            TypeEntry::Composite(_) => statistics.composites += 1,
                            TypeEntry::Enum(_) => statistics.enums += 1,
                            TypeEntry::Typedef(_) => statistics.typedefs += 1,
                            TypeEntry::Function(_) => statistics.functions += 1,
                        }
                        type_report(registry, path, entry)
                    })
                    .collect();
                CategoryReport {
                    path: path.to_string(),
                    types,
                }
            })
            .collect();

        Self {
            symbol_table: summary.symbol_table.clone(),
            abi: summary.abi.clone(),
            statistics,
            categories,
            labels: summary.labels.labels.clone(),
            functions: summary.labels.functions.clone(),
        }
    }

    pub fn category(&self, path: &str) -> Option<&CategoryReport> {
        self.categories.iter().find(|c| c.path == path)
    }

    pub fn to_json(&self) -> Result<String, ImportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ImportError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

fn type_report(registry: &TypeRegistry, category: &str, entry: &TypeEntry) -> TypeReport {
    let reference = DataType::named(TypePath::new(category, entry.name()));
    let (kind, components) = match entry {
        TypeEntry::Composite(c) if c.is_union() => ("union", c.components().iter().map(component_report).collect()),
        TypeEntry::Composite(c) => ("struct", c.components().iter().map(component_report).collect()),
        TypeEntry::Enum(_) => ("enum", Vec::new()),
        TypeEntry::Typedef(_) => ("typedef", Vec::new()),
        TypeEntry::Function(_) => ("function", Vec::new()),
    };
    TypeReport {
        name: entry.name().to_string(),
        entry: kind,
        size: registry.size_of(&reference),
        alignment: registry.alignment_of(&reference),
        components,
    }
}

fn component_report(component: &Component) -> ComponentReport {
    ComponentReport {
        offset: component.offset,
        length: component.length,
        name: component.name.clone(),
        data_type: component.data_type.display_name(),
        comment: component.comment.clone(),
    }
}
