// Tue Oct 13 2026 - Alex

use crate::program::{Address, Namespace};
use serde::Serialize;

/// A layout applied at an address, with its primary label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedLabel {
    pub address: Address,
    pub name: String,
    pub data_type: String,
    pub length: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecoveredFunction {
    pub address: Address,
    pub name: String,
    pub namespace: Namespace,
    /// False when an existing lower-priority function was renamed instead.
    pub created: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LabelSummary {
    pub vtables: usize,
    pub globals: usize,
    pub overlaps: usize,
    pub labels: Vec<PlacedLabel>,
    pub functions: Vec<RecoveredFunction>,
    /// Slot targets that kept their existing function and only got a label.
    pub method_labels: Vec<(Address, String)>,
}
