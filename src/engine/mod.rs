// Tue Oct 13 2026 - Alex

pub mod importer;
pub mod monitor;

pub use importer::{ImportSummary, Importer};
pub use monitor::TaskMonitor;
