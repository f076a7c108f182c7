// Tue Oct 13 2026 - Alex

pub mod report;

pub use report::{CategoryReport, ComponentReport, ImportReport, ReportStatistics, TypeReport};
