// Tue Oct 13 2026 - Alex

pub mod abi;
pub mod config;
pub mod definition;
pub mod engine;
pub mod error;
pub mod graph;
pub mod labeler;
pub mod layout;
pub mod output;
pub mod program;
pub mod symbol;
pub mod utils;

pub use config::ImportConfig;
pub use engine::{ImportSummary, Importer, TaskMonitor};
pub use error::ImportError;
pub use output::ImportReport;
pub use program::{InMemoryProgram, Program};
