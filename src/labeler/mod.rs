// Tue Oct 13 2026 - Alex

pub mod address_labeler;
pub mod record;

pub use address_labeler::AddressLabeler;
pub use record::{LabelSummary, PlacedLabel, RecoveredFunction};
