// Tue Oct 13 2026 - Alex

pub mod profile;
pub mod stdlib;

pub use profile::{AbiFamily, AbiProfile, ExecutableFormat};
pub use stdlib::StdTypes;
