//! Year configuration sources and the per-year registry.

mod registry;
mod source;
mod year_2025;

pub use registry::YearConfigRegistry;
pub use source::{BuiltInSource, YearConfigSource};
