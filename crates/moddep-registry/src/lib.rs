//! Module location registry.
//!
//! Answers "where does module X live on disk, in the form the active backend
//! wants". Lookups go through a [`ModuleLocationContext`] that is created for
//! one build-graph construction and dropped at its end; there is no global
//! registry.
//!
//! # Architecture
//!
//! - [`BmiLocator`]: the whole-build lookup from logical name to BMI path.
//!   Implemented by the frozen module graph, by [`ModuleIndex`] files and by
//!   plain closures.
//! - [`ModuleLocationContext`]: root anchor, backend path rewriting and the
//!   locator, bundled for one regeneration.
//! - [`ModuleIndex`]: the per-target file listing the modules a target
//!   exports, read back by dependent targets and subprojects.

pub mod error;
pub mod extension;
pub mod index;
pub mod location;

// Re-exports for convenience.
pub use error::{RegistryError, Result};
pub use extension::{derive_bmi_path, extension_for, DEFAULT_EXTENSION};
pub use index::{IndexedModule, ModuleIndex};
pub use location::{bmi_path, BmiLocator, ModuleLocationContext, PathStyle};
