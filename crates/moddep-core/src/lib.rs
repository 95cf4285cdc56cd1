//! Core data model for module dependency resolution.
//!
//! Describes what a single translation unit provides and requires in terms
//! of named module interfaces, independent of how the facts were obtained
//! (scanner reports) or how they are consumed (graph ordering, module maps).
//!
//! # Overview
//!
//! - [`ModuleReference`]: a logical module name, optionally paired with the
//!   compiled interface (BMI) path once resolved.
//! - [`SourceDependencyInfo`]: one per translation unit, keyed by the
//!   primary output it produces.
//! - [`ModuleMapFormat`]: the toolchain family a module map is emitted for.
//! - [`TargetScope`]: which target a unit belongs to and whether the
//!   modules it provides may be imported by other targets.

pub mod error;
pub mod format;
pub mod model;
pub mod scope;

pub use error::{ModelError, UnknownFormat};
pub use format::ModuleMapFormat;
pub use model::{ModuleReference, SourceDependencyInfo, PARTITION_SEPARATOR};
pub use scope::{TargetScope, Visibility};
