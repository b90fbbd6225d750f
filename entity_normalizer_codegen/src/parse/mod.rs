//! Spec intake.
//!
//! Turns the items of the annotated module into [`EntitySpec`]s:
//!
//! 1. [`module::SpecCollector`] walks inline modules, tracking the module path
//! 2. [`attributes`] reads `#[entity_spec(..)]`, `#[entity_id]` and extra derives
//! 3. [`spec::EntitySpec::from_item`] validates one struct into a spec
//!
//! Every malformed spec is reported as a [`SpecError`](crate::error::SpecError);
//! the others continue.

pub mod attributes;
pub mod module;
pub mod spec;

pub use module::{Intake, collect_specs};
pub use spec::{EntitySpec, ModulePath, SpecField};
