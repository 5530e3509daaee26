//! Hardware component models for the Metior cost-modeling toolchain.
//!
//! This crate provides the component hierarchy the estimator evaluates
//! against: [`PrimitiveComponent`] leaves backed by per-feature cost
//! scripts, [`CompoundComponent`] compositions with their own operation
//! definitions, and the flattened [`Architecture`] registry of top-level
//! components.
//!
//! Primitive cost scripts come from a [`ComponentRegistry`] (the
//! cost-function lookup service), and compound component templates from a
//! [`TemplateRegistry`]. Both are explicit registry objects passed into
//! construction — there are no process-wide globals, and instantiated
//! components are independent value copies of their templates.

#![warn(missing_docs)]

pub mod architecture;
pub mod compound;
pub mod describe;
pub mod primitive;
pub mod registry;
pub mod template;

pub use architecture::Architecture;
pub use compound::{Component, CompoundComponent};
pub use describe::{ArchitectureSpec, ComponentEntry, ComponentNode, CompoundSpec};
pub use primitive::PrimitiveComponent;
pub use registry::{ActionSpec, ComponentRegistry, PrimitiveClassSpec};
pub use template::TemplateRegistry;
