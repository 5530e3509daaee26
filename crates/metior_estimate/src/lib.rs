//! The Metior operation evaluator.
//!
//! Given an [`Architecture`](metior_arch::Architecture) and a flattened
//! operation list (serial, parallel, or pipelined), the [`Estimator`]
//! computes a component × operation [`CostMatrix`] and per-component and
//! architecture totals for each requested feature. Pipeline operations
//! model staggered, possibly overlapping stage execution with idle-energy
//! accounting for the cycles a component spends waiting.

#![warn(missing_docs)]

pub mod estimator;
pub mod matrix;
pub mod operation;
pub mod report;

pub use estimator::Estimator;
pub use matrix::CostMatrix;
pub use operation::{OpCall, Operation, OperationSpec, PipelineStage, StageSpec};
pub use report::EstimateReport;
