//! The Metior cost-script expression language.
//!
//! Cost scripts are small scalar functions over named arguments, used as the
//! atomic cost model for one (component class, action, feature) triple. This
//! crate compiles script source against a fixed safe grammar — arithmetic,
//! comparisons, named-argument references, and a closed set of math
//! functions — and evaluates the compiled form. There is no general-purpose
//! code execution: anything outside the grammar fails compilation, and a
//! deny-list sandbox scan rejects suspicious source before parsing.

#![warn(missing_docs)]

pub mod ast;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod sandbox;
pub mod script;

pub use ast::{BinaryOp, Expr, UnaryOp};
pub use script::CostScript;
