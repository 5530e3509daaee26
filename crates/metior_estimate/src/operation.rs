//! The operation DSL: serial, parallel, and pipelined component calls.
//!
//! Operations reference components by name; resolution happens at
//! evaluation time, not construction time, so an invalid reference is a
//! runtime error rather than a structural invariant violation. The serde
//! [`OperationSpec`] types are what external description loaders produce
//! (after expanding any looping constructs into a flat sequence); they are
//! parsed into the resolved [`Operation`] form once, up front.

use metior_common::{parse_method_notation, ArgBindings, ArgValue, EvalResult};
use serde::Deserialize;

/// One resolved component call: `target.method(args)`.
#[derive(Debug, Clone, PartialEq)]
pub struct OpCall {
    /// The target component name.
    pub target: String,
    /// The method (operation) name on the target.
    pub method: String,
    /// Runtime argument bindings for the call.
    pub args: ArgBindings,
}

impl OpCall {
    /// Parses method notation into a call, requiring a target component.
    pub fn parse(notation: &str) -> EvalResult<Self> {
        let call = parse_method_notation(notation)?;
        let target = call.require_target()?.to_string();
        let args = call
            .args
            .iter()
            .map(|(k, v)| (k.clone(), ArgValue::Text(v.clone())))
            .collect();
        Ok(Self {
            target,
            method: call.method,
            args,
        })
    }
}

/// One stage of a pipelined operation.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineStage {
    /// The stage's component call.
    pub call: OpCall,
    /// How many times the stage repeats.
    pub count: u64,
    /// Latency added before this stage's contribution.
    pub offset: u64,
    /// Spacing multiplier between repetitions.
    pub stride: u64,
}

/// A single entry of the flattened operation list.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// One component call.
    Serial {
        /// The call.
        call: OpCall,
        /// Whole-operation repeat factor.
        repeat: u64,
    },
    /// Several component calls executing together.
    Parallel {
        /// The calls.
        calls: Vec<OpCall>,
        /// Whole-operation repeat factor.
        repeat: u64,
    },
    /// An ordered list of staggered, possibly overlapping stages.
    Pipeline {
        /// The stages, in issue order.
        stages: Vec<PipelineStage>,
        /// Whole-operation repeat factor.
        repeat: u64,
    },
}

impl Operation {
    /// The whole-operation repeat factor.
    pub fn repeat(&self) -> u64 {
        match self {
            Operation::Serial { repeat, .. }
            | Operation::Parallel { repeat, .. }
            | Operation::Pipeline { repeat, .. } => *repeat,
        }
    }

    /// Resolves a description entry into an operation.
    pub fn from_spec(spec: &OperationSpec) -> EvalResult<Self> {
        match spec {
            OperationSpec::Serial {
                operation,
                operation_times,
            } => Ok(Operation::Serial {
                call: OpCall::parse(operation)?,
                repeat: *operation_times,
            }),
            OperationSpec::Parallel {
                operations,
                operation_times,
            } => Ok(Operation::Parallel {
                calls: operations
                    .iter()
                    .map(|n| OpCall::parse(n))
                    .collect::<EvalResult<_>>()?,
                repeat: *operation_times,
            }),
            OperationSpec::Pipeline {
                stages,
                operation_times,
            } => Ok(Operation::Pipeline {
                stages: stages
                    .iter()
                    .map(|s| {
                        Ok(PipelineStage {
                            call: OpCall::parse(&s.operation)?,
                            count: s.count,
                            offset: s.offset,
                            stride: s.stride,
                        })
                    })
                    .collect::<EvalResult<_>>()?,
                repeat: *operation_times,
            }),
        }
    }

    /// Resolves a whole description list.
    pub fn parse_list(specs: &[OperationSpec]) -> EvalResult<Vec<Operation>> {
        specs.iter().map(Operation::from_spec).collect()
    }
}

/// A description-level operation entry, as produced by external loaders.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OperationSpec {
    /// A serial entry.
    Serial {
        /// The call, in method notation.
        operation: String,
        /// Whole-operation repeat factor.
        #[serde(default = "default_one", rename = "operation-times")]
        operation_times: u64,
    },
    /// A parallel entry.
    Parallel {
        /// The calls, in method notation.
        operations: Vec<String>,
        /// Whole-operation repeat factor.
        #[serde(default = "default_one", rename = "operation-times")]
        operation_times: u64,
    },
    /// A pipelined entry.
    Pipeline {
        /// The stages, in issue order.
        stages: Vec<StageSpec>,
        /// Whole-operation repeat factor.
        #[serde(default = "default_one", rename = "operation-times")]
        operation_times: u64,
    },
}

/// A description-level pipeline stage.
#[derive(Debug, Clone, Deserialize)]
pub struct StageSpec {
    /// The stage call, in method notation.
    pub operation: String,
    /// How many times the stage repeats.
    #[serde(default = "default_one")]
    pub count: u64,
    /// Latency added before this stage's contribution.
    #[serde(default = "default_one")]
    pub offset: u64,
    /// Spacing multiplier between repetitions.
    #[serde(default = "default_one")]
    pub stride: u64,
}

fn default_one() -> u64 {
    1
}
