//! Common error and result types for cost evaluation.

/// The standard result type for fallible evaluation operations.
///
/// All variants of [`EvalError`] are local precondition failures: evaluation
/// is deterministic and pure, so a failing call aborts that single
/// evaluation without corrupting component state, and no retry semantics
/// apply. A batch sweep over many parameter combinations can skip the
/// failing combination and continue.
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors raised during cost-script construction or cost evaluation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// An operation referenced a component not present in the architecture.
    #[error("unknown component '{name}'")]
    UnknownComponent {
        /// The component name that failed to resolve.
        name: String,
    },

    /// A component has no operation with the requested name.
    #[error("component '{component}' has no operation '{operation}'")]
    UnknownOperation {
        /// The component whose operation table was consulted.
        component: String,
        /// The operation name that was not found.
        operation: String,
    },

    /// A script argument was referenced with neither a default nor an override.
    #[error("undefined script argument '{name}'")]
    UndefinedArgument {
        /// The argument name with no binding.
        name: String,
    },

    /// A script violated the sandbox policy at construction time.
    #[error("unsafe script rejected: {reason}")]
    UnsafeScript {
        /// Why the sandbox rejected the script.
        reason: String,
    },

    /// A script body or default failed to parse against the safe grammar.
    #[error("malformed script: {reason}")]
    MalformedScript {
        /// Description of the parse failure.
        reason: String,
    },

    /// An operation definition could not be parsed or resolved.
    #[error("malformed operation: {reason}")]
    MalformedOperation {
        /// Description of the malformed definition.
        reason: String,
    },

    /// Evaluation was requested before required setup was performed.
    #[error("not initialized: {what}")]
    NotInitialized {
        /// The missing prerequisite.
        what: String,
    },
}

impl EvalError {
    /// Creates an [`EvalError::UnknownComponent`] for the given name.
    pub fn unknown_component(name: impl Into<String>) -> Self {
        Self::UnknownComponent { name: name.into() }
    }

    /// Creates an [`EvalError::UnknownOperation`] for the given pair.
    pub fn unknown_operation(component: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::UnknownOperation {
            component: component.into(),
            operation: operation.into(),
        }
    }

    /// Creates an [`EvalError::MalformedOperation`] with the given reason.
    pub fn malformed_operation(reason: impl Into<String>) -> Self {
        Self::MalformedOperation {
            reason: reason.into(),
        }
    }
}
