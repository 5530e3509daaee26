//! [`CostScript`] — a compiled, parameterized scalar cost function.

use crate::ast::Expr;
use crate::eval::evaluate;
use crate::parser::parse;
use crate::sandbox::check_clean;
use indexmap::IndexMap;
use metior_common::{ArgBindings, ArgValue, EvalError, EvalResult};
use std::sync::atomic::{AtomicU64, Ordering};

/// The atomic cost model for one (component class, action, feature) triple.
///
/// A cost script is compiled once from source at library-load time and is
/// immutable thereafter: a stateless pure function of its arguments. Every
/// parameter carries a default, so a script is always evaluable with no
/// runtime overrides.
///
/// The execution counter exists for test instrumentation (memoization
/// correctness is observable as "no second execution") and has no effect on
/// results.
#[derive(Debug)]
pub struct CostScript {
    params: Vec<String>,
    defaults: IndexMap<String, f64>,
    body: Expr,
    executions: AtomicU64,
}

impl Clone for CostScript {
    fn clone(&self) -> Self {
        // Clones are independent value copies; the counter starts fresh.
        Self {
            params: self.params.clone(),
            defaults: self.defaults.clone(),
            body: self.body.clone(),
            executions: AtomicU64::new(0),
        }
    }
}

impl PartialEq for CostScript {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params && self.defaults == other.defaults && self.body == other.body
    }
}

impl CostScript {
    /// Compiles a cost script from source and its parameter list.
    ///
    /// Each parameter is a `(name, default_source)` pair; defaults must be
    /// constant expressions and are evaluated here, once. The sandbox scan
    /// runs over the body, every parameter name, and every default before
    /// anything is parsed.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::UnsafeScript`] on a sandbox violation,
    /// [`EvalError::MalformedScript`] on a parse failure or a non-constant
    /// default.
    pub fn compile(body_src: &str, params: &[(String, String)]) -> EvalResult<Self> {
        check_clean(body_src)?;
        for (name, default_src) in params {
            check_clean(name)?;
            check_clean(default_src)?;
        }

        let empty = IndexMap::new();
        let mut defaults = IndexMap::new();
        for (name, default_src) in params {
            let value = parse(default_src).and_then(|e| evaluate(&e, &empty)).map_err(|_| {
                EvalError::MalformedScript {
                    reason: format!("default for '{name}' is not a constant expression"),
                }
            })?;
            defaults.insert(name.clone(), value);
        }

        Ok(Self {
            params: params.iter().map(|(n, _)| n.clone()).collect(),
            defaults,
            body: parse(body_src)?,
            executions: AtomicU64::new(0),
        })
    }

    /// A script that evaluates to a constant, used for implicit idle entries.
    pub fn constant(value: f64) -> Self {
        Self {
            params: Vec::new(),
            defaults: IndexMap::new(),
            body: Expr::Number(value),
            executions: AtomicU64::new(0),
        }
    }

    /// The declared parameter names, in order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Executes the script with the given runtime argument bindings.
    ///
    /// Runtime overrides win over defaults; bindings that do not name a
    /// declared parameter are ignored. Textual binding values are
    /// interpreted as constant expressions (with the defaults in scope) and
    /// are subject to the same sandbox scan as script source.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::UndefinedArgument`] if the body references a
    /// name with neither a default nor an override.
    pub fn execute(&self, runtime_args: &ArgBindings) -> EvalResult<f64> {
        let mut env = self.defaults.clone();
        for (name, value) in runtime_args {
            if !self.params.contains(name) {
                continue;
            }
            let resolved = match value {
                ArgValue::Number(n) => *n,
                ArgValue::Text(text) => {
                    check_clean(text)?;
                    let expr = parse(text)?;
                    evaluate(&expr, &env)?
                }
            };
            env.insert(name.clone(), resolved);
        }
        self.executions.fetch_add(1, Ordering::Relaxed);
        evaluate(&self.body, &env)
    }

    /// How many times [`execute`](Self::execute) has run on this instance.
    pub fn execution_count(&self) -> u64 {
        self.executions.load(Ordering::Relaxed)
    }
}
