//! Evaluation of compiled cost-script expressions.
//!
//! Evaluation is a pure function of the expression and the argument
//! environment. Comparisons and logical operators yield 1.0/0.0; any value
//! other than 0.0 is truthy.

use crate::ast::{BinaryOp, Expr, UnaryOp};
use indexmap::IndexMap;
use metior_common::{EvalError, EvalResult};

/// Returns the arity of a built-in function, or `None` if unknown.
///
/// The function table is closed: `abs`, `ceil`, `floor`, `round`, `sqrt`,
/// `exp`, `ln`, `log2` take one argument; `min`, `max`, `pow` take two.
pub fn function_arity(name: &str) -> Option<usize> {
    match name {
        "abs" | "ceil" | "floor" | "round" | "sqrt" | "exp" | "ln" | "log2" => Some(1),
        "min" | "max" | "pow" => Some(2),
        _ => None,
    }
}

/// Evaluates an expression against an argument environment.
///
/// # Errors
///
/// Returns [`EvalError::UndefinedArgument`] if the expression references a
/// name not present in the environment.
pub fn evaluate(expr: &Expr, env: &IndexMap<String, f64>) -> EvalResult<f64> {
    match expr {
        Expr::Number(n) => Ok(*n),
        Expr::Var(name) => env.get(name).copied().ok_or_else(|| {
            EvalError::UndefinedArgument {
                name: name.clone(),
            }
        }),
        Expr::Unary { op, operand } => {
            let v = evaluate(operand, env)?;
            Ok(match op {
                UnaryOp::Neg => -v,
                UnaryOp::Not => {
                    if v == 0.0 {
                        1.0
                    } else {
                        0.0
                    }
                }
            })
        }
        Expr::Binary { left, op, right } => {
            // Short-circuit logical operators before evaluating the right side.
            match op {
                BinaryOp::And => {
                    let l = evaluate(left, env)?;
                    if l == 0.0 {
                        return Ok(0.0);
                    }
                    return Ok(bool_to_f64(evaluate(right, env)? != 0.0));
                }
                BinaryOp::Or => {
                    let l = evaluate(left, env)?;
                    if l != 0.0 {
                        return Ok(1.0);
                    }
                    return Ok(bool_to_f64(evaluate(right, env)? != 0.0));
                }
                _ => {}
            }
            let l = evaluate(left, env)?;
            let r = evaluate(right, env)?;
            Ok(match op {
                BinaryOp::Add => l + r,
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                BinaryOp::Div => l / r,
                BinaryOp::Mod => l % r,
                BinaryOp::Pow => l.powf(r),
                BinaryOp::Lt => bool_to_f64(l < r),
                BinaryOp::Le => bool_to_f64(l <= r),
                BinaryOp::Gt => bool_to_f64(l > r),
                BinaryOp::Ge => bool_to_f64(l >= r),
                BinaryOp::Eq => bool_to_f64(l == r),
                BinaryOp::Neq => bool_to_f64(l != r),
                BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
            })
        }
        Expr::Ternary {
            condition,
            then_expr,
            else_expr,
        } => {
            if evaluate(condition, env)? != 0.0 {
                evaluate(then_expr, env)
            } else {
                evaluate(else_expr, env)
            }
        }
        Expr::Call { name, args } => {
            let values: Vec<f64> = args
                .iter()
                .map(|a| evaluate(a, env))
                .collect::<EvalResult<_>>()?;
            Ok(match name.as_str() {
                "abs" => values[0].abs(),
                "ceil" => values[0].ceil(),
                "floor" => values[0].floor(),
                "round" => values[0].round(),
                "sqrt" => values[0].sqrt(),
                "exp" => values[0].exp(),
                "ln" => values[0].ln(),
                "log2" => values[0].log2(),
                "min" => values[0].min(values[1]),
                "max" => values[0].max(values[1]),
                "pow" => values[0].powf(values[1]),
                other => {
                    // The parser only admits names from the closed table.
                    return Err(EvalError::MalformedScript {
                        reason: format!("unknown function '{other}'"),
                    });
                }
            })
        }
    }
}

fn bool_to_f64(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}
