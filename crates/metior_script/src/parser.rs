//! Pratt expression parser for the cost-script grammar.
//!
//! Operator-precedence parsing with the following binding powers:
//!
//! | BP (L,R)  | Operators |
//! |-----------|-----------|
//! | (1,2)     | `\|\|` |
//! | (3,4)     | `&&` |
//! | (5,6)     | `==` `!=` |
//! | (7,8)     | `<` `<=` `>` `>=` |
//! | (9,10)    | `+` `-` |
//! | (11,12)   | `*` `/` `%` |
//! | (14,13)   | `**` (right-assoc) |
//! | prefix 15 | `-` `!` |
//!
//! Ternary `? :` is handled as a special case at min_bp=0 (right-associative).
//! Function calls are restricted to the closed table in [`crate::eval`].

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::eval::function_arity;
use crate::lexer::{lex, ScriptToken};
use metior_common::{EvalError, EvalResult};

/// Binding power for binary operators. Returns (left_bp, right_bp).
fn infix_binding_power(op: &BinaryOp) -> (u8, u8) {
    match op {
        BinaryOp::Or => (1, 2),
        BinaryOp::And => (3, 4),
        BinaryOp::Eq | BinaryOp::Neq => (5, 6),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => (7, 8),
        BinaryOp::Add | BinaryOp::Sub => (9, 10),
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => (11, 12),
        BinaryOp::Pow => (14, 13), // right-associative
    }
}

/// Parses cost-script source into an expression tree.
///
/// # Errors
///
/// Returns [`EvalError::MalformedScript`] on lex errors, syntax errors,
/// trailing tokens, unknown functions, or wrong function arity.
pub fn parse(source: &str) -> EvalResult<Expr> {
    let tokens = lex(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    let expr = parser.parse_expr_bp(0)?;
    if parser.current() != &ScriptToken::Eof {
        return Err(parser.error(&format!("unexpected trailing token {:?}", parser.current())));
    }
    Ok(expr)
}

struct Parser {
    tokens: Vec<ScriptToken>,
    pos: usize,
}

impl Parser {
    fn current(&self) -> &ScriptToken {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> ScriptToken {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, token: ScriptToken) -> EvalResult<()> {
        if self.current() == &token {
            self.advance();
            Ok(())
        } else {
            Err(self.error(&format!("expected {token:?}, found {:?}", self.current())))
        }
    }

    fn error(&self, msg: &str) -> EvalError {
        EvalError::MalformedScript {
            reason: msg.to_string(),
        }
    }

    fn parse_expr_bp(&mut self, min_bp: u8) -> EvalResult<Expr> {
        let mut lhs = self.parse_prefix_expr()?;

        loop {
            // Ternary `? :` at binding power 0
            if self.current() == &ScriptToken::Question && min_bp == 0 {
                self.advance(); // eat ?
                let then_expr = self.parse_expr_bp(0)?; // right-associative
                self.expect(ScriptToken::Colon)?;
                let else_expr = self.parse_expr_bp(0)?;
                lhs = Expr::Ternary {
                    condition: Box::new(lhs),
                    then_expr: Box::new(then_expr),
                    else_expr: Box::new(else_expr),
                };
                continue;
            }

            let op = match self.current_as_binary_op() {
                Some(op) => op,
                None => break,
            };

            let (l_bp, r_bp) = infix_binding_power(&op);
            if l_bp < min_bp {
                break;
            }

            self.advance(); // consume operator token

            let rhs = self.parse_expr_bp(r_bp)?;
            lhs = Expr::Binary {
                left: Box::new(lhs),
                op,
                right: Box::new(rhs),
            };
        }

        Ok(lhs)
    }

    fn current_as_binary_op(&self) -> Option<BinaryOp> {
        match self.current() {
            ScriptToken::Plus => Some(BinaryOp::Add),
            ScriptToken::Minus => Some(BinaryOp::Sub),
            ScriptToken::Star => Some(BinaryOp::Mul),
            ScriptToken::Slash => Some(BinaryOp::Div),
            ScriptToken::Percent => Some(BinaryOp::Mod),
            ScriptToken::StarStar => Some(BinaryOp::Pow),
            ScriptToken::Lt => Some(BinaryOp::Lt),
            ScriptToken::Le => Some(BinaryOp::Le),
            ScriptToken::Gt => Some(BinaryOp::Gt),
            ScriptToken::Ge => Some(BinaryOp::Ge),
            ScriptToken::EqEq => Some(BinaryOp::Eq),
            ScriptToken::NotEq => Some(BinaryOp::Neq),
            ScriptToken::AndAnd => Some(BinaryOp::And),
            ScriptToken::OrOr => Some(BinaryOp::Or),
            _ => None,
        }
    }

    fn parse_prefix_expr(&mut self) -> EvalResult<Expr> {
        match self.advance() {
            ScriptToken::Minus => {
                let operand = self.parse_expr_bp(15)?;
                Ok(Expr::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(operand),
                })
            }
            ScriptToken::Bang => {
                let operand = self.parse_expr_bp(15)?;
                Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                })
            }
            ScriptToken::Number(n) => Ok(Expr::Number(n)),
            ScriptToken::LeftParen => {
                let inner = self.parse_expr_bp(0)?;
                self.expect(ScriptToken::RightParen)?;
                Ok(inner)
            }
            ScriptToken::Ident(name) => {
                if self.current() == &ScriptToken::LeftParen {
                    self.advance(); // eat (
                    let args = self.parse_call_args()?;
                    let arity = function_arity(&name)
                        .ok_or_else(|| self.error(&format!("unknown function '{name}'")))?;
                    if args.len() != arity {
                        return Err(self.error(&format!(
                            "function '{name}' takes {arity} argument(s), found {}",
                            args.len()
                        )));
                    }
                    Ok(Expr::Call { name, args })
                } else {
                    Ok(Expr::Var(name))
                }
            }
            other => Err(self.error(&format!("unexpected token {other:?}"))),
        }
    }

    fn parse_call_args(&mut self) -> EvalResult<Vec<Expr>> {
        let mut args = Vec::new();
        if self.current() == &ScriptToken::RightParen {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr_bp(0)?);
            match self.advance() {
                ScriptToken::Comma => continue,
                ScriptToken::RightParen => break,
                other => {
                    return Err(self.error(&format!("expected ',' or ')', found {other:?}")));
                }
            }
        }
        Ok(args)
    }
}
