use std::fmt;
use std::ops::Not;

#[cfg(feature = "persist")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::condition::Condition;
use super::state::EngineState;
use super::tuple::TupleRef;
use super::Value;

/// Comparison operators supported in condition expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "persist", derive(Serialize, Deserialize))]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Left-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "persist", derive(Serialize, Deserialize))]
pub enum Operand {
    /// A field of the nearest fact of type `binding` on the tuple.
    Field { binding: String, path: String },
    /// An engine global.
    Global(String),
}

/// Boolean expression over bound facts and engine globals.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "persist", derive(Serialize, Deserialize))]
pub enum Expr {
    Compare {
        operand: Operand,
        op: CompareOp,
        value: Value,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CompareOp::Eq => "==",
            CompareOp::Neq => "!=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
        };
        f.write_str(symbol)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Field { binding, path } => write!(f, "{binding}.{path}"),
            Operand::Global(name) => write!(f, "${name}"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Compare { operand, op, value } => write!(f, "({operand} {op} {value})"),
            Expr::And(a, b) => write!(f, "({a} AND {b})"),
            Expr::Or(a, b) => write!(f, "({a} OR {b})"),
            Expr::Not(inner) => write!(f, "(NOT {inner})"),
        }
    }
}

impl Expr {
    #[must_use]
    pub fn and(self, other: Expr) -> Expr {
        Expr::And(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn or(self, other: Expr) -> Expr {
        Expr::Or(Box::new(self), Box::new(other))
    }

    fn collect_bindings<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Expr::Compare {
                operand: Operand::Field { binding, .. },
                ..
            } => {
                if !out.contains(&binding.as_str()) {
                    out.push(binding);
                }
            }
            Expr::Compare { .. } => {}
            Expr::And(a, b) | Expr::Or(a, b) => {
                a.collect_bindings(out);
                b.collect_bindings(out);
            }
            Expr::Not(inner) => inner.collect_bindings(out),
        }
    }
}

impl Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

/// A declared pattern binding, created by [`binding()`].
#[derive(Debug, Clone)]
pub struct Binding {
    type_name: String,
}

impl Binding {
    #[must_use]
    pub fn field(self, path: &str) -> OperandExpr {
        OperandExpr {
            operand: Operand::Field {
                binding: self.type_name,
                path: path.to_owned(),
            },
        }
    }
}

/// Intermediate builder; a comparison method turns it into an [`Expr`].
#[derive(Debug, Clone)]
pub struct OperandExpr {
    operand: Operand,
}

impl OperandExpr {
    fn compare(self, op: CompareOp, value: impl Into<Value>) -> Expr {
        Expr::Compare {
            operand: self.operand,
            op,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn eq(self, value: impl Into<Value>) -> Expr {
        self.compare(CompareOp::Eq, value)
    }

    #[must_use]
    pub fn neq(self, value: impl Into<Value>) -> Expr {
        self.compare(CompareOp::Neq, value)
    }

    #[must_use]
    pub fn gt(self, value: impl Into<Value>) -> Expr {
        self.compare(CompareOp::Gt, value)
    }

    #[must_use]
    pub fn gte(self, value: impl Into<Value>) -> Expr {
        self.compare(CompareOp::Gte, value)
    }

    #[must_use]
    pub fn lt(self, value: impl Into<Value>) -> Expr {
        self.compare(CompareOp::Lt, value)
    }

    #[must_use]
    pub fn lte(self, value: impl Into<Value>) -> Expr {
        self.compare(CompareOp::Lte, value)
    }
}

/// Refer to the pattern bound to facts of the fully qualified `type_name`.
#[must_use]
pub fn binding(type_name: &str) -> Binding {
    Binding {
        type_name: type_name.to_owned(),
    }
}

/// Refer to an engine global.
#[must_use]
pub fn global(path: &str) -> OperandExpr {
    OperandExpr {
        operand: Operand::Global(path.to_owned()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("no fact of type '{binding}' is bound on the tuple")]
    UnboundDeclaration { binding: String },
}

/// Number of condition evaluations performed in one firing cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleCounter {
    evaluations: usize,
}

impl CycleCounter {
    #[must_use]
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }
}

/// [`Condition`] backed by an [`Expr`] tree.
///
/// The required binding types are the distinct bindings the expression
/// references, in order of first appearance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "persist",
    derive(Serialize, Deserialize),
    serde(from = "Expr", into = "Expr")
)]
pub struct ExprCondition {
    expr: Expr,
    required: Vec<String>,
}

impl ExprCondition {
    #[must_use]
    pub fn new(expr: Expr) -> Self {
        let mut bindings = Vec::new();
        expr.collect_bindings(&mut bindings);
        let required = bindings.into_iter().map(str::to_owned).collect();
        Self { expr, required }
    }

    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }
}

impl From<Expr> for ExprCondition {
    fn from(expr: Expr) -> Self {
        Self::new(expr)
    }
}

impl From<ExprCondition> for Expr {
    fn from(condition: ExprCondition) -> Self {
        condition.expr
    }
}

impl fmt::Display for ExprCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.expr, f)
    }
}

impl Condition for ExprCondition {
    type Context = CycleCounter;
    type Error = ExprError;

    fn required_types(&self) -> &[String] {
        &self.required
    }

    fn create_context(&self) -> CycleCounter {
        CycleCounter::default()
    }

    fn is_allowed(
        &self,
        tuple: TupleRef<'_>,
        state: &EngineState,
        ctx: &mut CycleCounter,
    ) -> Result<bool, ExprError> {
        ctx.evaluations += 1;
        eval_expr(&self.expr, tuple, state)
    }
}

fn eval_expr(expr: &Expr, tuple: TupleRef<'_>, state: &EngineState) -> Result<bool, ExprError> {
    match expr {
        Expr::Compare { operand, op, value } => {
            let actual = match operand {
                Operand::Field { binding, path } => {
                    let bound = tuple.find_binding(binding).ok_or_else(|| {
                        ExprError::UnboundDeclaration {
                            binding: binding.clone(),
                        }
                    })?;
                    bound.fact().and_then(|fact| fact.get(path))
                }
                Operand::Global(name) => state.global(name),
            };
            Ok(actual
                .and_then(|v| v.compare(*op, value))
                .unwrap_or(false))
        }
        Expr::And(a, b) => Ok(eval_expr(a, tuple, state)? && eval_expr(b, tuple, state)?),
        Expr::Or(a, b) => Ok(eval_expr(a, tuple, state)? || eval_expr(b, tuple, state)?),
        Expr::Not(inner) => Ok(!eval_expr(inner, tuple, state)?),
    }
}
