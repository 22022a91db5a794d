//! Arithmetic over live entity properties and variables.
//!
//! The evaluator never fails past its boundary: every problem becomes a
//! diagnostic and the result falls back to 0. A non-numeric property term
//! (`label.w` on a text) is the one soft failure: it reads as 0 and the rest
//! of the expression still evaluates. Anything else zeroes the whole result.

use crate::error::{ErrorCode, RuntimeError};
use crate::host::{Diagnostic, DiagnosticSink};
use crate::runtime::entity::PropertyError;
use crate::runtime::store::{EntityStore, VariableStore};
use crate::syntax::ast::{BinOp, Expr, ExprSource};

pub struct Evaluator<'a> {
    entities: &'a EntityStore,
    variables: &'a VariableStore,
}

impl<'a> Evaluator<'a> {
    pub fn new(entities: &'a EntityStore, variables: &'a VariableStore) -> Self {
        Self { entities, variables }
    }

    /// Evaluate the right-hand side of an assignment, reporting malformed
    /// source text here rather than at parse time.
    pub fn eval_source(&self, src: &ExprSource, line: usize, sink: &mut dyn DiagnosticSink) -> f64 {
        match &src.parsed {
            Ok(expr) => self.eval_text(expr, &src.text, line, sink),
            Err(err) => {
                sink.report(RuntimeError::new(
                    ErrorCode::E001,
                    line,
                    format!("Error evaluating \"{}\": {}", src.text, err.message),
                ).into());
                0.0
            }
        }
    }

    pub fn eval(&self, expr: &Expr, line: usize, sink: &mut dyn DiagnosticSink) -> f64 {
        self.eval_text(expr, &expr.to_string(), line, sink)
    }

    fn eval_text(&self, expr: &Expr, text: &str, line: usize, sink: &mut dyn DiagnosticSink) -> f64 {
        match self.reduce(expr, line, sink) {
            Ok(n) if n.is_finite() => n,
            Ok(_) => {
                sink.report(RuntimeError::new(
                    ErrorCode::E002,
                    line,
                    format!("Expression \"{text}\" did not evaluate to a number"),
                ).into());
                0.0
            }
            Err(err) => {
                sink.report(Diagnostic::from(RuntimeError::new(
                    err.code,
                    line,
                    format!("Error evaluating \"{text}\": {}", err.message),
                )));
                0.0
            }
        }
    }

    fn reduce(&self, expr: &Expr, line: usize, sink: &mut dyn DiagnosticSink) -> Result<f64, RuntimeError> {
        match expr {
            Expr::Number(n) => Ok(*n),

            Expr::Var(name) => self.variables.get(name)
                .ok_or_else(|| RuntimeError::unknown_variable(line, name)),

            Expr::Property { entity, prop } => {
                let target = self.entities.get(entity)
                    .ok_or_else(|| RuntimeError::unknown_entity(line, entity))?;
                match target.number(prop) {
                    Ok(n) => Ok(n),
                    Err(PropertyError::Unsupported) => {
                        sink.report(RuntimeError::new(
                            ErrorCode::T001,
                            line,
                            format!("Invalid property value for {entity}.{prop}"),
                        ).into());
                        Ok(0.0)
                    }
                    Err(PropertyError::Unknown) => Err(RuntimeError::new(
                        ErrorCode::T002,
                        line,
                        format!("Unknown property \"{prop}\" for entity \"{entity}\""),
                    )),
                }
            }

            Expr::Neg(inner) => Ok(-self.reduce(inner, line, sink)?),

            Expr::Binary { left, op, right } => {
                let l = self.reduce(left, line, sink)?;
                let r = self.reduce(right, line, sink)?;
                Ok(match op {
                    BinOp::Add => l + r,
                    BinOp::Sub => l - r,
                    BinOp::Mul => l * r,
                    BinOp::Div => l / r,
                })
            }
        }
    }
}
