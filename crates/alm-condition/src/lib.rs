//! Boolean condition DSL for Almanac event definitions.
//!
//! A small, safe expression language over other events' state:
//!
//! ```text
//! events['eclipse'].active && events['weather'].state == 'Rainy'
//! ```
//!
//! Hand-rolled tokenizer → recursive-descent parser → tree-walking
//! evaluator. There is deliberately no dynamic code execution: the grammar
//! is closed, and referencing an unknown event degrades to `false` rather
//! than failing, so a partially connected event graph stays queryable.

/// Expression tree and runtime values.
pub mod ast;
/// Error types for the condition crate.
pub mod error;
/// Snapshot types and the tree-walking evaluator.
pub mod eval;
/// Token definitions and the logos-based lexer.
pub mod lexer;
/// Recursive-descent parser over the token stream.
pub mod parser;

pub use ast::{CmpOp, EventField, Expr, Value};
pub use error::{ConditionError, ConditionResult};
pub use eval::{Evaluation, EventSnapshot, evaluate_condition};
pub use parser::parse_condition;

use std::collections::BTreeSet;

/// Collect every event id referenced by an expression, sorted and deduped.
pub fn extract_event_references(expr: &Expr) -> Vec<String> {
    fn walk(expr: &Expr, out: &mut BTreeSet<String>) {
        match expr {
            Expr::EventRef { event_id, .. } => {
                out.insert(event_id.clone());
            }
            Expr::Not(inner) => walk(inner, out),
            Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) => {
                walk(lhs, out);
                walk(rhs, out);
            }
            Expr::Cmp { lhs, rhs, .. } => {
                walk(lhs, out);
                walk(rhs, out);
            }
            Expr::Bool(_) | Expr::Number(_) | Expr::Str(_) => {}
        }
    }
    let mut ids = BTreeSet::new();
    walk(expr, &mut ids);
    ids.into_iter().collect()
}

/// The outcome of validating a condition source string.
///
/// Syntax problems are errors; references to unknown event ids are
/// warnings, never hard failures.
#[derive(Debug, Clone, Default)]
pub struct ConditionReport {
    /// Problems that make the condition unusable.
    pub errors: Vec<String>,
    /// Suspicious but non-blocking findings.
    pub warnings: Vec<String>,
    /// Every event id the condition references.
    pub references: Vec<String>,
}

impl ConditionReport {
    /// `true` when the condition parsed without errors.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate a condition, optionally cross-checking referenced event ids
/// against a known-id set.
pub fn validate_condition(source: &str, known_ids: Option<&BTreeSet<String>>) -> ConditionReport {
    let mut report = ConditionReport::default();
    let expr = match parse_condition(source) {
        Ok(expr) => expr,
        Err(e) => {
            report.errors.push(e.to_string());
            return report;
        }
    };
    report.references = extract_event_references(&expr);
    if let Some(known) = known_ids {
        for id in &report.references {
            if !known.contains(id) {
                report
                    .warnings
                    .push(format!("condition references unknown event '{id}'"));
            }
        }
    }
    report
}
