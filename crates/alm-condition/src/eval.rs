//! Snapshot types and the tree-walking evaluator.

use std::collections::{BTreeMap, BTreeSet};

use crate::ast::{EventField, Expr, Value};

/// One event's visible state within a per-day activation snapshot.
#[derive(Debug, Clone, Default)]
pub struct EventSnapshot {
    /// Whether the event is active.
    pub active: bool,
    /// The event's current state name (chain events), empty otherwise.
    pub state: String,
    /// The effect values the event currently contributes.
    pub effects: BTreeMap<String, Value>,
}

/// The outcome of evaluating a condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// The boolean result.
    pub result: bool,
    /// Referenced event ids that were absent from the snapshot, sorted and
    /// deduplicated. Only branches that were actually evaluated count.
    pub missing_event_ids: Vec<String>,
}

/// Evaluate a parsed condition against an activation snapshot.
///
/// Referencing an unknown event id never fails: it reads as
/// `active = false` / `state = ""` / effect `false`, and the id is
/// reported in [`Evaluation::missing_event_ids`]. `&&` and `||`
/// short-circuit.
pub fn evaluate_condition(expr: &Expr, snapshot: &BTreeMap<String, EventSnapshot>) -> Evaluation {
    let mut missing = BTreeSet::new();
    let result = eval(expr, snapshot, &mut missing).truthy();
    Evaluation {
        result,
        missing_event_ids: missing.into_iter().collect(),
    }
}

fn eval(
    expr: &Expr,
    snapshot: &BTreeMap<String, EventSnapshot>,
    missing: &mut BTreeSet<String>,
) -> Value {
    match expr {
        Expr::Bool(b) => Value::Bool(*b),
        Expr::Number(n) => Value::Number(*n),
        Expr::Str(s) => Value::Str(s.clone()),
        Expr::EventRef { event_id, field } => {
            let Some(snap) = snapshot.get(event_id) else {
                missing.insert(event_id.clone());
                return match field {
                    EventField::Active | EventField::Effect(_) => Value::Bool(false),
                    EventField::State => Value::Str(String::new()),
                };
            };
            match field {
                EventField::Active => Value::Bool(snap.active),
                EventField::State => Value::Str(snap.state.clone()),
                EventField::Effect(key) => match snap.effects.get(key) {
                    Some(value) => value.clone(),
                    None => Value::Bool(false),
                },
            }
        }
        Expr::Not(inner) => Value::Bool(!eval(inner, snapshot, missing).truthy()),
        Expr::And(lhs, rhs) => {
            if !eval(lhs, snapshot, missing).truthy() {
                return Value::Bool(false);
            }
            Value::Bool(eval(rhs, snapshot, missing).truthy())
        }
        Expr::Or(lhs, rhs) => {
            if eval(lhs, snapshot, missing).truthy() {
                return Value::Bool(true);
            }
            Value::Bool(eval(rhs, snapshot, missing).truthy())
        }
        Expr::Cmp { op, lhs, rhs } => {
            let left = eval(lhs, snapshot, missing);
            let right = eval(rhs, snapshot, missing);
            Value::Bool(left.compare(*op, &right))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_condition;

    fn snapshot(entries: &[(&str, bool, &str)]) -> BTreeMap<String, EventSnapshot> {
        entries
            .iter()
            .map(|(id, active, state)| {
                (
                    id.to_string(),
                    EventSnapshot {
                        active: *active,
                        state: state.to_string(),
                        effects: BTreeMap::new(),
                    },
                )
            })
            .collect()
    }

    fn check(source: &str, snap: &BTreeMap<String, EventSnapshot>) -> Evaluation {
        evaluate_condition(&parse_condition(source).unwrap(), snap)
    }

    #[test]
    fn active_reference() {
        let snap = snapshot(&[("a", true, "")]);
        assert!(check("events['a'].active", &snap).result);
        assert!(!check("!events['a'].active", &snap).result);
    }

    #[test]
    fn state_comparison() {
        let snap = snapshot(&[("weather", true, "Rainy")]);
        assert!(check("events['weather'].state == 'Rainy'", &snap).result);
        assert!(!check("events['weather'].state == 'Clear'", &snap).result);
        assert!(check("events['weather'].state != 'Clear'", &snap).result);
    }

    #[test]
    fn conjunction_of_references() {
        let snap = snapshot(&[("a", true, ""), ("b", true, "Dip")]);
        assert!(check("events['a'].active && events['b'].state == 'Dip'", &snap).result);
        let snap = snapshot(&[("a", false, ""), ("b", true, "Dip")]);
        assert!(!check("events['a'].active && events['b'].state == 'Dip'", &snap).result);
    }

    #[test]
    fn unknown_event_degrades_to_false() {
        let snap = snapshot(&[]);
        let eval = check("events['ghost'].active", &snap);
        assert!(!eval.result);
        assert_eq!(eval.missing_event_ids, vec!["ghost"]);
    }

    #[test]
    fn unknown_event_state_reads_empty() {
        let snap = snapshot(&[]);
        assert!(check("events['ghost'].state == ''", &snap).result);
    }

    #[test]
    fn short_circuit_skips_missing_collection() {
        let snap = snapshot(&[("a", true, "")]);
        // `||` short-circuits on the first operand, so the unknown id on
        // the right is never touched.
        let eval = check("events['a'].active || events['ghost'].active", &snap);
        assert!(eval.result);
        assert!(eval.missing_event_ids.is_empty());

        let eval = check("!events['a'].active && events['ghost'].active", &snap);
        assert!(!eval.result);
        assert!(eval.missing_event_ids.is_empty());
    }

    #[test]
    fn effect_lookup() {
        let mut snap = snapshot(&[("market", true, "")]);
        snap.get_mut("market")
            .unwrap()
            .effects
            .insert("price_mult_global".to_string(), Value::Number(1.5));
        assert!(check("events['market'].effects['price_mult_global'] > 1.2", &snap).result);
        assert!(!check("events['market'].effects['absent'] == true", &snap).result);
    }

    #[test]
    fn numeric_literals_compare() {
        let snap = snapshot(&[]);
        assert!(check("2 >= 2", &snap).result);
        assert!(check("1.5 < 2", &snap).result);
        assert!(!check("3 == 4", &snap).result);
    }

    #[test]
    fn missing_ids_are_sorted_and_deduped() {
        let snap = snapshot(&[]);
        let eval = check(
            "events['z'].active == events['a'].active && events['z'].state == ''",
            &snap,
        );
        assert_eq!(eval.missing_event_ids, vec!["a", "z"]);
    }
}
