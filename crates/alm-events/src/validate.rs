//! Load-time validation of event definitions.
//!
//! Problems are reported in three severities. Errors block acceptance of
//! the definition; warnings and infos are surfaced for editor display but
//! never block. Query-time code assumes definitions already passed this
//! gate, so it can degrade quietly instead of failing.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use alm_condition::validate_condition;
use alm_rng::SeededRng;

use crate::definition::{ChainDuration, EventDefinition, EventKind};
use crate::error::{EventError, EventResult};

/// Priorities beyond this magnitude are almost certainly typos.
const PRIORITY_WARN_LIMIT: i32 = 1000;

/// How bad a validation finding is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Purely advisory.
    Info,
    /// Suspicious but usable.
    Warning,
    /// Schema-invalid; the definition is rejected.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One finding about one event definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// The id of the definition the finding is about.
    pub event_id: String,
    /// How bad it is.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.event_id, self.message)
    }
}

impl ValidationIssue {
    fn new(event_id: &str, severity: Severity, message: impl Into<String>) -> Self {
        ValidationIssue {
            event_id: event_id.to_string(),
            severity,
            message: message.into(),
        }
    }
}

/// Validate a single definition in isolation.
///
/// Cross-definition checks (duplicate ids, unknown condition references)
/// live in [`validate_definitions`].
pub fn validate_definition(def: &EventDefinition) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let id = def.id.as_str();

    if def.id.trim().is_empty() {
        issues.push(ValidationIssue::new(id, Severity::Error, "missing id"));
    }
    if def.name.trim().is_empty() {
        issues.push(ValidationIssue::new(id, Severity::Error, "missing name"));
    }
    if def.priority < 0 {
        issues.push(ValidationIssue::new(
            id,
            Severity::Warning,
            format!("negative priority {}", def.priority),
        ));
    } else if def.priority > PRIORITY_WARN_LIMIT {
        issues.push(ValidationIssue::new(
            id,
            Severity::Warning,
            format!("unusually high priority {}", def.priority),
        ));
    }
    if def.effects.is_empty() && base_effects_expected(&def.kind) {
        issues.push(ValidationIssue::new(
            id,
            Severity::Info,
            "event contributes no effects",
        ));
    }

    match &def.kind {
        EventKind::Fixed {
            date,
            year,
            duration,
        } => {
            let has_standard = date.month.is_some() || date.day.is_some();
            let has_intercalary = date.intercalary.is_some();
            match (date.month.is_some() && date.day.is_some(), has_intercalary) {
                (false, false) if has_standard => issues.push(ValidationIssue::new(
                    id,
                    Severity::Error,
                    "fixed date needs both month and day",
                )),
                (false, false) => issues.push(ValidationIssue::new(
                    id,
                    Severity::Error,
                    "fixed event has no date",
                )),
                (true, true) => issues.push(ValidationIssue::new(
                    id,
                    Severity::Warning,
                    "date specifies both a standard date and an intercalary name; the standard date wins",
                )),
                _ => {}
            }
            if let Some(day) = date.day
                && day < 1
            {
                issues.push(ValidationIssue::new(
                    id,
                    Severity::Error,
                    format!("day of month {day} must be at least 1"),
                ));
            }
            if *duration < 1 {
                issues.push(ValidationIssue::new(
                    id,
                    Severity::Error,
                    format!("duration {duration} must be at least 1"),
                ));
            }
            if year.is_some() {
                issues.push(ValidationIssue::new(
                    id,
                    Severity::Info,
                    "year-pinned fixed event occurs exactly once",
                ));
            }
        }
        EventKind::Interval {
            interval, duration, ..
        } => {
            if *interval < 1 {
                issues.push(ValidationIssue::new(
                    id,
                    Severity::Error,
                    format!("interval {interval} must be at least 1"),
                ));
            }
            if *duration < 1 {
                issues.push(ValidationIssue::new(
                    id,
                    Severity::Error,
                    format!("duration {duration} must be at least 1"),
                ));
            } else if *duration > *interval && *interval >= 1 {
                issues.push(ValidationIssue::new(
                    id,
                    Severity::Warning,
                    "duration exceeds interval; the event is always active",
                ));
            }
        }
        EventKind::Chain {
            initial_state,
            states,
            ..
        } => {
            if states.is_empty() {
                issues.push(ValidationIssue::new(
                    id,
                    Severity::Error,
                    "chain has no states",
                ));
            }
            let mut seen = HashSet::new();
            for state in states {
                if !seen.insert(state.name.as_str()) {
                    issues.push(ValidationIssue::new(
                        id,
                        Severity::Error,
                        format!("duplicate chain state name '{}'", state.name),
                    ));
                }
                if !(state.weight.is_finite() && state.weight >= 0.0) {
                    issues.push(ValidationIssue::new(
                        id,
                        Severity::Error,
                        format!("state '{}' has invalid weight {}", state.name, state.weight),
                    ));
                }
                match &state.duration {
                    ChainDuration::Days(n) if *n < 1 => issues.push(ValidationIssue::new(
                        id,
                        Severity::Error,
                        format!("state '{}' duration {n} must be at least 1", state.name),
                    )),
                    ChainDuration::Dice(notation)
                        if !SeededRng::new(0).roll_dice(notation).valid =>
                    {
                        issues.push(ValidationIssue::new(
                            id,
                            Severity::Error,
                            format!(
                                "state '{}' has malformed dice notation '{notation}'",
                                state.name
                            ),
                        ));
                    }
                    _ => {}
                }
            }
            if let Some(initial) = initial_state
                && !states.iter().any(|s| &s.name == initial)
            {
                issues.push(ValidationIssue::new(
                    id,
                    Severity::Error,
                    format!("initial state '{initial}' is not a declared state"),
                ));
            }
        }
        EventKind::Conditional {
            condition,
            tier,
            duration,
        } => {
            if !(*tier == 1 || *tier == 2) {
                issues.push(ValidationIssue::new(
                    id,
                    Severity::Error,
                    format!("tier {tier} must be 1 or 2"),
                ));
            }
            if *duration < 1 {
                issues.push(ValidationIssue::new(
                    id,
                    Severity::Error,
                    format!("duration {duration} must be at least 1"),
                ));
            }
            let report = validate_condition(condition, None);
            for error in report.errors {
                issues.push(ValidationIssue::new(
                    id,
                    Severity::Error,
                    format!("condition: {error}"),
                ));
            }
        }
    }

    issues
}

fn base_effects_expected(kind: &EventKind) -> bool {
    // Chain events usually carry effects on their states instead.
    match kind {
        EventKind::Chain { states, .. } => states.iter().all(|s| s.effects.is_empty()),
        _ => true,
    }
}

/// Validate a full definition set, including cross-definition checks.
///
/// On top of the per-definition findings this flags duplicate event ids
/// (error) and conditions referencing ids absent from the set (warning).
pub fn validate_definitions(defs: &[EventDefinition]) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let known_ids: BTreeSet<String> = defs.iter().map(|d| d.id.clone()).collect();

    let mut seen = HashSet::new();
    for def in defs {
        if !seen.insert(def.id.as_str()) {
            issues.push(ValidationIssue::new(
                &def.id,
                Severity::Error,
                "duplicate event id",
            ));
        }
        issues.extend(validate_definition(def));
        if let EventKind::Conditional { condition, .. } = &def.kind {
            let report = validate_condition(condition, Some(&known_ids));
            for warning in report.warnings {
                issues.push(ValidationIssue::new(&def.id, Severity::Warning, warning));
            }
        }
    }
    issues
}

/// Error-severity findings rendered for UI display.
pub fn validation_errors(defs: &[EventDefinition]) -> Vec<String> {
    validate_definitions(defs)
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .map(ValidationIssue::to_string)
        .collect()
}

/// Validate and fail hard if any error-severity finding exists.
pub fn validate_or_reject(defs: &[EventDefinition]) -> EventResult<Vec<ValidationIssue>> {
    let issues = validate_definitions(defs);
    let errors: Vec<String> = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .map(ValidationIssue::to_string)
        .collect();
    if errors.is_empty() {
        Ok(issues)
    } else {
        Err(EventError::ValidationFailed(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{ChainState, EffectValue, FixedDate};
    use std::collections::BTreeMap;

    fn base(id: &str, kind: EventKind) -> EventDefinition {
        EventDefinition {
            id: id.to_string(),
            name: id.to_string(),
            priority: 0,
            effects: [("ui_banner".to_string(), EffectValue::Text("x".to_string()))]
                .into_iter()
                .collect(),
            locations: Vec::new(),
            factions: Vec::new(),
            seasons: Vec::new(),
            regions: Vec::new(),
            tags: Vec::new(),
            kind,
        }
    }

    fn errors_of(issues: &[ValidationIssue]) -> Vec<&str> {
        issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .map(|i| i.message.as_str())
            .collect()
    }

    #[test]
    fn clean_definition_has_no_findings() {
        let def = base(
            "market",
            EventKind::Interval {
                interval: 10,
                offset: 0,
                duration: 2,
                use_minutes: false,
            },
        );
        assert!(validate_definition(&def).is_empty());
    }

    #[test]
    fn missing_date_is_an_error() {
        let def = base(
            "festival",
            EventKind::Fixed {
                date: FixedDate::default(),
                year: None,
                duration: 1,
            },
        );
        assert_eq!(errors_of(&validate_definition(&def)), ["fixed event has no date"]);
    }

    #[test]
    fn ambiguous_date_is_a_warning() {
        let def = base(
            "festival",
            EventKind::Fixed {
                date: FixedDate {
                    month: Some(0),
                    day: Some(1),
                    intercalary: Some("Midwinter".to_string()),
                },
                year: None,
                duration: 1,
            },
        );
        let issues = validate_definition(&def);
        assert!(errors_of(&issues).is_empty());
        assert!(issues.iter().any(|i| i.severity == Severity::Warning));
    }

    #[test]
    fn year_pin_is_informational() {
        let def = base(
            "eclipse",
            EventKind::Fixed {
                date: FixedDate {
                    month: Some(3),
                    day: Some(10),
                    intercalary: None,
                },
                year: Some(1371),
                duration: 1,
            },
        );
        let issues = validate_definition(&def);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Info);
    }

    #[test]
    fn chain_errors() {
        let state = |name: &str, weight: f64| ChainState {
            name: name.to_string(),
            weight,
            duration: ChainDuration::Days(2),
            effects: BTreeMap::new(),
        };
        let def = base(
            "weather",
            EventKind::Chain {
                seed: 1,
                initial_state: Some("Foggy".to_string()),
                states: vec![state("Clear", 60.0), state("Clear", -1.0)],
            },
        );
        let issues = validate_definition(&def);
        let errors = errors_of(&issues);
        assert!(errors.iter().any(|m| m.contains("duplicate chain state")));
        assert!(errors.iter().any(|m| m.contains("invalid weight")));
        assert!(errors.iter().any(|m| m.contains("not a declared state")));
    }

    #[test]
    fn malformed_dice_duration_is_an_error() {
        let def = base(
            "weather",
            EventKind::Chain {
                seed: 1,
                initial_state: None,
                states: vec![ChainState {
                    name: "Clear".to_string(),
                    weight: 1.0,
                    duration: ChainDuration::Dice("banana".to_string()),
                    effects: BTreeMap::new(),
                }],
            },
        );
        assert!(errors_of(&validate_definition(&def))
            .iter()
            .any(|m| m.contains("malformed dice notation")));
    }

    #[test]
    fn bad_tier_and_bad_condition() {
        let def = base(
            "haunting",
            EventKind::Conditional {
                condition: "events['a'].active &&".to_string(),
                tier: 3,
                duration: 1,
            },
        );
        let result = validate_definition(&def);
        let errors = errors_of(&result);
        assert!(errors.iter().any(|m| m.contains("tier 3")));
        assert!(errors.iter().any(|m| m.starts_with("condition:")));
    }

    #[test]
    fn duplicate_ids_rejected_across_the_set() {
        let kind = EventKind::Interval {
            interval: 5,
            offset: 0,
            duration: 1,
            use_minutes: false,
        };
        let defs = vec![base("e", kind.clone()), base("e", kind)];
        let result = validate_or_reject(&defs);
        let Err(EventError::ValidationFailed(errors)) = result else {
            panic!("expected rejection");
        };
        assert!(errors.iter().any(|m| m.contains("duplicate event id")));
    }

    #[test]
    fn unknown_condition_reference_is_a_warning() {
        let defs = vec![base(
            "haunting",
            EventKind::Conditional {
                condition: "events['ghost'].active".to_string(),
                tier: 1,
                duration: 1,
            },
        )];
        let issues = validate_definitions(&defs);
        assert!(errors_of(&issues).is_empty());
        assert!(issues
            .iter()
            .any(|i| i.severity == Severity::Warning && i.message.contains("ghost")));
    }

    #[test]
    fn priority_extremes_warn_but_pass() {
        let mut def = base(
            "e",
            EventKind::Interval {
                interval: 5,
                offset: 0,
                duration: 1,
                use_minutes: false,
            },
        );
        def.priority = -5;
        assert!(validate_definition(&def)
            .iter()
            .all(|i| i.severity == Severity::Warning));
        def.priority = 100_000;
        assert!(validate_definition(&def)
            .iter()
            .any(|i| i.message.contains("unusually high priority")));
    }
}
