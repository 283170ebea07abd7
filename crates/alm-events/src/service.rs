//! The world event service: per-day activation queries over a definition
//! set, on top of a calendar driver.
//!
//! Queries are pure functions of the definitions plus the cached chain
//! checkpoints. Only [`WorldEventService::advance_to_day`] and the vector
//! restore mutate an instance, so a caller wanting speculative "what
//! happens on day X" queries snapshots vectors first and restores after.

use std::collections::BTreeMap;

use alm_calendar::{CalendarDriver, MonthKind};
use alm_condition::{EventSnapshot, Expr, Value, evaluate_condition, parse_condition};
use serde::{Deserialize, Serialize};

use crate::chain::{ChainStateVector, initial_vector, state_covering};
use crate::definition::{EffectValue, EventContext, EventDefinition, EventKind};
use crate::effects::{LightLevel, ResolvedEffects, resolve_effects};
use crate::error::EventResult;
use crate::source::{CalendarSource, EventDefinitionSource};
use crate::validate::{Severity, ValidationIssue, validate_definitions};

/// How many years back a yearly fixed event is searched for its nearest
/// occurrence. Bounds the scan when a duration spans year boundaries.
const FIXED_SCAN_BACK_YEARS: i64 = 128;

/// Which state machine produced an activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    /// A calendar-date event.
    Fixed,
    /// A day- or minute-cycle event.
    Interval,
    /// A chain event (always active, in exactly one state).
    Chain,
    /// A condition-driven event.
    Conditional,
}

/// One event's activation on a queried day. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveEvent {
    /// The definition's id.
    pub event_id: String,
    /// The definition's display name.
    pub name: String,
    /// The occupied chain state, for chain events.
    pub state: Option<String>,
    /// Resolution priority, copied from the definition.
    pub priority: i32,
    /// The effects contributed on this day.
    pub effects: BTreeMap<String, EffectValue>,
    /// First day of the activation window.
    pub start_day: i64,
    /// Last day of the activation window (inclusive).
    pub end_day: i64,
    /// Which kind of machine produced this activation.
    pub source: EventSource,
}

/// Service construction options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceConfig {
    /// The day the service starts committed to.
    pub start_day: i64,
}

impl ServiceConfig {
    /// Start the service committed to the given day.
    pub fn start_day(mut self, day: i64) -> Self {
        self.start_day = day;
        self
    }
}

/// Per-day event activation over a validated definition set.
#[derive(Debug)]
pub struct WorldEventService {
    calendar: CalendarDriver,
    definitions: Vec<EventDefinition>,
    conditions: BTreeMap<String, Expr>,
    chains: BTreeMap<String, ChainStateVector>,
    current_day: i64,
    load_issues: Vec<ValidationIssue>,
}

impl WorldEventService {
    /// Build a service over the given calendar and definitions.
    ///
    /// Definitions with error-severity findings are dropped rather than
    /// accepted; every finding, blocking or not, is kept in the load
    /// report. Chain checkpoints are advanced to `config.start_day`.
    pub fn new(
        calendar: CalendarDriver,
        definitions: Vec<EventDefinition>,
        config: ServiceConfig,
    ) -> Self {
        let issues = validate_definitions(&definitions);
        let rejected: Vec<&str> = issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .map(|i| i.event_id.as_str())
            .collect();
        let definitions: Vec<EventDefinition> = definitions
            .into_iter()
            .filter(|d| !rejected.contains(&d.id.as_str()))
            .collect();

        let mut conditions = BTreeMap::new();
        let mut chains = BTreeMap::new();
        for def in &definitions {
            match &def.kind {
                EventKind::Conditional { condition, .. } => {
                    // Validation already accepted the syntax.
                    if let Ok(expr) = parse_condition(condition) {
                        conditions.insert(def.id.clone(), expr);
                    }
                }
                EventKind::Chain { seed, .. } => {
                    chains.insert(def.id.clone(), initial_vector(*seed));
                }
                _ => {}
            }
        }

        let mut service = WorldEventService {
            calendar,
            definitions,
            conditions,
            chains,
            current_day: 0,
            load_issues: issues,
        };
        service.advance_to_day(config.start_day);
        service
    }

    /// Load definitions and a calendar from injected sources.
    ///
    /// A missing or invalid calendar falls back to the plain day counter;
    /// a failing event source is a hard error.
    pub fn initialize(
        events: &dyn EventDefinitionSource,
        calendars: &dyn CalendarSource,
        config: ServiceConfig,
    ) -> EventResult<Self> {
        let definitions = events.load_event_definitions(None)?;
        let calendar = calendars
            .load_calendar_definitions()
            .ok()
            .and_then(|defs| defs.into_iter().next())
            .and_then(|def| CalendarDriver::new(def).ok())
            .unwrap_or_else(CalendarDriver::day_counter);
        Ok(WorldEventService::new(calendar, definitions, config))
    }

    /// The calendar the service resolves dates against.
    pub fn calendar(&self) -> &CalendarDriver {
        &self.calendar
    }

    /// The accepted definitions.
    pub fn definitions(&self) -> &[EventDefinition] {
        &self.definitions
    }

    /// Every validation finding from construction, including those that
    /// caused a definition to be dropped.
    pub fn load_report(&self) -> &[ValidationIssue] {
        &self.load_issues
    }

    /// The day the chain checkpoints are committed to.
    pub fn current_day(&self) -> i64 {
        self.current_day
    }

    /// Every event active on `day`, at day granularity.
    pub fn active_events(&self, day: i64) -> Vec<ActiveEvent> {
        self.active_events_at(day, None)
    }

    /// Every event active on `day`, with an optional minute of day for
    /// minute-granularity interval events (absent means minute 0).
    ///
    /// Repeated calls for the same day are idempotent: the cached chain
    /// checkpoints are read, never written.
    pub fn active_events_at(&self, day: i64, minute: Option<i64>) -> Vec<ActiveEvent> {
        let mut active = Vec::new();
        let mut snapshot: BTreeMap<String, EventSnapshot> = BTreeMap::new();

        for def in &self.definitions {
            let activation = match &def.kind {
                EventKind::Fixed { .. } => self.fixed_activation(def, day),
                EventKind::Interval { .. } => Self::interval_activation(def, day, minute),
                EventKind::Chain { .. } => Some(self.chain_activation(def, day)),
                EventKind::Conditional { .. } => continue,
            };
            snapshot.insert(def.id.clone(), snapshot_entry(activation.as_ref()));
            if let Some(event) = activation {
                active.push(event);
            }
        }

        for tier in [1u8, 2] {
            let mut tier_results = Vec::new();
            for def in &self.definitions {
                let EventKind::Conditional {
                    tier: def_tier,
                    duration,
                    ..
                } = &def.kind
                else {
                    continue;
                };
                if *def_tier != tier {
                    continue;
                }
                let holds = self
                    .conditions
                    .get(&def.id)
                    .is_some_and(|expr| evaluate_condition(expr, &snapshot).result);
                let activation = holds.then(|| ActiveEvent {
                    event_id: def.id.clone(),
                    name: def.name.clone(),
                    state: None,
                    priority: def.priority,
                    effects: def.effects.clone(),
                    start_day: day,
                    end_day: day + duration - 1,
                    source: EventSource::Conditional,
                });
                tier_results.push((def.id.clone(), activation));
            }
            // Commit the whole tier at once so same-tier conditionals
            // cannot observe each other.
            for (id, activation) in tier_results {
                snapshot.insert(id, snapshot_entry(activation.as_ref()));
                if let Some(event) = activation {
                    active.push(event);
                }
            }
        }

        active.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.event_id.cmp(&b.event_id))
        });
        active
    }

    /// Active events filtered to a context, merged into a resolved view.
    pub fn resolved_effects(
        &self,
        day: i64,
        context: Option<&EventContext>,
        minute: Option<i64>,
        solar_baseline: Option<LightLevel>,
    ) -> ResolvedEffects {
        let mut events = self.active_events_at(day, minute);
        if let Some(ctx) = context {
            events.retain(|e| {
                self.definitions
                    .iter()
                    .find(|d| d.id == e.event_id)
                    .is_some_and(|d| d.applies_to(ctx))
            });
        }
        resolve_effects(&events, solar_baseline)
    }

    /// Commit the chain checkpoints forward (or back) to `day`.
    ///
    /// Moving backward resets each chain to its seed and replays, so the
    /// result is identical to a fresh service advanced to `day`.
    pub fn advance_to_day(&mut self, day: i64) {
        for def in &self.definitions {
            let EventKind::Chain {
                seed,
                initial_state,
                states,
            } = &def.kind
            else {
                continue;
            };
            if states.is_empty() {
                continue;
            }
            let vector = match self.chains.get(&def.id) {
                Some(v) if v.state_start_day <= day => v.clone(),
                _ => initial_vector(*seed),
            };
            let occurrence = state_covering(states, initial_state.as_deref(), &vector, day);
            self.chains.insert(def.id.clone(), occurrence.vector);
        }
        self.current_day = day;
    }

    /// A snapshot of every chain's checkpoint, for persistence or
    /// speculative queries.
    pub fn chain_state_vectors(&self) -> BTreeMap<String, ChainStateVector> {
        self.chains.clone()
    }

    /// Restore previously saved chain checkpoints. Ids without a saved
    /// vector keep their current one.
    pub fn restore_chain_state_vectors(&mut self, vectors: BTreeMap<String, ChainStateVector>) {
        for (id, vector) in vectors {
            if let Some(slot) = self.chains.get_mut(&id) {
                *slot = vector;
            }
        }
    }

    fn chain_activation(&self, def: &EventDefinition, day: i64) -> ActiveEvent {
        let EventKind::Chain {
            seed,
            initial_state,
            states,
        } = &def.kind
        else {
            unreachable!("caller matched the kind");
        };
        let cached = self.chains.get(&def.id);
        let vector = match cached {
            Some(v) if v.state_start_day <= day => v.clone(),
            _ => initial_vector(*seed),
        };
        let occurrence = state_covering(states, initial_state.as_deref(), &vector, day);
        let state = &states[occurrence.state_index];
        let mut effects = def.effects.clone();
        for (key, value) in &state.effects {
            effects.insert(key.clone(), value.clone());
        }
        ActiveEvent {
            event_id: def.id.clone(),
            name: def.name.clone(),
            state: Some(state.name.clone()),
            priority: def.priority,
            effects,
            start_day: occurrence.start_day,
            end_day: occurrence.end_day,
            source: EventSource::Chain,
        }
    }

    fn interval_activation(
        def: &EventDefinition,
        day: i64,
        minute: Option<i64>,
    ) -> Option<ActiveEvent> {
        let EventKind::Interval {
            interval,
            offset,
            duration,
            use_minutes,
        } = &def.kind
        else {
            unreachable!("caller matched the kind");
        };
        let (phase, start_day, end_day) = if *use_minutes {
            let minute = minute.unwrap_or(0);
            ((minute - offset).rem_euclid(*interval), day, day)
        } else {
            let phase = (day - offset).rem_euclid(*interval);
            (phase, day - phase, day - phase + duration - 1)
        };
        (phase < *duration).then(|| ActiveEvent {
            event_id: def.id.clone(),
            name: def.name.clone(),
            state: None,
            priority: def.priority,
            effects: def.effects.clone(),
            start_day,
            end_day,
            source: EventSource::Interval,
        })
    }

    fn fixed_activation(&self, def: &EventDefinition, day: i64) -> Option<ActiveEvent> {
        let EventKind::Fixed {
            date,
            year,
            duration,
        } = &def.kind
        else {
            unreachable!("caller matched the kind");
        };
        let start = if let Some(pinned) = year {
            self.fixed_start_in_year(date, *pinned)?
        } else {
            // Nearest occurrence on or before the target day.
            let mut found = None;
            let this_year = self.calendar.date(day).year;
            for y in 0..=FIXED_SCAN_BACK_YEARS {
                if let Some(start) = self.fixed_start_in_year(date, this_year - y)
                    && start <= day
                {
                    found = Some(start);
                    break;
                }
            }
            found?
        };
        (start <= day && day <= start + duration - 1).then(|| ActiveEvent {
            event_id: def.id.clone(),
            name: def.name.clone(),
            state: None,
            priority: def.priority,
            effects: def.effects.clone(),
            start_day: start,
            end_day: start + duration - 1,
            source: EventSource::Fixed,
        })
    }

    /// The occurrence start in the given year, if the date exists there.
    ///
    /// The standard date wins over an intercalary name when both are set;
    /// an intercalary name absent from the calendar yields no occurrence,
    /// as does a day beyond the month's length in that year.
    fn fixed_start_in_year(
        &self,
        date: &crate::definition::FixedDate,
        year: i64,
    ) -> Option<i64> {
        if let (Some(month), Some(day_of_month)) = (date.month, date.day) {
            return self.calendar.absolute_day(year, month, day_of_month).ok();
        }
        let name = date.intercalary.as_ref()?;
        let month_index = self
            .calendar
            .definition()
            .months
            .iter()
            .position(|m| m.kind == MonthKind::Intercalary && &m.name == name)?;
        self.calendar.absolute_day(year, month_index, 1).ok()
    }
}

fn snapshot_entry(activation: Option<&ActiveEvent>) -> EventSnapshot {
    match activation {
        None => EventSnapshot::default(),
        Some(event) => EventSnapshot {
            active: true,
            state: event.state.clone().unwrap_or_default(),
            effects: event
                .effects
                .iter()
                .filter_map(|(k, v)| Some((k.clone(), condition_value(v)?)))
                .collect(),
        },
    }
}

/// Effect values as condition-visible values. Tag-keyed maps have no
/// scalar reading and are omitted from snapshots.
fn condition_value(value: &EffectValue) -> Option<Value> {
    match value {
        EffectValue::Bool(b) => Some(Value::Bool(*b)),
        EffectValue::Number(n) => Some(Value::Number(*n)),
        EffectValue::Text(s) => Some(Value::Str(s.clone())),
        EffectValue::PerTag(_) => None,
    }
}
