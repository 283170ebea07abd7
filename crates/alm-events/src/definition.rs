//! Event definition records.
//!
//! The four event kinds form a closed, serde-tagged union: adding a kind is
//! a compile-time-checked change in every resolver match. Definitions are
//! plain data; all behavior lives in the service and registry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A named, typed value contributed by an active event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EffectValue {
    /// A boolean flag (e.g. `shop_closed`).
    Bool(bool),
    /// A numeric value (e.g. a price multiplier).
    Number(f64),
    /// A string value (e.g. a light level or banner text).
    Text(String),
    /// A tag-keyed numeric map (e.g. per-tag price multipliers).
    PerTag(BTreeMap<String, f64>),
}

impl EffectValue {
    /// The numeric content, if this value is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            EffectValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// The boolean content, if this value is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            EffectValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The string content, if this value is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            EffectValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// The date of a fixed event.
///
/// Either `month`/`day` or `intercalary` should be set; setting both is
/// flagged as an ambiguous-date warning at validation time, and the
/// standard date wins.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FixedDate {
    /// Zero-based month index.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub month: Option<usize>,
    /// One-based day of the month.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<i64>,
    /// Name of an intercalary month the event falls on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intercalary: Option<String>,
}

/// How long a chain state lasts before the next transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChainDuration {
    /// A fixed number of days.
    Days(i64),
    /// Dice notation rolled through the chain's own RNG (e.g. `2d3+1`).
    Dice(String),
}

/// One named state of a chain event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainState {
    /// Unique state name within the chain.
    pub name: String,
    /// Relative selection weight at each transition.
    pub weight: f64,
    /// How long the state lasts once entered.
    pub duration: ChainDuration,
    /// Effects contributed while in this state, overriding the event's
    /// base effects per key.
    #[serde(default)]
    pub effects: BTreeMap<String, EffectValue>,
}

/// The kind-specific part of an event definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// A one-shot or yearly-recurring calendar-date event.
    Fixed {
        /// The date the event starts.
        date: FixedDate,
        /// Pins the event to a single year instead of yearly recurrence.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        year: Option<i64>,
        /// Days the event stays active from its start date.
        #[serde(default = "default_duration")]
        duration: i64,
    },
    /// An event recurring every `interval` days (or minutes of the day).
    Interval {
        /// Days (or minutes) between activations.
        interval: i64,
        /// Phase of the cycle.
        #[serde(default)]
        offset: i64,
        /// Days (or minutes) the event stays active per cycle.
        duration: i64,
        /// Interpret `interval`/`offset`/`duration` as minutes of the day.
        #[serde(default)]
        use_minutes: bool,
    },
    /// A weighted probabilistic state machine; always in exactly one state.
    Chain {
        /// Seed of the chain's private RNG.
        seed: u32,
        /// The state occupied at day 0, skipping the initial roll.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initial_state: Option<String>,
        /// The possible states. Names must be unique.
        states: Vec<ChainState>,
    },
    /// An event active while a condition over other events holds.
    Conditional {
        /// Boolean condition source (see `alm-condition`).
        condition: String,
        /// Evaluation tier: tier 2 may reference tier-1 conditionals.
        tier: u8,
        /// Days reported as the activation window once the condition holds.
        #[serde(default = "default_duration")]
        duration: i64,
    },
}

fn default_duration() -> i64 {
    1
}

/// A declaratively defined world event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDefinition {
    /// Stable identifier, referenced by conditions.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Resolution priority for last-wins effect keys.
    #[serde(default)]
    pub priority: i32,
    /// Base effects contributed while active.
    #[serde(default)]
    pub effects: BTreeMap<String, EffectValue>,
    /// Location filter; empty means "applies everywhere".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<String>,
    /// Faction filter; empty means "applies everywhere".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub factions: Vec<String>,
    /// Season filter; empty means "applies everywhere".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub seasons: Vec<String>,
    /// Region filter; empty means "applies everywhere".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<String>,
    /// Tag filter; empty means "applies everywhere".
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// The kind-specific payload.
    #[serde(flatten)]
    pub kind: EventKind,
}

/// The situational context used to filter events before resolution.
///
/// Filtering is the caller's responsibility: pass only events whose
/// [`EventDefinition::applies_to`] returns `true` into effect resolution.
#[derive(Debug, Clone, Default)]
pub struct EventContext {
    /// Current location, if any.
    pub location: Option<String>,
    /// Current faction, if any.
    pub faction: Option<String>,
    /// Current season, if any.
    pub season: Option<String>,
    /// Current region, if any.
    pub region: Option<String>,
    /// Active context tags.
    pub tags: Vec<String>,
}

impl EventDefinition {
    /// Whether this event applies under the given context.
    ///
    /// Every non-empty filter list must match: scalar fields must be set
    /// and contained in the list; for tags, at least one context tag must
    /// appear in the event's tag list. Empty lists match everything.
    pub fn applies_to(&self, context: &EventContext) -> bool {
        fn scalar_matches(filter: &[String], value: Option<&String>) -> bool {
            filter.is_empty() || value.is_some_and(|v| filter.contains(v))
        }
        scalar_matches(&self.locations, context.location.as_ref())
            && scalar_matches(&self.factions, context.faction.as_ref())
            && scalar_matches(&self.seasons, context.season.as_ref())
            && scalar_matches(&self.regions, context.region.as_ref())
            && (self.tags.is_empty() || context.tags.iter().any(|t| self.tags.contains(t)))
    }
}
