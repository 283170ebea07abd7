//! Per-key effect merging across active events.
//!
//! Each effect key is resolved by a fixed, key-specific strategy so that
//! independently authored events compose predictably: price multipliers
//! stack, closure flags never un-close, light levels only darken, and
//! everything else is won by the highest-priority contributor.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::definition::EffectValue;
use crate::service::ActiveEvent;

/// How a particular effect key merges across contributors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStrategy {
    /// Product of all numeric contributions (per tag for tag-keyed maps).
    Multiplicative,
    /// True iff any contributor is true.
    AnyTrue,
    /// The darkest contributed light level wins.
    OrdinalMin,
    /// Highest priority wins; ties break by ascending event id.
    LastWinsByPriority,
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionStrategy::Multiplicative => write!(f, "multiplicative"),
            ResolutionStrategy::AnyTrue => write!(f, "any_true"),
            ResolutionStrategy::OrdinalMin => write!(f, "ordinal_min"),
            ResolutionStrategy::LastWinsByPriority => write!(f, "last_wins_by_priority"),
        }
    }
}

/// Strategy assignment per effect key. Unrecognized keys fall through to
/// last-wins.
pub fn strategy_for(key: &str) -> ResolutionStrategy {
    match key {
        "price_mult_global" | "price_mult_tag" => ResolutionStrategy::Multiplicative,
        "shop_closed" | "restock_block" => ResolutionStrategy::AnyTrue,
        "light_level" => ResolutionStrategy::OrdinalMin,
        _ => ResolutionStrategy::LastWinsByPriority,
    }
}

/// Ambient light, ordered darkest first so `min` picks the darkest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LightLevel {
    /// No usable light.
    Dark,
    /// Reduced light.
    Dim,
    /// Full light.
    Bright,
}

impl fmt::Display for LightLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LightLevel::Dark => write!(f, "dark"),
            LightLevel::Dim => write!(f, "dim"),
            LightLevel::Bright => write!(f, "bright"),
        }
    }
}

impl FromStr for LightLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dark" => Ok(LightLevel::Dark),
            "dim" => Ok(LightLevel::Dim),
            "bright" => Ok(LightLevel::Bright),
            _ => Err(()),
        }
    }
}

/// The merged effect view for one day, with provenance.
///
/// Rebuilt fresh on every call; holds no state between calls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedEffects {
    /// Final value per effect key.
    pub effects: BTreeMap<String, EffectValue>,
    /// Every contributing event id per key, winners and losers alike.
    pub competing_effects: BTreeMap<String, Vec<String>>,
    /// The strategy that resolved each key.
    pub resolution_strategies: BTreeMap<String, ResolutionStrategy>,
}

/// Merge the effects of the given active events.
///
/// Callers filter by context beforehand; every event passed in
/// contributes. `solar_baseline` participates in `light_level` as a
/// layer below all events, so the key resolves even when no event
/// contributes one.
pub fn resolve_effects(
    active_events: &[ActiveEvent],
    solar_baseline: Option<LightLevel>,
) -> ResolvedEffects {
    let mut contributions: BTreeMap<String, Vec<(&ActiveEvent, &EffectValue)>> = BTreeMap::new();
    for event in active_events {
        for (key, value) in &event.effects {
            contributions.entry(key.clone()).or_default().push((event, value));
        }
    }

    let mut resolved = ResolvedEffects::default();
    if let Some(baseline) = solar_baseline
        && !contributions.contains_key("light_level")
    {
        resolved.effects.insert(
            "light_level".to_string(),
            EffectValue::Text(baseline.to_string()),
        );
        resolved
            .resolution_strategies
            .insert("light_level".to_string(), ResolutionStrategy::OrdinalMin);
        resolved
            .competing_effects
            .insert("light_level".to_string(), Vec::new());
    }

    for (key, contributors) in &contributions {
        let strategy = strategy_for(key);
        let value = match strategy {
            ResolutionStrategy::Multiplicative => multiply(key, contributors),
            ResolutionStrategy::AnyTrue => EffectValue::Bool(
                contributors
                    .iter()
                    .any(|(_, v)| v.as_bool().unwrap_or(false)),
            ),
            ResolutionStrategy::OrdinalMin => darkest(contributors, solar_baseline),
            ResolutionStrategy::LastWinsByPriority => {
                winner_by_priority(contributors).1.clone()
            }
        };
        resolved.effects.insert(key.clone(), value);
        resolved.resolution_strategies.insert(key.clone(), strategy);
        let mut ids: Vec<String> = contributors.iter().map(|(e, _)| e.event_id.clone()).collect();
        ids.sort();
        resolved.competing_effects.insert(key.clone(), ids);
    }
    resolved
}

fn multiply(key: &str, contributors: &[(&ActiveEvent, &EffectValue)]) -> EffectValue {
    if key == "price_mult_tag" {
        let mut per_tag: BTreeMap<String, f64> = BTreeMap::new();
        for (_, value) in contributors {
            if let EffectValue::PerTag(map) = value {
                for (tag, factor) in map {
                    *per_tag.entry(tag.clone()).or_insert(1.0) *= factor;
                }
            }
        }
        EffectValue::PerTag(per_tag)
    } else {
        let product = contributors
            .iter()
            .filter_map(|(_, v)| v.as_number())
            .product();
        EffectValue::Number(product)
    }
}

fn darkest(
    contributors: &[(&ActiveEvent, &EffectValue)],
    baseline: Option<LightLevel>,
) -> EffectValue {
    let from_events = contributors
        .iter()
        .filter_map(|(_, v)| v.as_text().and_then(|s| s.parse::<LightLevel>().ok()))
        .min();
    let level = match (from_events, baseline) {
        (Some(a), Some(b)) => a.min(b),
        (Some(a), None) => a,
        (None, Some(b)) => b,
        // Contributors existed but none parsed; treat as unlit input and
        // keep the brightest so a typo never darkens the world.
        (None, None) => LightLevel::Bright,
    };
    EffectValue::Text(level.to_string())
}

fn winner_by_priority<'a>(
    contributors: &[(&'a ActiveEvent, &'a EffectValue)],
) -> (&'a ActiveEvent, &'a EffectValue) {
    let mut best = contributors[0];
    for candidate in &contributors[1..] {
        let (event, _) = candidate;
        let (best_event, _) = best;
        if event.priority > best_event.priority
            || (event.priority == best_event.priority && event.event_id < best_event.event_id)
        {
            best = *candidate;
        }
    }
    best
}
