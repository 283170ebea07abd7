//! Chain event replay and checkpointing.
//!
//! A chain event walks a weighted random graph of named states. Progress
//! is represented by an explicit, serializable checkpoint — the state
//! name, the day it began, and the RNG state captured just before it was
//! rolled — so a service can resume without replaying from day 0, and a
//! saved vector restored into a fresh service reproduces the exact same
//! sequence as an uninterrupted replay.

use alm_rng::SeededRng;
use serde::{Deserialize, Serialize};

use crate::definition::{ChainDuration, ChainState};

/// The minimal serializable snapshot needed to resume a chain event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainStateVector {
    /// The name of the state beginning at `state_start_day`.
    pub state: String,
    /// The day the current state began.
    pub state_start_day: i64,
    /// The RNG state captured at that transition, before the state was
    /// rolled. Replaying from here re-derives the state and its duration.
    pub rng_state: u32,
}

/// The chain state covering a queried day.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainOccurrence {
    /// Index of the occupied state in the definition's state list.
    pub state_index: usize,
    /// First day of the occurrence.
    pub start_day: i64,
    /// Last day of the occurrence (inclusive).
    pub end_day: i64,
    /// The checkpoint for this occurrence.
    pub vector: ChainStateVector,
}

/// The checkpoint a chain starts from before any transition has happened.
pub fn initial_vector(seed: u32) -> ChainStateVector {
    ChainStateVector {
        state: String::new(),
        state_start_day: 0,
        rng_state: seed,
    }
}

/// Roll the state beginning at `start_day` and its duration.
///
/// The very first state honors `initial_state` without consuming a roll;
/// every other transition consumes exactly one weighted choice. Durations
/// that resolve to less than one day are clamped so replay always makes
/// progress (validation rejects such definitions up front).
fn next_state(
    states: &[ChainState],
    initial_state: Option<&str>,
    start_day: i64,
    rng: &mut SeededRng,
) -> (usize, i64) {
    let index = if start_day == 0
        && let Some(initial) = initial_state
        && let Some(i) = states.iter().position(|s| s.name == initial)
    {
        i
    } else {
        let weights: Vec<f64> = states.iter().map(|s| s.weight).collect();
        match rng.weighted_choice(states, &weights) {
            Ok(state) => states
                .iter()
                .position(|s| s.name == state.name)
                .unwrap_or(0),
            Err(_) => 0,
        }
    };
    let duration = match &states[index].duration {
        ChainDuration::Days(n) => *n,
        ChainDuration::Dice(notation) => rng.roll_dice(notation).total,
    };
    (index, duration.max(1))
}

/// Resolve the state covering `day`, replaying forward from `vector`.
///
/// Callers restart from [`initial_vector`] when asked about a day before
/// `vector.state_start_day`. A chain has no history before its first
/// transition, so days earlier than the vector's start (negative absolute
/// days, with the initial vector) clamp to the first state and report its
/// window unchanged.
pub fn state_covering(
    states: &[ChainState],
    initial_state: Option<&str>,
    vector: &ChainStateVector,
    day: i64,
) -> ChainOccurrence {
    let day = day.max(vector.state_start_day);
    let mut rng = SeededRng::from_state(vector.rng_state);
    let mut start = vector.state_start_day;
    loop {
        let checkpoint = rng.state();
        let (index, duration) = next_state(states, initial_state, start, &mut rng);
        if day < start + duration {
            return ChainOccurrence {
                state_index: index,
                start_day: start,
                end_day: start + duration - 1,
                vector: ChainStateVector {
                    state: states[index].name.clone(),
                    state_start_day: start,
                    rng_state: checkpoint,
                },
            };
        }
        start += duration;
    }
}
