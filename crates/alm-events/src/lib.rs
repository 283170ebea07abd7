//! World event service for the Almanac engine.
//!
//! Declarative event definitions (fixed-date, interval, weighted chain,
//! conditional) are validated at load time, then queried per absolute
//! day: which events are active, in which chain state, and what their
//! merged effects are. Everything downstream of the per-event seeds is
//! deterministic, so a saved chain checkpoint restored into a fresh
//! service replays bit-identically.
//!
//! ```
//! use alm_events::{InMemorySource, ServiceConfig, WorldEventService};
//!
//! let source = InMemorySource::from_event_json(
//!     r#"[{"id": "market", "name": "Market Day", "type": "interval",
//!          "interval": 7, "duration": 1}]"#,
//! )
//! .unwrap();
//! let service =
//!     WorldEventService::initialize(&source, &source, ServiceConfig::default()).unwrap();
//! assert_eq!(service.active_events(7)[0].event_id, "market");
//! assert!(service.active_events(8).is_empty());
//! ```

/// Chain event replay and checkpointing.
pub mod chain;
/// Event definition records.
pub mod definition;
/// Per-key effect merging across active events.
pub mod effects;
/// Error types for the events crate.
pub mod error;
/// Golden-master regression fixtures.
pub mod fixture;
/// The per-day world event service.
pub mod service;
/// Injected definition sources.
pub mod source;
/// Load-time validation of event definitions.
pub mod validate;

pub use chain::{ChainOccurrence, ChainStateVector};
pub use definition::{
    ChainDuration, ChainState, EffectValue, EventContext, EventDefinition, EventKind, FixedDate,
};
pub use effects::{LightLevel, ResolutionStrategy, ResolvedEffects, resolve_effects};
pub use error::{EventError, EventResult};
pub use fixture::RegressionFixture;
pub use service::{ActiveEvent, EventSource, ServiceConfig, WorldEventService};
pub use source::{CalendarSource, EventDefinitionSource, InMemorySource};
pub use validate::{
    Severity, ValidationIssue, validate_definition, validate_definitions, validate_or_reject,
    validation_errors,
};
