//! Injected definition sources.
//!
//! The service never reads files or databases itself; it is handed
//! adapters for event and calendar definitions. [`InMemorySource`] covers
//! tests and embedded use, and doubles as the JSON ingestion point.

use alm_calendar::CalendarDefinition;

use crate::definition::{EventContext, EventDefinition};
use crate::error::EventResult;

/// Supplies event definitions to a service.
pub trait EventDefinitionSource {
    /// All definitions visible under the given context (`None` for all).
    fn load_event_definitions(
        &self,
        context: Option<&EventContext>,
    ) -> EventResult<Vec<EventDefinition>>;

    /// A single definition by id, if present.
    fn load_event_definition_by_id(&self, id: &str) -> EventResult<Option<EventDefinition>> {
        Ok(self
            .load_event_definitions(None)?
            .into_iter()
            .find(|d| d.id == id))
    }

    /// The definitions whose ids appear in `ids`, in source order.
    fn load_event_definitions_by_ids(&self, ids: &[&str]) -> EventResult<Vec<EventDefinition>> {
        Ok(self
            .load_event_definitions(None)?
            .into_iter()
            .filter(|d| ids.contains(&d.id.as_str()))
            .collect())
    }

    /// All known definition ids.
    fn list_event_definition_ids(&self) -> EventResult<Vec<String>> {
        Ok(self
            .load_event_definitions(None)?
            .into_iter()
            .map(|d| d.id)
            .collect())
    }

    /// Whether a definition with this id exists.
    fn has_event_definition(&self, id: &str) -> EventResult<bool> {
        Ok(self.load_event_definition_by_id(id)?.is_some())
    }
}

/// Supplies calendar definitions to a service.
///
/// Returning an empty list is valid; the service falls back to a plain
/// day-counter calendar.
pub trait CalendarSource {
    /// All available calendar definitions; the first is used.
    fn load_calendar_definitions(&self) -> EventResult<Vec<CalendarDefinition>>;
}

/// A source backed by plain vectors, filterable by context.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    events: Vec<EventDefinition>,
    calendars: Vec<CalendarDefinition>,
}

impl InMemorySource {
    /// A source over already-built definitions.
    pub fn new(events: Vec<EventDefinition>, calendars: Vec<CalendarDefinition>) -> Self {
        InMemorySource { events, calendars }
    }

    /// Parse event definitions from a JSON array document.
    pub fn from_event_json(json: &str) -> EventResult<Self> {
        let events: Vec<EventDefinition> = serde_json::from_str(json)?;
        Ok(InMemorySource {
            events,
            calendars: Vec::new(),
        })
    }

    /// Attach a calendar definition parsed from JSON.
    pub fn with_calendar_json(mut self, json: &str) -> EventResult<Self> {
        let calendar: CalendarDefinition = serde_json::from_str(json)?;
        self.calendars.push(calendar);
        Ok(self)
    }
}

impl EventDefinitionSource for InMemorySource {
    fn load_event_definitions(
        &self,
        context: Option<&EventContext>,
    ) -> EventResult<Vec<EventDefinition>> {
        Ok(match context {
            None => self.events.clone(),
            Some(ctx) => self
                .events
                .iter()
                .filter(|d| d.applies_to(ctx))
                .cloned()
                .collect(),
        })
    }
}

impl CalendarSource for InMemorySource {
    fn load_calendar_definitions(&self) -> EventResult<Vec<CalendarDefinition>> {
        Ok(self.calendars.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::EventKind;
    use std::collections::BTreeMap;

    fn event(id: &str, locations: &[&str]) -> EventDefinition {
        EventDefinition {
            id: id.to_string(),
            name: id.to_string(),
            priority: 0,
            effects: BTreeMap::new(),
            locations: locations.iter().map(|s| s.to_string()).collect(),
            factions: Vec::new(),
            seasons: Vec::new(),
            regions: Vec::new(),
            tags: Vec::new(),
            kind: EventKind::Interval {
                interval: 5,
                offset: 0,
                duration: 1,
                use_minutes: false,
            },
        }
    }

    #[test]
    fn default_trait_methods_delegate() {
        let source = InMemorySource::new(vec![event("a", &[]), event("b", &[])], Vec::new());
        assert_eq!(source.list_event_definition_ids().unwrap(), ["a", "b"]);
        assert!(source.has_event_definition("a").unwrap());
        assert!(!source.has_event_definition("z").unwrap());
        assert_eq!(
            source.load_event_definition_by_id("b").unwrap().unwrap().id,
            "b"
        );
        assert_eq!(
            source.load_event_definitions_by_ids(&["b"]).unwrap().len(),
            1
        );
    }

    #[test]
    fn context_filters_loaded_definitions() {
        let source = InMemorySource::new(vec![event("a", &["docks"]), event("b", &[])], Vec::new());
        let ctx = EventContext {
            location: Some("keep".to_string()),
            ..EventContext::default()
        };
        let loaded = source.load_event_definitions(Some(&ctx)).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "b");
    }

    #[test]
    fn json_round_trip_through_source() {
        let json = r#"[
            {"id": "tide", "name": "Tide", "type": "interval",
             "interval": 3, "duration": 1}
        ]"#;
        let source = InMemorySource::from_event_json(json).unwrap();
        assert_eq!(source.list_event_definition_ids().unwrap(), ["tide"]);
    }
}
