//! Declarative calendar definition records.
//!
//! A calendar is a list of ordered months (standard or intercalary), a week
//! cycle, holidays, eras, and leap rules. Definitions are plain serde
//! records so they can be loaded from JSON alongside event definitions.

use serde::{Deserialize, Serialize};

use crate::error::{CalendarError, CalendarResult};

/// Whether a month participates in the week cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthKind {
    /// A regular month; its days advance the weekday counter.
    #[default]
    Standard,
    /// A festival month outside the week cycle; its days have no weekday.
    Intercalary,
}

/// One month of the calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Month {
    /// Display name of the month.
    pub name: String,
    /// Number of days in the month (before any leap insertion).
    pub days: i64,
    /// Position of the month within the year. Must be contiguous and unique.
    pub order: u32,
    /// Standard or intercalary.
    #[serde(default)]
    pub kind: MonthKind,
}

/// A named holiday pinned to a month and day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holiday {
    /// Display name of the holiday.
    pub name: String,
    /// Zero-based month index (after ordering).
    pub month: usize,
    /// One-based day of the month.
    pub day: i64,
}

/// A named span of years with its own numbering direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Era {
    /// Full era name.
    pub name: String,
    /// Short form appended to displayed years.
    pub abbrev: String,
    /// First year of the era (inclusive).
    pub start_year: i64,
    /// First year after the era (exclusive), open-ended when absent.
    #[serde(default)]
    pub end_year: Option<i64>,
    /// `1` for ascending year numbers, `-1` for descending ("before X").
    #[serde(default = "default_direction")]
    pub direction: i8,
}

fn default_direction() -> i8 {
    1
}

/// A rule inserting one extra day into a target month in matching years.
///
/// A year matches when `(year - offset) % interval == 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeapRule {
    /// Years between insertions.
    pub interval: i64,
    /// Phase of the rule relative to year 0.
    #[serde(default)]
    pub offset: i64,
    /// Zero-based index of the month that receives the extra day.
    pub target_month_index: usize,
}

/// A complete declarative calendar.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CalendarDefinition {
    /// Stable identifier of the calendar.
    pub id: String,
    /// Display name of the calendar.
    pub name: String,
    /// The months of the year. Empty for the plain day-counter fallback.
    #[serde(default)]
    pub months: Vec<Month>,
    /// Ordered weekday names. Empty when the calendar has no week cycle.
    #[serde(default)]
    pub weekdays: Vec<String>,
    /// Named holidays.
    #[serde(default)]
    pub holidays: Vec<Holiday>,
    /// Eras, scanned in order by `[start_year, end_year)`.
    #[serde(default)]
    pub eras: Vec<Era>,
    /// Leap rules, each inserting one day into its target month.
    #[serde(default)]
    pub leap_rules: Vec<LeapRule>,
    /// The year containing absolute day 0.
    #[serde(default)]
    pub starting_year: i64,
    /// Suffix appended to displayed years (e.g. " DR").
    #[serde(default)]
    pub year_suffix: String,
}

impl CalendarDefinition {
    /// The trivial fallback calendar: a bare day counter with no months,
    /// no weekdays, and no leap rules.
    pub fn day_counter() -> Self {
        Self {
            id: "day-counter".to_string(),
            name: "Day Counter".to_string(),
            ..Self::default()
        }
    }

    /// Check structural invariants.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidDefinition`] when month orders are
    /// not contiguous and unique, a month or leap rule is out of range, or
    /// an era is malformed.
    pub fn validate(&self) -> CalendarResult<()> {
        let invalid = |msg: String| Err(CalendarError::InvalidDefinition(msg));

        let mut orders: Vec<u32> = self.months.iter().map(|m| m.order).collect();
        orders.sort_unstable();
        for pair in orders.windows(2) {
            if pair[1] != pair[0] + 1 {
                return invalid(format!(
                    "month orders must be contiguous and unique, found {} then {}",
                    pair[0], pair[1]
                ));
            }
        }

        for month in &self.months {
            if month.name.is_empty() {
                return invalid("month with empty name".to_string());
            }
            if month.days < 1 {
                return invalid(format!("month '{}' has {} days", month.name, month.days));
            }
        }

        for rule in &self.leap_rules {
            if rule.interval < 1 {
                return invalid(format!("leap rule interval {} < 1", rule.interval));
            }
            if rule.target_month_index >= self.months.len() {
                return invalid(format!(
                    "leap rule targets month index {} of {}",
                    rule.target_month_index,
                    self.months.len()
                ));
            }
        }

        for holiday in &self.holidays {
            if holiday.month >= self.months.len() {
                return invalid(format!(
                    "holiday '{}' targets month index {} of {}",
                    holiday.name,
                    holiday.month,
                    self.months.len()
                ));
            }
        }

        for era in &self.eras {
            if era.direction != 1 && era.direction != -1 {
                return invalid(format!(
                    "era '{}' has direction {}, expected 1 or -1",
                    era.name, era.direction
                ));
            }
            if era.direction == -1 && era.end_year.is_none() {
                return invalid(format!(
                    "descending era '{}' requires an end year",
                    era.name
                ));
            }
            if let Some(end) = era.end_year
                && end <= era.start_year
            {
                return invalid(format!(
                    "era '{}' ends at {} before it starts at {}",
                    era.name, end, era.start_year
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_months() -> Vec<Month> {
        vec![
            Month {
                name: "First".to_string(),
                days: 30,
                order: 0,
                kind: MonthKind::Standard,
            },
            Month {
                name: "Second".to_string(),
                days: 30,
                order: 1,
                kind: MonthKind::Standard,
            },
        ]
    }

    #[test]
    fn day_counter_is_valid() {
        assert!(CalendarDefinition::day_counter().validate().is_ok());
    }

    #[test]
    fn contiguous_orders_are_valid() {
        let def = CalendarDefinition {
            months: two_months(),
            ..CalendarDefinition::default()
        };
        assert!(def.validate().is_ok());
    }

    #[test]
    fn duplicate_orders_are_rejected() {
        let mut months = two_months();
        months[1].order = 0;
        let def = CalendarDefinition {
            months,
            ..CalendarDefinition::default()
        };
        assert!(def.validate().is_err());
    }

    #[test]
    fn gapped_orders_are_rejected() {
        let mut months = two_months();
        months[1].order = 5;
        let def = CalendarDefinition {
            months,
            ..CalendarDefinition::default()
        };
        assert!(def.validate().is_err());
    }

    #[test]
    fn zero_day_month_is_rejected() {
        let mut months = two_months();
        months[0].days = 0;
        let def = CalendarDefinition {
            months,
            ..CalendarDefinition::default()
        };
        assert!(def.validate().is_err());
    }

    #[test]
    fn leap_rule_out_of_range_is_rejected() {
        let def = CalendarDefinition {
            months: two_months(),
            leap_rules: vec![LeapRule {
                interval: 4,
                offset: 0,
                target_month_index: 9,
            }],
            ..CalendarDefinition::default()
        };
        assert!(def.validate().is_err());
    }

    #[test]
    fn descending_era_without_end_is_rejected() {
        let def = CalendarDefinition {
            months: two_months(),
            eras: vec![Era {
                name: "Before Founding".to_string(),
                abbrev: "BF".to_string(),
                start_year: -5000,
                end_year: None,
                direction: -1,
            }],
            ..CalendarDefinition::default()
        };
        assert!(def.validate().is_err());
    }

    #[test]
    fn definition_round_trips_through_json() {
        let def = CalendarDefinition {
            id: "test".to_string(),
            name: "Test".to_string(),
            months: two_months(),
            weekdays: vec!["Aday".to_string(), "Bday".to_string()],
            leap_rules: vec![LeapRule {
                interval: 4,
                offset: 0,
                target_month_index: 1,
            }],
            starting_year: 1,
            year_suffix: " AE".to_string(),
            ..CalendarDefinition::default()
        };
        let json = serde_json::to_string(&def).unwrap();
        let back: CalendarDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(def, back);
    }

    #[test]
    fn month_kind_defaults_to_standard() {
        let month: Month =
            serde_json::from_str(r#"{"name": "First", "days": 30, "order": 0}"#).unwrap();
        assert_eq!(month.kind, MonthKind::Standard);
    }
}
