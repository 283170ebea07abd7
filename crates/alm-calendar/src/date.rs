//! Date output types.

use serde::{Deserialize, Serialize};

/// A fully resolved calendar date. Derived output, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedDate {
    /// The calendar year.
    pub year: i64,
    /// Zero-based index into the ordered month list.
    pub month_index: usize,
    /// Display name of the month.
    pub month_name: String,
    /// One-based day within the month.
    pub day_of_month: i64,
    /// Zero-based day within the year.
    pub day_of_year: i64,
    /// Weekday name, empty on intercalary days.
    pub day_of_week: String,
    /// Zero-based weekday index, `-1` on intercalary days.
    pub day_of_week_index: i32,
    /// The calendar's display suffix for years.
    pub year_suffix: String,
    /// Whether this day belongs to an intercalary month.
    pub is_intercalary: bool,
}

impl std::fmt::Display for ComputedDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.month_name.is_empty() {
            return write!(f, "day {} of {}{}", self.day_of_month, self.year, self.year_suffix);
        }
        if self.is_intercalary {
            write!(f, "{}, {}{}", self.month_name, self.year, self.year_suffix)
        } else {
            write!(
                f,
                "{} {}, {}{}",
                self.day_of_month, self.month_name, self.year, self.year_suffix
            )
        }
    }
}

/// An era resolved for a particular year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedEra {
    /// Full era name.
    pub name: String,
    /// Short form appended to displayed years.
    pub abbrev: String,
    /// The year number within the era, honoring the era's direction.
    pub era_year: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_date() -> ComputedDate {
        ComputedDate {
            year: 1371,
            month_index: 4,
            month_name: "Mirtul".to_string(),
            day_of_month: 4,
            day_of_year: 124,
            day_of_week: "Fourthday".to_string(),
            day_of_week_index: 3,
            year_suffix: " DR".to_string(),
            is_intercalary: false,
        }
    }

    #[test]
    fn display_standard_day() {
        assert_eq!(sample_date().to_string(), "4 Mirtul, 1371 DR");
    }

    #[test]
    fn display_intercalary_day() {
        let date = ComputedDate {
            month_name: "Midwinter".to_string(),
            day_of_month: 1,
            day_of_week: String::new(),
            day_of_week_index: -1,
            is_intercalary: true,
            ..sample_date()
        };
        assert_eq!(date.to_string(), "Midwinter, 1371 DR");
    }

    #[test]
    fn display_day_counter() {
        let date = ComputedDate {
            month_name: String::new(),
            month_index: 0,
            day_of_month: 42,
            year: 0,
            year_suffix: String::new(),
            ..sample_date()
        };
        assert_eq!(date.to_string(), "day 42 of 0");
    }
}
