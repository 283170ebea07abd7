//! The date ⇄ day-counter conversion driver.
//!
//! Absolute day 0 is the first day of the first month of the calendar's
//! starting year. Year lookup avoids per-year loops: the number of leap
//! insertions over any span of years is computed in closed form, so a
//! single float estimate plus a couple of correction steps lands on the
//! right year even at day counts of 10^9 and beyond.
//!
//! Everything here is `i64`; the only float is the year estimate, whose
//! rounding error is corrected exactly afterwards.

use crate::date::{ComputedDate, ResolvedEra};
use crate::definition::{CalendarDefinition, Holiday, MonthKind};
use crate::error::{CalendarError, CalendarResult};

/// Pure date arithmetic over a validated [`CalendarDefinition`].
#[derive(Debug, Clone)]
pub struct CalendarDriver {
    def: CalendarDefinition,
    /// Sum of all month lengths, before leap insertions.
    base_days: i64,
    /// Sum of standard (week-counting) month lengths, before leap insertions.
    base_week_days: i64,
}

/// Number of multiples of `interval` in the half-open range `[from, to)`.
fn multiples_in(from: i64, to: i64, interval: i64) -> i64 {
    (to - 1).div_euclid(interval) - (from - 1).div_euclid(interval)
}

impl CalendarDriver {
    /// Validate a definition and build a driver over it. Months are kept
    /// sorted by their `order` field.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidDefinition`] when validation fails.
    pub fn new(mut def: CalendarDefinition) -> CalendarResult<Self> {
        def.validate()?;
        def.months.sort_by_key(|m| m.order);
        let base_days = def.months.iter().map(|m| m.days).sum();
        let base_week_days = def
            .months
            .iter()
            .filter(|m| m.kind == MonthKind::Standard)
            .map(|m| m.days)
            .sum();
        Ok(Self {
            def,
            base_days,
            base_week_days,
        })
    }

    /// The fallback driver over the plain day-counter calendar.
    pub fn day_counter() -> Self {
        Self::new(CalendarDefinition::day_counter()).expect("day counter is always valid")
    }

    /// The underlying definition, months sorted by order.
    pub fn definition(&self) -> &CalendarDefinition {
        &self.def
    }

    /// Whether any leap rule matches `year`.
    pub fn is_leap_year(&self, year: i64) -> bool {
        self.def
            .leap_rules
            .iter()
            .any(|r| (year - r.offset).rem_euclid(r.interval) == 0)
    }

    /// The month receiving the leap day in `year`, from the first matching
    /// rule. `None` when `year` is not a leap year.
    pub fn leap_day_target_month(&self, year: i64) -> Option<usize> {
        self.def
            .leap_rules
            .iter()
            .find(|r| (year - r.offset).rem_euclid(r.interval) == 0)
            .map(|r| r.target_month_index)
    }

    /// Whether the calendar has any leap rules at all.
    pub fn has_leap_rules(&self) -> bool {
        !self.def.leap_rules.is_empty()
    }

    /// Whether the calendar contains intercalary months.
    pub fn has_intercalary_months(&self) -> bool {
        self.def
            .months
            .iter()
            .any(|m| m.kind == MonthKind::Intercalary)
    }

    /// Number of weekdays in the week cycle.
    pub fn week_length(&self) -> usize {
        self.def.weekdays.len()
    }

    /// Total days in `year`, including leap insertions.
    pub fn total_days_in_year(&self, year: i64) -> i64 {
        let leap: i64 = self
            .def
            .leap_rules
            .iter()
            .filter(|r| (year - r.offset).rem_euclid(r.interval) == 0)
            .count() as i64;
        self.base_days + leap
    }

    /// Week-counting days in `year`: days of standard months, including a
    /// leap day when its target month is standard.
    pub fn week_counting_days_in_year(&self, year: i64) -> i64 {
        let leap: i64 = self
            .def
            .leap_rules
            .iter()
            .filter(|r| {
                self.def.months[r.target_month_index].kind == MonthKind::Standard
                    && (year - r.offset).rem_euclid(r.interval) == 0
            })
            .count() as i64;
        self.base_week_days + leap
    }

    /// Length of the month at `index` in `year`, including leap insertions.
    fn month_len(&self, year: i64, index: usize) -> i64 {
        let leap: i64 = self
            .def
            .leap_rules
            .iter()
            .filter(|r| {
                r.target_month_index == index && (year - r.offset).rem_euclid(r.interval) == 0
            })
            .count() as i64;
        self.def.months[index].days + leap
    }

    /// Days in the year span `[from, to)`, leap insertions included.
    /// Requires `from <= to`. When `standard_only` is set, intercalary
    /// months (and leap days landing in them) are excluded.
    fn days_in_span(&self, from: i64, to: i64, standard_only: bool) -> i64 {
        let base = if standard_only {
            self.base_week_days
        } else {
            self.base_days
        };
        let leap: i64 = self
            .def
            .leap_rules
            .iter()
            .filter(|r| {
                !standard_only
                    || self.def.months[r.target_month_index].kind == MonthKind::Standard
            })
            .map(|r| multiples_in(from - r.offset, to - r.offset, r.interval))
            .sum();
        (to - from) * base + leap
    }

    /// Signed day count from the start of the starting year to the start
    /// of `year`. Negative for years before the starting year.
    fn days_before_year(&self, year: i64) -> i64 {
        let start = self.def.starting_year;
        if year >= start {
            self.days_in_span(start, year, false)
        } else {
            -self.days_in_span(year, start, false)
        }
    }

    /// Signed week-counting day count up to the start of `year`.
    fn week_days_before_year(&self, year: i64) -> i64 {
        let start = self.def.starting_year;
        if year >= start {
            self.days_in_span(start, year, true)
        } else {
            -self.days_in_span(year, start, true)
        }
    }

    /// Find the year containing `absolute_day`.
    fn year_of(&self, absolute_day: i64) -> i64 {
        // Estimate, then correct. The estimate is off by at most a few
        // years from float rounding; each correction step is exact.
        let avg = self.base_days as f64
            + self
                .def
                .leap_rules
                .iter()
                .map(|r| 1.0 / r.interval as f64)
                .sum::<f64>();
        let mut year = self.def.starting_year + (absolute_day as f64 / avg).floor() as i64;
        while self.days_before_year(year + 1) <= absolute_day {
            year += 1;
        }
        while self.days_before_year(year) > absolute_day {
            year -= 1;
        }
        year
    }

    /// Resolve an absolute day counter into a full calendar date.
    pub fn date(&self, absolute_day: i64) -> ComputedDate {
        if self.def.months.is_empty() {
            // Day-counter fallback: no months, no weekdays, one long year.
            return ComputedDate {
                year: self.def.starting_year,
                month_index: 0,
                month_name: String::new(),
                day_of_month: absolute_day + 1,
                day_of_year: absolute_day,
                day_of_week: String::new(),
                day_of_week_index: -1,
                year_suffix: self.def.year_suffix.clone(),
                is_intercalary: false,
            };
        }

        let year = self.year_of(absolute_day);
        let day_of_year = absolute_day - self.days_before_year(year);

        let mut month_index = self.def.months.len() - 1;
        let mut before_month = 0;
        let mut acc = 0;
        for i in 0..self.def.months.len() {
            let len = self.month_len(year, i);
            if day_of_year < acc + len {
                month_index = i;
                before_month = acc;
                break;
            }
            acc += len;
        }
        let month = &self.def.months[month_index];
        let day_of_month = day_of_year - before_month + 1;
        let is_intercalary = month.kind == MonthKind::Intercalary;

        let (day_of_week_index, day_of_week) = if is_intercalary || self.def.weekdays.is_empty() {
            (-1, String::new())
        } else {
            let mut in_year = 0;
            for i in 0..month_index {
                if self.def.months[i].kind == MonthKind::Standard {
                    in_year += self.month_len(year, i);
                }
            }
            in_year += day_of_month - 1;
            let week_len = self.def.weekdays.len() as i64;
            let index = (self.week_days_before_year(year) + in_year).rem_euclid(week_len) as usize;
            (index as i32, self.def.weekdays[index].clone())
        };

        ComputedDate {
            year,
            month_index,
            month_name: month.name.clone(),
            day_of_month,
            day_of_year,
            day_of_week,
            day_of_week_index,
            year_suffix: self.def.year_suffix.clone(),
            is_intercalary,
        }
    }

    /// Convert a calendar date back into the absolute day counter.
    ///
    /// # Errors
    ///
    /// Returns [`CalendarError::InvalidDate`] when the month index or day
    /// of month is out of range for `year`.
    pub fn absolute_day(
        &self,
        year: i64,
        month_index: usize,
        day_of_month: i64,
    ) -> CalendarResult<i64> {
        if self.def.months.is_empty() {
            if month_index != 0 {
                return Err(CalendarError::InvalidDate(format!(
                    "day-counter calendar has no month {month_index}"
                )));
            }
            return Ok(day_of_month - 1);
        }

        if month_index >= self.def.months.len() {
            return Err(CalendarError::InvalidDate(format!(
                "month index {month_index} out of range ({} months)",
                self.def.months.len()
            )));
        }
        let len = self.month_len(year, month_index);
        if day_of_month < 1 || day_of_month > len {
            return Err(CalendarError::InvalidDate(format!(
                "day {day_of_month} out of range for month '{}' ({len} days in year {year})",
                self.def.months[month_index].name
            )));
        }

        let in_year: i64 = (0..month_index).map(|i| self.month_len(year, i)).sum();
        Ok(self.days_before_year(year) + in_year + day_of_month - 1)
    }

    /// Resolve the era containing `year`, scanning `[start_year, end_year)`.
    ///
    /// Ascending eras number years from `start_year` (year 1); descending
    /// eras count down toward their end year.
    pub fn era(&self, year: i64) -> Option<ResolvedEra> {
        self.def
            .eras
            .iter()
            .find(|e| year >= e.start_year && e.end_year.is_none_or(|end| year < end))
            .map(|e| {
                let era_year = if e.direction >= 0 {
                    year - e.start_year + 1
                } else {
                    // Validation guarantees descending eras carry an end year.
                    e.end_year.unwrap_or(e.start_year) - year
                };
                ResolvedEra {
                    name: e.name.clone(),
                    abbrev: e.abbrev.clone(),
                    era_year,
                }
            })
    }

    /// Holidays falling on the given date.
    pub fn holidays_on(&self, date: &ComputedDate) -> Vec<&Holiday> {
        self.def
            .holidays
            .iter()
            .filter(|h| h.month == date.month_index && h.day == date.day_of_month)
            .collect()
    }
}
