//! Fantasy calendar arithmetic for the Almanac engine.
//!
//! Converts between an absolute day counter and structured dates under a
//! declarative calendar definition: arbitrary month lists with intercalary
//! festival days, leap rules, eras, and week cycles that skip intercalary
//! days. All arithmetic is pure `i64` and stable to at least 10^9 days.

/// Date output types.
pub mod date;
/// Declarative calendar definition records.
pub mod definition;
/// The date ⇄ day-counter conversion driver.
pub mod driver;
/// Error types for the calendar crate.
pub mod error;

pub use date::{ComputedDate, ResolvedEra};
pub use definition::{CalendarDefinition, Era, Holiday, LeapRule, Month, MonthKind};
pub use driver::CalendarDriver;
pub use error::{CalendarError, CalendarResult};
