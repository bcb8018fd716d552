//! Outbound ports and their in-memory adapters.
//!
//! The engine talks to three collaborators: the hours service (attendance
//! summaries), the meal deduction service (cafeteria consumption) and the
//! payroll repository (persisted records). Each is an object-safe async
//! trait; the in-memory adapters back tests, benchmarks and embedders that
//! have no real backend yet.

mod hours;
mod meal;
mod repository;

pub use hours::{HoursLookup, HoursService, StaticHoursService};
pub use meal::{MealDeductionService, MealLookup, StaticMealDeductionService};
pub use repository::{InMemoryPayrollRepository, PayrollRepository};
