//! Data models for test dates and test centers.
//!
//! - `Session`: one SAT test date as returned by the sessions endpoint
//! - `RawSchool`, `School`: a test center before and after normalization
//! - `DateGroup`: a session paired with its eligible schools

pub mod date_group;
pub mod school;
pub mod session;

pub use date_group::{sort_by_date, DateGroup};
pub use school::{is_eligible, normalize_school, RawSchool, School};
pub use session::Session;
