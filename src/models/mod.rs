//! Data models for the coverage backend.
//!
//! Field names serialize as camelCase to match the dashboard contract.

mod announcement;
mod datastore;
mod member;
mod task;

pub use announcement::*;
pub use datastore::*;
pub use member::*;
pub use task::*;
