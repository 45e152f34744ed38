//! Per-author and per-week contribution statistics from git history.
//!
//! [`aggregate::analyze`] walks history from a start commit, diffs each
//! commit against its first parent (or the empty tree for a root commit),
//! filters the changed paths and accumulates the result into an
//! [`model::AggregationResult`].

pub mod aggregate;
pub mod cli;
pub mod diff;
pub mod error;
pub mod filter;
pub mod git;
pub mod model;
pub mod report;
pub mod week;

pub use aggregate::analyze;
pub use error::{Result, StatsError};
pub use filter::{include, FilterConfig};
pub use model::AggregationResult;
