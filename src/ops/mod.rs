//! The query language and its evaluation over normalized items.

pub mod filter;
pub mod query;
pub mod text;

pub use filter::compute_matches;
pub use query::Query;
