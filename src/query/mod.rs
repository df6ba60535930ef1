//! Query and mutation layer for reeldb
//!
//! # Access patterns
//!
//! | Query            | Index  | Cost           |
//! |------------------|--------|----------------|
//! | by id            | store  | O(1)           |
//! | by title         | title  | O(log n)       |
//! | by title prefix  | title  | O(log n + m)   |
//! | by year          | year   | O(log n + k)   |
//! | by year range    | year   | O(log n + k)   |
//! | by genre         | genre  | O(log n + k)   |
//! | numeric range    | none   | O(n)           |
//!
//! Mutations (insert, delete, modify) update the store and all affected
//! indexes as one unit under an exclusive lock.

mod catalog;
mod engine;
mod errors;
mod setup;

pub use catalog::{Catalog, Modification};
pub use engine::{CatalogStats, QueryEngine};
pub use errors::{QueryError, QueryResult};
pub use setup::{load_catalog, CatalogSource};
