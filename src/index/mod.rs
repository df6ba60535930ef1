//! Ordered indexes for reeldb
//!
//! All indexes are AVL trees holding record ids, never record bodies.
//! The record store stays the single source of truth for content.
//!
//! # Components
//!
//! - `OrderedIndex`: sorted-map interface (get, put, remove, ceiling, range, entries)
//! - `AvlTreeMap`: height-balanced implementation of that interface
//! - `prefix_scan`: prefix search built from ceiling lookup and an ordered scan
//! - `IndexSet`: the title, year and genre indexes kept in step with the store
//!
//! # Invariants
//!
//! - Every node satisfies `|height(left) - height(right)| <= 1`
//! - In-order traversal yields strictly ascending keys
//! - Year and genre buckets are never empty

mod avl;
mod errors;
mod ordered;
mod prefix;
mod set;

pub use avl::{AvlTreeMap, Range};
pub use errors::{IndexError, IndexErrorCode, IndexResult, Severity};
pub use ordered::OrderedIndex;
pub use prefix::{prefix_entries, prefix_scan};
pub use set::IndexSet;
