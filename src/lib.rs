//! reeldb - embedded movie catalog with ordered secondary indexes
//!
//! Records live in a primary store keyed by id. Three AVL-tree indexes
//! (title, year, genre) hold ids only and are kept consistent with the
//! store by every mutation.

pub mod cli;
pub mod graph;
pub mod index;
pub mod observability;
pub mod query;
pub mod snapshot;
pub mod storage;
