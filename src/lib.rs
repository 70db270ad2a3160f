//! chained-table: a single-threaded, separate-chaining hash table that
//! hands ownership of superseded entries back to the caller, plus a
//! companion singly-linked queue.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: an associative container whose hashing and equality are fixed
//!   at construction (`S: BuildHasher`, `K: Eq`) and whose ownership
//!   hand-off points are explicit in the types.
//! - Pieces:
//!   - ChainTable<K, V, S>: bucket array of chain heads; chain entries live
//!     in a generational arena and link to each other by arena key.
//!   - TableConfig / TableError: construction-time sizing and the only
//!     fallible path (validation and bucket allocation).
//!   - Queue<T>: independent FIFO with reverse and merge sort; it shares
//!     the arena-of-links layout but nothing else.
//!
//! Constraints
//! - Single-threaded: the table is `!Sync`; callers needing sharing wrap
//!   it in their own lock.
//! - No duplicate keys: insert of an equal key overwrites and returns the
//!   displaced `(K, V)`.
//! - `len / capacity < max_load` after every insert; capacity only grows.
//!
//! Ownership hand-off
//! - `insert` on an existing key returns the old key and value.
//! - `remove` returns the stored key and value.
//! - `destroy(release_keys, release_values)` drops the chosen payload
//!   kinds and returns the others in a `Reclaimed`; `Drop` releases all.
//!
//! Hashing and rehashing
//! - Each entry stores the digest computed at insert time. Growth relinks
//!   entries by that digest, so `K: Hash` and `K: Eq` never run during a
//!   resize and arena slots are reused.
//!
//! Reentrancy policy
//! - User code (`Hash`, `Eq`) runs only while probing a chain. A
//!   debug-only guard panics if that code calls back into the same table.
//!   Drops of returned keys/values happen after the structure is
//!   consistent again.
//!
//! Notes and non-goals
//! - No iteration-order guarantee, no persistence, no serialization.
//! - The table never shrinks; `clear` keeps the bucket count.

mod chain_table;
mod chain_table_proptest;
mod config;
mod error;
pub mod queue;
mod reentrancy;

// Public surface
pub use chain_table::{ChainTable, Iter, IterMut, Reclaimed};
pub use config::{TableConfig, DEFAULT_CAPACITY, DEFAULT_MAX_LOAD, MIN_MAX_LOAD};
pub use error::TableError;
pub use queue::Queue;
