//! chained-hashset: a hash set built on separate chaining, where each bucket
//! is a doubly linked chain and the bucket array resizes itself.
//!
//! Internal Design:
//!
//! Layers
//! - `Chain<T>`: ordered, duplicate-permitting sequence for one bucket.
//!   Entries live in a per-chain `SlotMap` arena and link by arena key, so
//!   splicing is safe Rust with no shared ownership of nodes.
//! - `DynamicHashSet<T, S>`: owns a `Vec` of chains, a `BuildHasher`, a
//!   size counter and a `SetConfig`. It enforces set semantics and drives
//!   resizing.
//!
//! Capacity policy
//! - After an add, `len / capacity > load_factor_threshold` doubles the
//!   bucket count.
//! - After a remove, `len / capacity < 1 - load_factor_threshold` halves it,
//!   provided the set is above its initial capacity; it never goes lower.
//! - Each trigger performs exactly one rehash and does not cascade.
//!
//! Hashing
//! - Each entry stores the `u64` hash computed on insertion. Rehashing uses
//!   the stored hash only, so `T: Hash`/`T: Eq` never run during a resize and
//!   the rebuilt bucket array is installed in one assignment.
//!
//! Failure model
//! - `add` of a present value is a silent no-op; `remove` of an absent value
//!   is `SetError::KeyNotFound`. Failing calls leave the set unchanged.
//!
//! Constraints
//! - Single-threaded: the set is `!Send`/`!Sync`.
//! - Reentrancy from user `Hash`/`Eq` into the same set is detected in debug
//!   builds and panics.

pub mod chain;
mod chain_proptest;
pub mod config;
pub mod dynamic_hash_set;
mod dynamic_hash_set_proptest;
pub mod error;
mod reentrancy;

pub use chain::{Chain, Entry};
pub use config::{SetConfig, DEFAULT_INITIAL_CAPACITY, DEFAULT_LOAD_FACTOR_THRESHOLD};
pub use dynamic_hash_set::DynamicHashSet;
pub use error::{ChainError, SetError};
