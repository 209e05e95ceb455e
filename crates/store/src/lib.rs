//! In-memory movement storage and the concurrency-safe allocation commit.
//!
//! The hosted store behind the real system is out of scope; this crate
//! provides the in-memory implementation used by tests and development, plus
//! the pieces that must live next to storage regardless of backend: the
//! per-key advisory locks and the [`AllocationCommitter`] that make
//! validate-then-write one indivisible operation, the display-only balance
//! cache, and the reference-data lookup.

pub mod allocation;
pub mod cache;
pub mod locks;
pub mod movement_store;
pub mod reference;


pub use allocation::{AllocationCommitter, CommitOutcome};
pub use cache::{BalanceCache, ProductSnapshot};
pub use locks::{KeyLockGuard, KeyLockRegistry};
pub use movement_store::{InMemoryMovementStore, MovementWriter};
pub use reference::{ColorRow, InMemoryReferenceLookup, ProductRow};
