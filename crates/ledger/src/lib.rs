//! Inventory balance ledger (deterministic domain logic).
//!
//! Stock on hand is never stored as a mutable counter. It is derived on every
//! read by summing immutable inbound movements and subtracting immutable
//! outbound movements, grouped by the canonical (product, size, color) key.
//! This crate owns that aggregation, the allocation validator that gates every
//! outbound write, and the mutation guard that blocks identity-changing
//! product edits while stock is on hand. Reading the movement collections goes
//! through the [`MovementReader`] trait; storage lives elsewhere.

pub mod aggregate;
pub mod guard;
pub mod key;
pub mod movement;
pub mod reader;
pub mod validator;

pub use aggregate::{BalanceSheet, IntegrityWarning, KeyBalance, KeyFilter, Ledger, aggregate};
pub use stockbook_catalog::SizeOrdering;
pub use guard::{MutationDecision, MutationGuard};
pub use key::{InventoryKey, SizeCode};
pub use movement::{InboundMovement, OutboundMovement, OutboundParent};
pub use reader::{MovementReader, ReferenceLookup, StoreError, PAGE_SIZE};
pub use validator::{AllocationLine, Shortfall, StockValidator, ValidationOutcome};
