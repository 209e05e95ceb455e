//! Atomic validate-then-commit for outbound allocations.
//!
//! The validator alone reflects the balance at the instant of its read; two
//! concurrent requests against the same key can each observe sufficient
//! balance and each proceed to write, over-allocating stock. The committer
//! closes that gap: it takes the per-key advisory locks for every key the
//! allocation touches, validates against a freshly aggregated balance, and
//! appends the outbound movements while still holding the locks.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use stockbook_core::MovementId;
use stockbook_ledger::{
    AllocationLine, InventoryKey, Ledger, MovementReader, OutboundMovement, OutboundParent,
    ReferenceLookup, StockValidator, StoreError, ValidationOutcome,
};

use crate::locks::KeyLockRegistry;
use crate::movement_store::MovementWriter;

/// Result of an attempted commit. Rejection is a business outcome carrying
/// the full shortfall report; only store failures surface as `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// All lines fit; the outbound movements were written.
    Committed(Vec<MovementId>),
    /// At least one line fell short; nothing was written.
    Rejected(ValidationOutcome),
}

impl CommitOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed(_))
    }
}

/// Validates and persists an outbound allocation as one indivisible step.
pub struct AllocationCommitter<S> {
    store: Arc<S>,
    locks: Arc<KeyLockRegistry>,
    reference: Option<Arc<dyn ReferenceLookup>>,
}

impl<S> AllocationCommitter<S>
where
    S: MovementReader + MovementWriter,
{
    pub fn new(store: Arc<S>, locks: Arc<KeyLockRegistry>) -> Self {
        Self {
            store,
            locks,
            reference: None,
        }
    }

    /// Attach reference data for display names in rejection reports.
    pub fn with_reference(mut self, reference: Arc<dyn ReferenceLookup>) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Validate `lines` and, if every line fits, write the outbound
    /// movements under `parent`.
    ///
    /// The per-key locks are held across the whole sequence, so of two
    /// concurrent commits competing for the same balance exactly one wins.
    pub fn commit(
        &self,
        parent: OutboundParent,
        lines: &[AllocationLine],
        at: DateTime<Utc>,
    ) -> Result<CommitOutcome, StoreError> {
        if lines.is_empty() {
            return Ok(CommitOutcome::Committed(Vec::new()));
        }

        let keys = lines
            .iter()
            .map(|line| InventoryKey::normalized(line.product_id, &line.size_code, line.color_id));
        let _guard = self.locks.lock(keys);

        let mut validator = StockValidator::new(Ledger::new(Arc::clone(&self.store)));
        if let Some(reference) = &self.reference {
            validator = validator.with_reference(Arc::clone(reference));
        }

        let outcome = validator.validate(lines)?;
        if !outcome.is_valid() {
            tracing::debug!(
                lines = lines.len(),
                shortfalls = outcome.shortfalls.len(),
                "allocation rejected; nothing written"
            );
            return Ok(CommitOutcome::Rejected(outcome));
        }

        let movements: Vec<OutboundMovement> = lines
            .iter()
            .map(|line| OutboundMovement {
                id: MovementId::new(),
                product_id: line.product_id,
                size_code: line.size_code.clone(),
                color_id: line.color_id,
                qty: line.qty,
                parent,
                created_at: at,
            })
            .collect();
        let ids: Vec<MovementId> = movements.iter().map(|m| m.id).collect();

        self.store.append_outbound(movements)?;
        tracing::debug!(lines = lines.len(), "allocation committed");

        Ok(CommitOutcome::Committed(ids))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use stockbook_core::{OrderId, ProductId, ReceiptId};
    use stockbook_ledger::InboundMovement;

    use crate::movement_store::InMemoryMovementStore;

    fn stocked_store(product: ProductId, size: &str, color: Option<i64>, qty: u32) -> Arc<InMemoryMovementStore> {
        let store = Arc::new(InMemoryMovementStore::new());
        store
            .record_inbound(vec![InboundMovement {
                id: MovementId::new(),
                product_id: product,
                size_code: size.to_string(),
                color_id: color,
                qty,
                receipt_id: ReceiptId::new(),
                created_at: Utc::now(),
            }])
            .unwrap();
        store
    }

    fn line(product: ProductId, size: &str, color: Option<i64>, qty: u32) -> AllocationLine {
        AllocationLine {
            product_id: product,
            size_code: size.to_string(),
            color_id: color,
            qty,
        }
    }

    #[test]
    fn fitting_allocation_is_committed() {
        let p1 = ProductId::new();
        let store = stocked_store(p1, "M", Some(3), 10);
        let committer = AllocationCommitter::new(Arc::clone(&store), Arc::new(KeyLockRegistry::new()));

        let outcome = committer
            .commit(
                OutboundParent::Order(OrderId::new()),
                &[line(p1, "M", Some(3), 4)],
                Utc::now(),
            )
            .unwrap();

        assert!(outcome.is_committed());
        assert_eq!(store.outbound_count(), 1);
    }

    #[test]
    fn oversized_allocation_is_rejected_and_writes_nothing() {
        let p1 = ProductId::new();
        let store = stocked_store(p1, "M", Some(3), 5);
        let committer = AllocationCommitter::new(Arc::clone(&store), Arc::new(KeyLockRegistry::new()));

        let outcome = committer
            .commit(
                OutboundParent::Order(OrderId::new()),
                &[line(p1, "M", Some(3), 7)],
                Utc::now(),
            )
            .unwrap();

        match outcome {
            CommitOutcome::Rejected(validation) => {
                assert_eq!(validation.shortfalls.len(), 1);
                assert_eq!(validation.shortfalls[0].available, 5);
                assert_eq!(validation.shortfalls[0].requested, 7);
            }
            CommitOutcome::Committed(_) => panic!("expected rejection"),
        }
        assert_eq!(store.outbound_count(), 0);
    }

    #[test]
    fn partially_failing_allocation_rejects_the_whole_operation() {
        let p1 = ProductId::new();
        let store = stocked_store(p1, "M", None, 5);
        let committer = AllocationCommitter::new(Arc::clone(&store), Arc::new(KeyLockRegistry::new()));

        let outcome = committer
            .commit(
                OutboundParent::Order(OrderId::new()),
                &[line(p1, "M", None, 2), line(p1, "L", None, 1)],
                Utc::now(),
            )
            .unwrap();

        assert!(!outcome.is_committed());
        // The fitting line is not written either.
        assert_eq!(store.outbound_count(), 0);
    }

    #[test]
    fn empty_allocation_commits_nothing() {
        let p1 = ProductId::new();
        let store = stocked_store(p1, "M", None, 5);
        let committer = AllocationCommitter::new(Arc::clone(&store), Arc::new(KeyLockRegistry::new()));

        let outcome = committer
            .commit(OutboundParent::Order(OrderId::new()), &[], Utc::now())
            .unwrap();

        assert_eq!(outcome, CommitOutcome::Committed(Vec::new()));
        assert_eq!(store.outbound_count(), 0);
    }

    #[test]
    fn sequential_commits_drain_the_balance_exactly_once() {
        let p1 = ProductId::new();
        let store = stocked_store(p1, "M", None, 5);
        let committer = AllocationCommitter::new(Arc::clone(&store), Arc::new(KeyLockRegistry::new()));
        let parent = OutboundParent::Order(OrderId::new());

        let first = committer
            .commit(parent, &[line(p1, "M", None, 5)], Utc::now())
            .unwrap();
        let second = committer
            .commit(parent, &[line(p1, "M", None, 5)], Utc::now())
            .unwrap();

        assert!(first.is_committed());
        assert!(!second.is_committed());
    }
}
