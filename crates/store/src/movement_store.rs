//! In-memory movement store.
//!
//! Intended for tests/dev. Mirrors the contract the hosted store must honor:
//! movements are append-only, reads are paged and product-scoped with a
//! stable order, and deletion happens only wholesale through a parent
//! document.

use std::sync::RwLock;

use stockbook_core::{OrderId, ProductId, RealizationId, ReceiptId};
use stockbook_ledger::{InboundMovement, MovementReader, OutboundMovement, OutboundParent, StoreError};

/// Append access to the movement collections.
///
/// Inbound is written by intake with no validation. Outbound must only be
/// written after validation; flows that need the check and the write to be
/// indivisible go through [`crate::AllocationCommitter`] instead of calling
/// `append_outbound` directly.
pub trait MovementWriter: Send + Sync {
    fn record_inbound(&self, movements: Vec<InboundMovement>) -> Result<(), StoreError>;

    fn append_outbound(&self, movements: Vec<OutboundMovement>) -> Result<(), StoreError>;

    /// Hard-delete all inbound movements of a receipt. Retroactively changes
    /// every derived balance the receipt contributed to; there is no
    /// soft-delete or audit trail.
    fn delete_receipt(&self, receipt_id: ReceiptId) -> Result<usize, StoreError>;

    /// Hard-delete all outbound movements of a realization.
    fn delete_realization(&self, realization_id: RealizationId) -> Result<usize, StoreError>;

    /// Hard-delete all outbound movements of an order.
    fn delete_order(&self, order_id: OrderId) -> Result<usize, StoreError>;
}

#[derive(Debug, Default)]
struct Collections {
    inbound: Vec<InboundMovement>,
    outbound: Vec<OutboundMovement>,
}

/// In-memory movement store. Insertion order is the stable read order.
#[derive(Debug, Default)]
pub struct InMemoryMovementStore {
    collections: RwLock<Collections>,
}

impl InMemoryMovementStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inbound_count(&self) -> usize {
        self.collections.read().map(|c| c.inbound.len()).unwrap_or(0)
    }

    pub fn outbound_count(&self) -> usize {
        self.collections.read().map(|c| c.outbound.len()).unwrap_or(0)
    }
}

fn poisoned(_: impl core::fmt::Debug) -> StoreError {
    StoreError::Unavailable("lock poisoned".to_string())
}

impl MovementReader for InMemoryMovementStore {
    fn inbound_page(
        &self,
        product_ids: &[ProductId],
        offset: usize,
        limit: usize,
    ) -> Result<Vec<InboundMovement>, StoreError> {
        let collections = self.collections.read().map_err(poisoned)?;
        Ok(collections
            .inbound
            .iter()
            .filter(|m| product_ids.contains(&m.product_id))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn outbound_page(
        &self,
        product_ids: &[ProductId],
        offset: usize,
        limit: usize,
    ) -> Result<Vec<OutboundMovement>, StoreError> {
        let collections = self.collections.read().map_err(poisoned)?;
        Ok(collections
            .outbound
            .iter()
            .filter(|m| product_ids.contains(&m.product_id))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

impl MovementWriter for InMemoryMovementStore {
    fn record_inbound(&self, movements: Vec<InboundMovement>) -> Result<(), StoreError> {
        let mut collections = self.collections.write().map_err(poisoned)?;
        collections.inbound.extend(movements);
        Ok(())
    }

    fn append_outbound(&self, movements: Vec<OutboundMovement>) -> Result<(), StoreError> {
        let mut collections = self.collections.write().map_err(poisoned)?;
        collections.outbound.extend(movements);
        Ok(())
    }

    fn delete_receipt(&self, receipt_id: ReceiptId) -> Result<usize, StoreError> {
        let mut collections = self.collections.write().map_err(poisoned)?;
        let before = collections.inbound.len();
        collections.inbound.retain(|m| m.receipt_id != receipt_id);
        let removed = before - collections.inbound.len();
        tracing::debug!(%receipt_id, removed, "receipt deleted with its inbound movements");
        Ok(removed)
    }

    fn delete_realization(&self, realization_id: RealizationId) -> Result<usize, StoreError> {
        let mut collections = self.collections.write().map_err(poisoned)?;
        let before = collections.outbound.len();
        collections
            .outbound
            .retain(|m| m.parent != OutboundParent::Realization(realization_id));
        let removed = before - collections.outbound.len();
        tracing::debug!(%realization_id, removed, "realization deleted with its outbound movements");
        Ok(removed)
    }

    fn delete_order(&self, order_id: OrderId) -> Result<usize, StoreError> {
        let mut collections = self.collections.write().map_err(poisoned)?;
        let before = collections.outbound.len();
        collections
            .outbound
            .retain(|m| m.parent != OutboundParent::Order(order_id));
        let removed = before - collections.outbound.len();
        tracing::debug!(%order_id, removed, "order deleted with its outbound movements");
        Ok(removed)
    }
}

impl<S> MovementWriter for std::sync::Arc<S>
where
    S: MovementWriter + ?Sized,
{
    fn record_inbound(&self, movements: Vec<InboundMovement>) -> Result<(), StoreError> {
        (**self).record_inbound(movements)
    }

    fn append_outbound(&self, movements: Vec<OutboundMovement>) -> Result<(), StoreError> {
        (**self).append_outbound(movements)
    }

    fn delete_receipt(&self, receipt_id: ReceiptId) -> Result<usize, StoreError> {
        (**self).delete_receipt(receipt_id)
    }

    fn delete_realization(&self, realization_id: RealizationId) -> Result<usize, StoreError> {
        (**self).delete_realization(realization_id)
    }

    fn delete_order(&self, order_id: OrderId) -> Result<usize, StoreError> {
        (**self).delete_order(order_id)
    }
}
