//! Immutable stock movement records.
//!
//! Movements are append-only facts. They carry size/color values as entered
//! (raw); the aggregator normalizes keys at read time, so historical rows with
//! legacy spellings still land on the right balance. A movement is removed
//! only wholesale, together with its parent document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockbook_core::{MovementId, OrderId, ProductId, RealizationId, ReceiptId};

use crate::key::InventoryKey;

/// Stock entering the warehouse, parented by an intake receipt.
///
/// Intake is never blocked; no validation precedes an inbound write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMovement {
    pub id: MovementId,
    pub product_id: ProductId,
    /// Size label as entered; normalized at aggregation time.
    pub size_code: String,
    /// Color reference id as entered; may be zero or negative in legacy rows.
    pub color_id: Option<i64>,
    pub qty: u32,
    pub receipt_id: ReceiptId,
    pub created_at: DateTime<Utc>,
}

/// The document an outbound movement belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutboundParent {
    Realization(RealizationId),
    Order(OrderId),
}

/// Stock leaving the warehouse, parented by a realization or an order.
///
/// Written only after the validator (or the atomic committer) approved the
/// allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMovement {
    pub id: MovementId,
    pub product_id: ProductId,
    pub size_code: String,
    pub color_id: Option<i64>,
    pub qty: u32,
    pub parent: OutboundParent,
    pub created_at: DateTime<Utc>,
}

impl InboundMovement {
    /// The normalized key this movement contributes to.
    pub fn key(&self) -> InventoryKey {
        InventoryKey::normalized(self.product_id, &self.size_code, self.color_id)
    }
}

impl OutboundMovement {
    /// The normalized key this movement draws from.
    pub fn key(&self) -> InventoryKey {
        InventoryKey::normalized(self.product_id, &self.size_code, self.color_id)
    }
}
