//! Identity-mutation guard.
//!
//! Color participates in the inventory key. Changing it on a product with
//! stock on hand would retroactively reinterpret every historical movement
//! recorded for that product, so the edit flow must call this guard before
//! any write that touches an identity-bearing attribute.

use serde::{Deserialize, Serialize};

use stockbook_catalog::SizeOrdering;
use stockbook_core::ProductId;

use crate::aggregate::Ledger;
use crate::key::InventoryKey;
use crate::reader::{MovementReader, StoreError};

/// The guard's decision. Disallowed mutation is a business outcome, not an
/// error; the caller relays `reason` to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationDecision {
    pub allowed: bool,
    pub reason: Option<String>,
    /// Total on hand across all sizes and colors, present when disallowed.
    pub current_balance: Option<u64>,
    /// Per-key breakdown backing `current_balance`, for user-facing detail.
    pub breakdown: Vec<(InventoryKey, u64)>,
}

impl MutationDecision {
    fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
            current_balance: None,
            breakdown: Vec::new(),
        }
    }
}

/// Decides whether an identity-bearing product attribute may change.
pub struct MutationGuard<R> {
    ledger: Ledger<R>,
    ordering: SizeOrdering,
}

impl<R: MovementReader> MutationGuard<R> {
    pub fn new(ledger: Ledger<R>) -> Self {
        Self {
            ledger,
            ordering: SizeOrdering::default(),
        }
    }

    /// Use a non-default size ordering for the breakdown.
    pub fn with_ordering(mut self, ordering: SizeOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Allowed iff the product's balance across all sizes and colors is zero.
    pub fn can_change_identity(
        &self,
        product_id: ProductId,
    ) -> Result<MutationDecision, StoreError> {
        let sheet = self.ledger.balances_for_products(&[product_id])?;
        let total = sheet.product_total(product_id);

        if total == 0 {
            return Ok(MutationDecision::allowed());
        }

        let breakdown: Vec<_> = sheet
            .breakdown_for(product_id, &self.ordering)
            .into_iter()
            .filter(|(_, on_hand)| *on_hand > 0)
            .collect();

        tracing::debug!(
            %product_id,
            total,
            variants = breakdown.len(),
            "identity mutation blocked: product has stock on hand"
        );

        Ok(MutationDecision {
            allowed: false,
            reason: Some(format!(
                "product has {total} unit(s) on hand across {} variant(s); \
                 the balance must reach zero before color can change",
                breakdown.len()
            )),
            current_balance: Some(total),
            breakdown,
        })
    }
}
