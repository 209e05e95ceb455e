//! Allocation validation against derived balances.
//!
//! Read-only gate in front of every outbound write. Insufficient stock is a
//! structured outcome, not an error; only store failures propagate as
//! [`StoreError`]. The validator reflects the balance at the instant of the
//! read and reserves nothing; the store crate's committer closes the
//! check-then-write gap for flows that need it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use stockbook_core::ProductId;

use crate::aggregate::Ledger;
use crate::key::InventoryKey;
use crate::reader::{MovementReader, ReferenceLookup, StoreError};

/// One requested outbound line, in raw form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationLine {
    pub product_id: ProductId,
    pub size_code: String,
    pub color_id: Option<i64>,
    pub qty: u32,
}

/// A line that asked for more than is on hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub key: InventoryKey,
    pub requested: u64,
    pub available: u64,
    /// Display name, when reference data has one. Enrichment only.
    pub product_name: Option<String>,
}

/// The validator's decision: valid iff no line fell short.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub shortfalls: Vec<Shortfall>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.shortfalls.is_empty()
    }
}

/// Checks a proposed set of outbound allocations against current balances.
pub struct StockValidator<R> {
    ledger: Ledger<R>,
    reference: Option<std::sync::Arc<dyn ReferenceLookup>>,
}

impl<R: MovementReader> StockValidator<R> {
    pub fn new(ledger: Ledger<R>) -> Self {
        Self {
            ledger,
            reference: None,
        }
    }

    /// Attach reference data for display names in shortfall reports.
    pub fn with_reference(mut self, reference: std::sync::Arc<dyn ReferenceLookup>) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Validate every line against the balance of its exact key.
    ///
    /// Lines that target the same key accumulate before comparison: asking
    /// twice for 3 units of one variant is a request for 6. The aggregation
    /// is scoped to exactly the products on the lines and fetches their
    /// complete history.
    pub fn validate(&self, lines: &[AllocationLine]) -> Result<ValidationOutcome, StoreError> {
        if lines.is_empty() {
            return Ok(ValidationOutcome::default());
        }

        // Normalize keys first; grouping and comparison never see raw values.
        let mut requested: HashMap<InventoryKey, u64> = HashMap::new();
        let mut key_order: Vec<InventoryKey> = Vec::new();
        for line in lines {
            let key = InventoryKey::normalized(line.product_id, &line.size_code, line.color_id);
            if !requested.contains_key(&key) {
                key_order.push(key.clone());
            }
            *requested.entry(key).or_insert(0) += u64::from(line.qty);
        }

        let mut product_ids: Vec<ProductId> = key_order.iter().map(|k| k.product_id).collect();
        product_ids.sort();
        product_ids.dedup();

        let sheet = self.ledger.balances_for_products(&product_ids)?;

        let mut shortfalls = Vec::new();
        for key in key_order {
            let requested_qty = requested[&key];
            let available = sheet.balance(&key);
            if requested_qty > available {
                let product_name = self
                    .reference
                    .as_ref()
                    .and_then(|r| r.product_name(key.product_id));
                tracing::debug!(
                    key = %key,
                    requested = requested_qty,
                    available,
                    "allocation line rejected: insufficient stock"
                );
                shortfalls.push(Shortfall {
                    key,
                    requested: requested_qty,
                    available,
                    product_name,
                });
            }
        }

        Ok(ValidationOutcome { shortfalls })
    }
}
