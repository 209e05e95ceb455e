//! Display-only balance cache.
//!
//! Listing and reporting pages tolerate staleness that validation and the
//! mutation guard must not. This cache is an explicitly owned component with
//! an injected TTL and an explicit invalidation call; decision paths never
//! read from it. Entries past their TTL read as absent.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

use stockbook_core::ProductId;
use stockbook_ledger::{BalanceSheet, InventoryKey, SizeOrdering};

/// A cached, possibly stale view of one product's balances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSnapshot {
    pub total: u64,
    pub by_key: Vec<(InventoryKey, u64)>,
    pub cached_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct BalanceCache {
    ttl: Duration,
    ordering: SizeOrdering,
    entries: RwLock<HashMap<ProductId, ProductSnapshot>>,
}

impl BalanceCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            ordering: SizeOrdering::default(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Use a non-default size ordering for cached breakdowns.
    pub fn with_ordering(mut self, ordering: SizeOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Store a product's view taken from a freshly aggregated sheet.
    ///
    /// The breakdown is sorted by the size ordering, ready for listing pages.
    pub fn put(&self, product_id: ProductId, sheet: &BalanceSheet) {
        let snapshot = ProductSnapshot {
            total: sheet.product_total(product_id),
            by_key: sheet.breakdown_for(product_id, &self.ordering),
            cached_at: Utc::now(),
        };
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(product_id, snapshot);
        }
    }

    /// Fetch a snapshot if present and within TTL.
    pub fn get(&self, product_id: ProductId) -> Option<ProductSnapshot> {
        let entries = self.entries.read().ok()?;
        let snapshot = entries.get(&product_id)?;
        let age = Utc::now().signed_duration_since(snapshot.cached_at);
        if age > self.ttl {
            return None;
        }
        Some(snapshot.clone())
    }

    /// Drop one product's entry. Called after any write that changes its
    /// balances (outbound commit, parent deletion).
    pub fn invalidate(&self, product_id: ProductId) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(&product_id);
        }
    }

    /// Drop everything.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc as ChronoUtc;
    use stockbook_core::{MovementId, ReceiptId};
    use stockbook_ledger::{InboundMovement, aggregate};

    fn sheet_for(product: ProductId, qty: u32) -> BalanceSheet {
        aggregate(
            &[InboundMovement {
                id: MovementId::new(),
                product_id: product,
                size_code: "M".to_string(),
                color_id: None,
                qty,
                receipt_id: ReceiptId::new(),
                created_at: ChronoUtc::now(),
            }],
            &[],
            None,
        )
    }

    #[test]
    fn fresh_entry_is_served() {
        let cache = BalanceCache::new(Duration::minutes(5));
        let p1 = ProductId::new();
        cache.put(p1, &sheet_for(p1, 7));

        let snapshot = cache.get(p1).unwrap();
        assert_eq!(snapshot.total, 7);
        assert_eq!(snapshot.by_key.len(), 1);
    }

    #[test]
    fn snapshot_breakdown_is_size_ordered() {
        let cache = BalanceCache::new(Duration::minutes(5));
        let p1 = ProductId::new();
        let movements: Vec<InboundMovement> = [("S", 1), ("XS", 2)]
            .into_iter()
            .map(|(size, qty)| InboundMovement {
                id: MovementId::new(),
                product_id: p1,
                size_code: size.to_string(),
                color_id: None,
                qty,
                receipt_id: ReceiptId::new(),
                created_at: ChronoUtc::now(),
            })
            .collect();
        cache.put(p1, &aggregate(&movements, &[], None));

        let sizes: Vec<_> = cache
            .get(p1)
            .unwrap()
            .by_key
            .iter()
            .map(|(k, _)| k.size_code.as_str().to_string())
            .collect();
        assert_eq!(sizes, vec!["XS", "S"]);
    }

    #[test]
    fn expired_entry_reads_as_absent() {
        // Negative TTL: everything is immediately stale.
        let cache = BalanceCache::new(Duration::seconds(-1));
        let p1 = ProductId::new();
        cache.put(p1, &sheet_for(p1, 7));
        assert_eq!(cache.get(p1), None);
    }

    #[test]
    fn invalidate_drops_one_product_only() {
        let cache = BalanceCache::new(Duration::minutes(5));
        let p1 = ProductId::new();
        let p2 = ProductId::new();
        cache.put(p1, &sheet_for(p1, 1));
        cache.put(p2, &sheet_for(p2, 2));

        cache.invalidate(p1);
        assert_eq!(cache.get(p1), None);
        assert!(cache.get(p2).is_some());
    }

    #[test]
    fn clear_drops_everything() {
        let cache = BalanceCache::new(Duration::minutes(5));
        let p1 = ProductId::new();
        cache.put(p1, &sheet_for(p1, 1));
        cache.clear();
        assert_eq!(cache.get(p1), None);
    }

    #[test]
    fn unknown_product_is_a_miss() {
        let cache = BalanceCache::new(Duration::minutes(5));
        assert_eq!(cache.get(ProductId::new()), None);
    }
}
