//! Balance aggregation over movement collections.
//!
//! `balance(K) = max(0, sum(inbound.qty | K) - sum(outbound.qty | K))`.
//!
//! Inbound and outbound sets are aggregated independently and merged by
//! normalized key; no nested-loop joins, linear in the number of movements.
//! A clamp that actually changes a value means the store recorded more
//! outbound than inbound for that key; that is surfaced as an
//! [`IntegrityWarning`], never silently corrected.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockbook_catalog::SizeOrdering;
use stockbook_core::{ColorId, ProductId};

use crate::key::InventoryKey;
use crate::movement::{InboundMovement, OutboundMovement};
use crate::reader::{MovementReader, ReferenceLookup, StoreError, fetch_inbound_all, fetch_outbound_all};

/// Derived balance for one key. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBalance {
    pub on_hand: u64,
    /// Timestamp of the latest movement seen for the key. Informational only.
    pub last_movement_at: Option<DateTime<Utc>>,
}

/// More outbound than inbound was ever recorded for a key; the balance was
/// clamped to zero. Signals upstream data inconsistency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityWarning {
    pub key: InventoryKey,
    pub inbound_total: u64,
    pub outbound_total: u64,
}

impl IntegrityWarning {
    /// How far below zero the unclamped balance would have gone.
    pub fn deficit(&self) -> u64 {
        self.outbound_total - self.inbound_total
    }
}

/// Key-level scoping applied during aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyFilter {
    product_ids: Option<HashSet<ProductId>>,
}

impl KeyFilter {
    /// Restrict aggregation to a product id set.
    pub fn products(ids: impl IntoIterator<Item = ProductId>) -> Self {
        Self {
            product_ids: Some(ids.into_iter().collect()),
        }
    }

    fn matches(&self, product_id: ProductId) -> bool {
        match &self.product_ids {
            Some(ids) => ids.contains(&product_id),
            None => true,
        }
    }
}

/// Per-key balances plus the integrity warnings produced while computing them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceSheet {
    balances: HashMap<InventoryKey, KeyBalance>,
    warnings: Vec<IntegrityWarning>,
}

impl BalanceSheet {
    /// On-hand quantity for an exact key. Unknown keys have balance zero.
    pub fn balance(&self, key: &InventoryKey) -> u64 {
        self.balances.get(key).map(|b| b.on_hand).unwrap_or(0)
    }

    pub fn get(&self, key: &InventoryKey) -> Option<&KeyBalance> {
        self.balances.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InventoryKey, &KeyBalance)> {
        self.balances.iter()
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    pub fn warnings(&self) -> &[IntegrityWarning] {
        &self.warnings
    }

    /// Total on hand for a product across all sizes and colors.
    pub fn product_total(&self, product_id: ProductId) -> u64 {
        self.balances
            .iter()
            .filter(|(k, _)| k.product_id == product_id)
            .map(|(_, b)| b.on_hand)
            .sum()
    }

    /// Per-key breakdown for one product, sorted by the size ordering.
    ///
    /// Child sizes come before adult sizes; adult sizes follow the configured
    /// rank. Ties (same size, different color) break on color id.
    pub fn breakdown_for(
        &self,
        product_id: ProductId,
        ordering: &SizeOrdering,
    ) -> Vec<(InventoryKey, u64)> {
        let mut rows: Vec<_> = self
            .balances
            .iter()
            .filter(|(k, _)| k.product_id == product_id)
            .map(|(k, b)| (k.clone(), b.on_hand))
            .collect();
        rows.sort_by(|(a, _), (b, _)| {
            ordering
                .cmp(a.size_code.as_str(), b.size_code.as_str())
                .then_with(|| a.color_id.cmp(&b.color_id))
        });
        rows
    }

    /// Roll up to product granularity (ignoring size and color).
    ///
    /// Computed from the per-key balances, never re-aggregated from raw
    /// movements, so a rollup can never drift from the sheet it came from.
    pub fn rollup_by_product(&self) -> HashMap<ProductId, u64> {
        let mut out: HashMap<ProductId, u64> = HashMap::new();
        for (key, bal) in &self.balances {
            *out.entry(key.product_id).or_insert(0) += bal.on_hand;
        }
        out
    }

    /// Roll up to product+color granularity (ignoring size).
    pub fn rollup_by_product_color(&self) -> HashMap<(ProductId, Option<ColorId>), u64> {
        let mut out: HashMap<(ProductId, Option<ColorId>), u64> = HashMap::new();
        for (key, bal) in &self.balances {
            *out.entry((key.product_id, key.color_id)).or_insert(0) += bal.on_hand;
        }
        out
    }
}

/// Aggregate movement collections into per-key balances.
///
/// Pure function of its inputs: same movements, same sheet. Keys are
/// normalized before grouping; raw values never group anything.
pub fn aggregate(
    inbound: &[InboundMovement],
    outbound: &[OutboundMovement],
    filter: Option<&KeyFilter>,
) -> BalanceSheet {
    let matches = |product_id: ProductId| filter.map(|f| f.matches(product_id)).unwrap_or(true);

    let mut inbound_totals: HashMap<InventoryKey, u64> = HashMap::new();
    let mut outbound_totals: HashMap<InventoryKey, u64> = HashMap::new();
    let mut last_seen: HashMap<InventoryKey, DateTime<Utc>> = HashMap::new();

    for m in inbound {
        if !matches(m.product_id) {
            continue;
        }
        let key = m.key();
        *inbound_totals.entry(key.clone()).or_insert(0) += u64::from(m.qty);
        last_seen
            .entry(key)
            .and_modify(|t| *t = (*t).max(m.created_at))
            .or_insert(m.created_at);
    }

    for m in outbound {
        if !matches(m.product_id) {
            continue;
        }
        let key = m.key();
        *outbound_totals.entry(key.clone()).or_insert(0) += u64::from(m.qty);
        last_seen
            .entry(key)
            .and_modify(|t| *t = (*t).max(m.created_at))
            .or_insert(m.created_at);
    }

    let keys: HashSet<InventoryKey> = inbound_totals
        .keys()
        .chain(outbound_totals.keys())
        .cloned()
        .collect();

    let mut balances = HashMap::with_capacity(keys.len());
    let mut warnings = Vec::new();

    for key in keys {
        let inbound_total = inbound_totals.get(&key).copied().unwrap_or(0);
        let outbound_total = outbound_totals.get(&key).copied().unwrap_or(0);

        let on_hand = if outbound_total > inbound_total {
            let warning = IntegrityWarning {
                key: key.clone(),
                inbound_total,
                outbound_total,
            };
            tracing::warn!(
                key = %warning.key,
                inbound = warning.inbound_total,
                outbound = warning.outbound_total,
                "balance clamped to zero: outbound exceeds inbound for key"
            );
            warnings.push(warning);
            0
        } else {
            inbound_total - outbound_total
        };

        let last_movement_at = last_seen.get(&key).copied();
        balances.insert(
            key,
            KeyBalance {
                on_hand,
                last_movement_at,
            },
        );
    }

    // Hash iteration order is not deterministic; fix the warning order.
    warnings.sort_by(|a, b| a.key.cmp(&b.key));

    BalanceSheet { balances, warnings }
}

/// Movement reader plus the exhaustive-paging aggregation rule.
///
/// Every balance that feeds a validation or mutation decision comes from
/// here: the complete history for the scoped products, paged until a short
/// page, then aggregated once.
#[derive(Debug, Clone)]
pub struct Ledger<R> {
    reader: R,
}

impl<R: MovementReader> Ledger<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Aggregate the complete movement history for a product id set.
    pub fn balances_for_products(
        &self,
        product_ids: &[ProductId],
    ) -> Result<BalanceSheet, StoreError> {
        if product_ids.is_empty() {
            return Ok(BalanceSheet::default());
        }
        let inbound = fetch_inbound_all(&self.reader, product_ids)?;
        let outbound = fetch_outbound_all(&self.reader, product_ids)?;
        let filter = KeyFilter::products(product_ids.iter().copied());
        Ok(aggregate(&inbound, &outbound, Some(&filter)))
    }

    /// Resolve the candidate product set for a free-text query, then
    /// aggregate the complete history for exactly those ids.
    pub fn balances_for_search<L: ReferenceLookup + ?Sized>(
        &self,
        query: &str,
        lookup: &L,
    ) -> Result<BalanceSheet, StoreError> {
        let ids = lookup.search_products(query)?;
        self.balances_for_products(&ids)
    }
}
