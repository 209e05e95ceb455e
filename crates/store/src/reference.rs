//! In-memory reference data: product/color display rows.
//!
//! Reference data enriches validator and guard output and resolves candidate
//! product sets for free-text scoping. It never participates in balance
//! correctness.

use std::collections::HashMap;
use std::sync::RwLock;

use stockbook_core::{ColorId, ProductId};
use stockbook_ledger::{ReferenceLookup, StoreError};

/// One product row of reference data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductRow {
    pub name: String,
    pub article: String,
    pub brand: Option<String>,
    pub color_id: Option<ColorId>,
}

/// One color row of reference data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorRow {
    pub name: String,
}

#[derive(Debug, Default)]
struct Tables {
    products: HashMap<ProductId, ProductRow>,
    colors: HashMap<ColorId, ColorRow>,
}

/// In-memory [`ReferenceLookup`] implementation.
#[derive(Debug, Default)]
pub struct InMemoryReferenceLookup {
    tables: RwLock<Tables>,
}

impl InMemoryReferenceLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert_product(&self, product_id: ProductId, row: ProductRow) {
        if let Ok(mut tables) = self.tables.write() {
            tables.products.insert(product_id, row);
        }
    }

    pub fn upsert_color(&self, color_id: ColorId, row: ColorRow) {
        if let Ok(mut tables) = self.tables.write() {
            tables.colors.insert(color_id, row);
        }
    }
}

impl ReferenceLookup for InMemoryReferenceLookup {
    fn product_name(&self, product_id: ProductId) -> Option<String> {
        let tables = self.tables.read().ok()?;
        tables.products.get(&product_id).map(|p| p.name.clone())
    }

    fn color_name(&self, color_id: ColorId) -> Option<String> {
        let tables = self.tables.read().ok()?;
        tables.colors.get(&color_id).map(|c| c.name.clone())
    }

    fn search_products(&self, query: &str) -> Result<Vec<ProductId>, StoreError> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;

        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let mut ids: Vec<ProductId> = tables
            .products
            .iter()
            .filter(|(_, row)| {
                let color_name = row
                    .color_id
                    .and_then(|c| tables.colors.get(&c))
                    .map(|c| c.name.as_str());
                row.name.to_lowercase().contains(&needle)
                    || row.article.to_lowercase().contains(&needle)
                    || row
                        .brand
                        .as_deref()
                        .is_some_and(|b| b.to_lowercase().contains(&needle))
                    || color_name.is_some_and(|c| c.to_lowercase().contains(&needle))
            })
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        Ok(ids)
    }
}
