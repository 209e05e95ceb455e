//! Canonical stock-keeping identity.

use serde::{Deserialize, Serialize};

use stockbook_catalog::{RawColor, normalize_size_code};
use stockbook_core::{ColorId, ProductId, ValueObject};

/// A canonical size label.
///
/// Always produced by [`normalize_size_code`]; raw labels never reach grouping
/// or comparison. The inner string is canonical by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizeCode(String);

impl SizeCode {
    /// Canonicalize a raw size label.
    pub fn normalize(raw: &str) -> Self {
        Self(normalize_size_code(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for SizeCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of one stock-keeping variant: (product, size, color).
///
/// A proper value type with derived equality and hashing, used directly as
/// the grouping key during aggregation. `color_id = None` means "no color".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InventoryKey {
    pub product_id: ProductId,
    pub size_code: SizeCode,
    pub color_id: Option<ColorId>,
}

impl InventoryKey {
    pub fn new(product_id: ProductId, size_code: SizeCode, color_id: Option<ColorId>) -> Self {
        Self {
            product_id,
            size_code,
            color_id,
        }
    }

    /// Build a key from raw size/color values, normalizing both.
    pub fn normalized<'a>(
        product_id: ProductId,
        raw_size: &str,
        raw_color: impl Into<RawColor<'a>>,
    ) -> Self {
        Self {
            product_id,
            size_code: SizeCode::normalize(raw_size),
            color_id: stockbook_catalog::normalize_color_id(raw_color),
        }
    }
}

impl ValueObject for InventoryKey {}

impl core::fmt::Display for InventoryKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.color_id {
            Some(color) => write!(f, "{}/{}/{}", self.product_id, self.size_code, color),
            None => write!(f, "{}/{}/-", self.product_id, self.size_code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn raw_spellings_of_one_variant_collapse_to_one_key() {
        let product = ProductId::new();
        let a = InventoryKey::normalized(product, "М", 7i64);
        let b = InventoryKey::normalized(product, " M ", "7");
        assert_eq!(a, b);

        let mut map = HashMap::new();
        map.insert(a, 1u64);
        *map.entry(b).or_insert(0) += 1;
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn zero_color_and_missing_color_are_the_same_key() {
        let product = ProductId::new();
        let a = InventoryKey::normalized(product, "42", 0i64);
        let b = InventoryKey::normalized(product, "42", Option::<i64>::None);
        assert_eq!(a, b);
        assert_eq!(a.color_id, None);
    }

    #[test]
    fn different_colors_are_different_keys() {
        let product = ProductId::new();
        let a = InventoryKey::normalized(product, "M", 1i64);
        let b = InventoryKey::normalized(product, "M", 2i64);
        assert_ne!(a, b);
    }
}
