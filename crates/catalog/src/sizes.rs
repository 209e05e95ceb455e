//! Configuration-driven size ordering.
//!
//! Listing pages sort variants by size. The ordering is a data lookup over an
//! injected configuration: one ordered list for the adult letter taxonomy and
//! a numeric comparison for the child taxonomy. No substring heuristics.

use core::cmp::Ordering;
use serde::{Deserialize, Serialize};

/// Which sizing taxonomy a canonical size code belongs to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeTaxonomy {
    /// Numeric child sizes, including growth-banded labels ("30/116-122").
    Child,
    /// Letter adult sizes ("XS".."4XL").
    Adult,
}

/// Ordered size comparison, configured rather than inferred.
///
/// Child sizes compare by their leading number and sort before adult sizes;
/// adult sizes compare by position in the configured list, with unknown
/// labels after all known ones (then lexicographically, for determinism).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeOrdering {
    adult: Vec<String>,
}

impl Default for SizeOrdering {
    fn default() -> Self {
        Self::new(
            ["XS", "S", "M", "L", "XL", "XXL", "3XL", "4XL"]
                .into_iter()
                .map(String::from)
                .collect(),
        )
    }
}

impl SizeOrdering {
    pub fn new(adult: Vec<String>) -> Self {
        Self { adult }
    }

    /// Classify a canonical size code.
    pub fn classify(&self, code: &str) -> SizeTaxonomy {
        if code.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            SizeTaxonomy::Child
        } else {
            SizeTaxonomy::Adult
        }
    }

    /// Compare two canonical size codes.
    pub fn cmp(&self, a: &str, b: &str) -> Ordering {
        match (self.classify(a), self.classify(b)) {
            (SizeTaxonomy::Child, SizeTaxonomy::Adult) => Ordering::Less,
            (SizeTaxonomy::Adult, SizeTaxonomy::Child) => Ordering::Greater,
            (SizeTaxonomy::Child, SizeTaxonomy::Child) => leading_number(a)
                .cmp(&leading_number(b))
                .then_with(|| a.cmp(b)),
            (SizeTaxonomy::Adult, SizeTaxonomy::Adult) => self
                .adult_rank(a)
                .cmp(&self.adult_rank(b))
                .then_with(|| a.cmp(b)),
        }
    }

    fn adult_rank(&self, code: &str) -> usize {
        self.adult
            .iter()
            .position(|s| s == code)
            .unwrap_or(self.adult.len())
    }
}

fn leading_number(code: &str) -> u64 {
    let digits: String = code.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adult_sizes_follow_configured_order() {
        let ord = SizeOrdering::default();
        assert_eq!(ord.cmp("S", "M"), Ordering::Less);
        assert_eq!(ord.cmp("XL", "L"), Ordering::Greater);
        assert_eq!(ord.cmp("M", "M"), Ordering::Equal);
    }

    #[test]
    fn unknown_adult_sizes_sort_after_known() {
        let ord = SizeOrdering::default();
        assert_eq!(ord.cmp("4XL", "ONESIZE"), Ordering::Less);
    }

    #[test]
    fn child_sizes_compare_numerically() {
        let ord = SizeOrdering::default();
        assert_eq!(ord.cmp("28", "30"), Ordering::Less);
        assert_eq!(ord.cmp("110", "98"), Ordering::Greater);
        // Growth-banded labels compare by their garment size.
        assert_eq!(ord.cmp("28/110-116", "30/116-122"), Ordering::Less);
    }

    #[test]
    fn child_sizes_sort_before_adult_sizes() {
        let ord = SizeOrdering::default();
        assert_eq!(ord.cmp("30", "XS"), Ordering::Less);
        assert_eq!(ord.cmp("M", "34/128-134"), Ordering::Greater);
    }

    #[test]
    fn custom_adult_list_is_honored() {
        let ord = SizeOrdering::new(vec!["S".into(), "XS".into()]);
        assert_eq!(ord.cmp("S", "XS"), Ordering::Less);
    }
}
