//! Catalog identifier normalization (pure domain logic).
//!
//! Size, color and article values enter the system from several uncoordinated
//! paths (manual entry, bulk import, legacy rows) with inconsistent encodings,
//! including Cyrillic/Latin homoglyphs for single-letter sizes. Every
//! aggregation and validation step must agree on one canonical key, or
//! balances silently fragment across "the same" variant recorded under
//! different raw spellings. This crate owns the canonicalization rules and the
//! configuration-driven size ordering; it performs no IO and never fails.

pub mod normalize;
pub mod sizes;

pub use normalize::{RawColor, normalize_article, normalize_color_id, normalize_size_code};
pub use sizes::{SizeOrdering, SizeTaxonomy};
