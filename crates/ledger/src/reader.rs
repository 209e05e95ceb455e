//! Glue traits to the surrounding system.
//!
//! The ledger reads movement collections and reference data through these
//! traits; the hosted store behind them is out of scope. Infrastructure
//! failures surface as [`StoreError`] and propagate unchanged. They are never
//! interpreted as "balance = 0" or "allowed".

use stockbook_core::{ColorId, ProductId};
use thiserror::Error;

use crate::movement::{InboundMovement, OutboundMovement};

/// Page size for movement reads. Event tables can exceed one page; any
/// balance used for a decision must come from an exhaustively paged read.
pub const PAGE_SIZE: usize = 500;

/// Transient failure talking to the movement store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("movement store unavailable: {0}")]
    Unavailable(String),

    #[error("movement read failed: {0}")]
    Read(String),

    #[error("movement write failed: {0}")]
    Write(String),
}

/// Paged, product-scoped read access to the movement collections.
///
/// A page request returns at most `limit` movements for the given product set,
/// ordered stably by the store. A page shorter than `limit` is the final one.
pub trait MovementReader: Send + Sync {
    fn inbound_page(
        &self,
        product_ids: &[ProductId],
        offset: usize,
        limit: usize,
    ) -> Result<Vec<InboundMovement>, StoreError>;

    fn outbound_page(
        &self,
        product_ids: &[ProductId],
        offset: usize,
        limit: usize,
    ) -> Result<Vec<OutboundMovement>, StoreError>;
}

impl<R> MovementReader for std::sync::Arc<R>
where
    R: MovementReader + ?Sized,
{
    fn inbound_page(
        &self,
        product_ids: &[ProductId],
        offset: usize,
        limit: usize,
    ) -> Result<Vec<InboundMovement>, StoreError> {
        (**self).inbound_page(product_ids, offset, limit)
    }

    fn outbound_page(
        &self,
        product_ids: &[ProductId],
        offset: usize,
        limit: usize,
    ) -> Result<Vec<OutboundMovement>, StoreError> {
        (**self).outbound_page(product_ids, offset, limit)
    }
}

/// Fetch the complete inbound history for a product set.
///
/// Loops until a short page; a partially fetched history must never feed a
/// validation or mutation decision.
pub fn fetch_inbound_all<R: MovementReader + ?Sized>(
    reader: &R,
    product_ids: &[ProductId],
) -> Result<Vec<InboundMovement>, StoreError> {
    let mut all = Vec::new();
    let mut offset = 0;
    loop {
        let page = reader.inbound_page(product_ids, offset, PAGE_SIZE)?;
        let short = page.len() < PAGE_SIZE;
        offset += page.len();
        all.extend(page);
        if short {
            return Ok(all);
        }
    }
}

/// Fetch the complete outbound history for a product set.
pub fn fetch_outbound_all<R: MovementReader + ?Sized>(
    reader: &R,
    product_ids: &[ProductId],
) -> Result<Vec<OutboundMovement>, StoreError> {
    let mut all = Vec::new();
    let mut offset = 0;
    loop {
        let page = reader.outbound_page(product_ids, offset, PAGE_SIZE)?;
        let short = page.len() < PAGE_SIZE;
        offset += page.len();
        all.extend(page);
        if short {
            return Ok(all);
        }
    }
}

/// Read-only reference data: display names and product search.
///
/// Used to enrich validator/guard output and to resolve candidate product
/// sets for free-text scoping. Never consulted for balance correctness.
pub trait ReferenceLookup: Send + Sync {
    fn product_name(&self, product_id: ProductId) -> Option<String>;

    fn color_name(&self, color_id: ColorId) -> Option<String>;

    /// Resolve the candidate product set for a free-text query (substring
    /// match over product/article/brand/color names). Scoped aggregation
    /// fetches the complete history for exactly these ids afterwards.
    fn search_products(&self, query: &str) -> Result<Vec<ProductId>, StoreError>;
}

impl<L> ReferenceLookup for std::sync::Arc<L>
where
    L: ReferenceLookup + ?Sized,
{
    fn product_name(&self, product_id: ProductId) -> Option<String> {
        (**self).product_name(product_id)
    }

    fn color_name(&self, color_id: ColorId) -> Option<String> {
        (**self).color_name(color_id)
    }

    fn search_products(&self, query: &str) -> Result<Vec<ProductId>, StoreError> {
        (**self).search_products(query)
    }
}
