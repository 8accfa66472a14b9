//! Persistence seam for product records.
//!
//! Everything above this module (routes, importer, exporter, CLI) talks to a
//! `dyn ProductStore`, so the same flows run against Postgres in production
//! and against [`InMemoryProductStore`](super::InMemoryProductStore) in tests.

use crate::models::{NewProduct, Product, ProductUpdate};
use rocket_db_pools::sqlx;
use std::sync::Arc;
use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Shared handle managed as Rocket state.
pub type SharedProductStore = Arc<dyn ProductStore>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("product {0} not found")]
    NotFound(i32),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Name filter plus offset window used by the listing screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Case-insensitive substring matched against the product name.
    pub name: Option<String>,
    pub offset: i64,
    pub limit: i64,
}

/// One window of search results together with the unpaged match count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: i64,
}

#[rocket::async_trait]
pub trait ProductStore: Send + Sync {
    /// Persist a single product and return it with its assigned id.
    async fn create(&self, product: NewProduct) -> StoreResult<Product>;

    /// Persist every product in one write. Either all rows land or none do.
    async fn create_many(&self, products: Vec<NewProduct>) -> StoreResult<usize>;

    async fn find_by_id(&self, id: i32) -> StoreResult<Product>;

    async fn update(&self, id: i32, update: ProductUpdate) -> StoreResult<Product>;

    async fn delete(&self, id: i32) -> StoreResult<()>;

    /// Offset window ordered by id.
    async fn page(&self, offset: i64, limit: i64) -> StoreResult<Vec<Product>>;

    /// Up to `limit` products with an id strictly greater than `after`, ordered by id.
    ///
    /// Unlike [`page`](Self::page) this is stable under concurrent inserts and
    /// deletes: rows never shift between consecutive calls.
    async fn page_after(&self, after: Option<i32>, limit: i64) -> StoreResult<Vec<Product>>;

    async fn search(&self, filter: &ProductFilter) -> StoreResult<ProductPage>;
}

/// Escape `LIKE` metacharacters so a search term is matched literally.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("gadget"), "%gadget%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }
}
