//! Product persistence and validation.
//!
//! - **`store`**: the `ProductStore` trait every other module depends on.
//! - **`postgres`**: production store over the `products` table.
//! - **`memory`**: in-process store used by tests and local tooling.
//! - **`validation`**: explicit form-to-entity mapping with per-field rules.

pub mod memory;
pub mod postgres;
pub mod store;
pub mod validation;

pub use memory::InMemoryProductStore;
pub use postgres::PgProductStore;
pub use store::{
    ProductFilter, ProductPage, ProductStore, SharedProductStore, StoreError, StoreResult,
};
pub use validation::{FieldError, ProductFields, ProductForm, ValidationErrors};
