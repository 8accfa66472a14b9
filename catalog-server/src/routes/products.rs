//! Product CRUD endpoints.
//!
//! Handlers work against the managed [`SharedProductStore`] rather than a
//! pooled connection, so the same routes run over Postgres in production and
//! over the in-memory store in route tests.

use crate::config::CatalogConfig;
use crate::error::ApiError;
use crate::models::{PaginatedResponse, Product};
use crate::products::{ProductFilter, ProductForm, SharedProductStore};
use crate::routes::params::ProductListParams;
use rocket::response::status::{Created, NoContent};
use rocket::serde::json::Json;
use rocket::{State, delete, get, post, put};
use rocket_okapi::openapi;

/// List products, optionally filtered by a case-insensitive name substring.
#[openapi(tag = "Products")]
#[get("/products?<params..>")]
pub async fn list_products(
    params: Option<ProductListParams>,
    store: &State<SharedProductStore>,
    config: &State<CatalogConfig>,
) -> Result<Json<PaginatedResponse<Product>>, ApiError> {
    let params = params.unwrap_or_default();
    let page = params.page();
    let size = params.size(config.list_page_size);

    let results = store
        .search(&ProductFilter {
            name: params.normalized_query(),
            offset: params.offset(config.list_page_size),
            limit: size,
        })
        .await?;

    Ok(Json(PaginatedResponse::new(
        results.items,
        page,
        size,
        results.total,
    )))
}

/// Fetch a single product.
#[openapi(tag = "Products")]
#[get("/products/<id>")]
pub async fn get_product(
    id: i32,
    store: &State<SharedProductStore>,
) -> Result<Json<Product>, ApiError> {
    Ok(Json(store.find_by_id(id).await?))
}

/// Create a product. Every failing field is reported in one 422 response.
#[openapi(tag = "Products")]
#[post("/products", data = "<form>")]
pub async fn create_product(
    form: Json<ProductForm>,
    store: &State<SharedProductStore>,
) -> Result<Created<Json<Product>>, ApiError> {
    let fields = form.into_inner().validate()?;
    let product = store.create(fields.into_new_product()).await?;
    log::info!("created product {}", product.id);

    Ok(Created::new(format!("/api/v1/products/{}", product.id)).body(Json(product)))
}

/// Replace a product's editable fields.
#[openapi(tag = "Products")]
#[put("/products/<id>", data = "<form>")]
pub async fn update_product(
    id: i32,
    form: Json<ProductForm>,
    store: &State<SharedProductStore>,
) -> Result<Json<Product>, ApiError> {
    let fields = form.into_inner().validate()?;
    let product = store.update(id, fields.into_update()).await?;
    log::info!("updated product {}", id);

    Ok(Json(product))
}

#[openapi(tag = "Products")]
#[delete("/products/<id>")]
pub async fn delete_product(
    id: i32,
    store: &State<SharedProductStore>,
) -> Result<NoContent, ApiError> {
    store.delete(id).await?;
    log::info!("deleted product {}", id);
    Ok(NoContent)
}
