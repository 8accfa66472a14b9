use super::store::{
    ProductFilter, ProductPage, ProductStore, StoreError, StoreResult, like_pattern,
};
use crate::models::{NewProduct, Product, ProductUpdate};
use chrono::{DateTime, Utc};
use rocket_db_pools::sqlx::{self, PgPool};

const PRODUCT_COLUMNS: &str = "id, name, price, stock, description, created_at";

/// [`ProductStore`] backed by the `products` table.
#[derive(Debug, Clone)]
pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[rocket::async_trait]
impl ProductStore for PgProductStore {
    async fn create(&self, product: NewProduct) -> StoreResult<Product> {
        let query = format!(
            "INSERT INTO products (name, price, stock, description, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {PRODUCT_COLUMNS}"
        );

        let created = sqlx::query_as::<_, Product>(&query)
            .bind(&product.name)
            .bind(product.price)
            .bind(product.stock)
            .bind(&product.description)
            .bind(product.created_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    async fn create_many(&self, products: Vec<NewProduct>) -> StoreResult<usize> {
        if products.is_empty() {
            return Ok(0);
        }

        let mut names = Vec::with_capacity(products.len());
        let mut prices = Vec::with_capacity(products.len());
        let mut stocks = Vec::with_capacity(products.len());
        let mut descriptions = Vec::with_capacity(products.len());
        let mut created: Vec<DateTime<Utc>> = Vec::with_capacity(products.len());

        for product in products {
            names.push(product.name);
            prices.push(product.price);
            stocks.push(product.stock);
            descriptions.push(product.description);
            created.push(product.created_at);
        }

        let mut tx = self.pool.begin().await?;

        // UNNEST keeps the batch to a single round trip regardless of row count
        let result = sqlx::query(
            r#"INSERT INTO products (name, price, stock, description, created_at)
               SELECT * FROM UNNEST($1::text[], $2::float8[], $3::int4[], $4::text[], $5::timestamptz[])"#,
        )
        .bind(&names)
        .bind(&prices)
        .bind(&stocks)
        .bind(&descriptions)
        .bind(&created)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(result.rows_affected() as usize)
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<Product> {
        let query = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");

        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, id: i32, update: ProductUpdate) -> StoreResult<Product> {
        let query = format!(
            "UPDATE products
             SET name = $2, price = $3, stock = $4, description = $5
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        );

        sqlx::query_as::<_, Product>(&query)
            .bind(id)
            .bind(&update.name)
            .bind(update.price)
            .bind(update.stock)
            .bind(&update.description)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound(id))
    }

    async fn delete(&self, id: i32) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }

    async fn page(&self, offset: i64, limit: i64) -> StoreResult<Vec<Product>> {
        let query =
            format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id ASC LIMIT $1 OFFSET $2");

        let products = sqlx::query_as::<_, Product>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    async fn page_after(&self, after: Option<i32>, limit: i64) -> StoreResult<Vec<Product>> {
        let query = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE $1::int4 IS NULL OR id > $1
             ORDER BY id ASC
             LIMIT $2"
        );

        let products = sqlx::query_as::<_, Product>(&query)
            .bind(after)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    async fn search(&self, filter: &ProductFilter) -> StoreResult<ProductPage> {
        let pattern = filter.name.as_deref().map(like_pattern);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE $1::text IS NULL OR name ILIKE $1",
        )
        .bind(pattern.as_deref())
        .fetch_one(&self.pool)
        .await?;

        let query = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE $1::text IS NULL OR name ILIKE $1
             ORDER BY id ASC
             LIMIT $2 OFFSET $3"
        );

        let items = sqlx::query_as::<_, Product>(&query)
            .bind(pattern.as_deref())
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(ProductPage { items, total })
    }
}
