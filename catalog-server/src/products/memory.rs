use super::store::{ProductFilter, ProductPage, ProductStore, StoreError, StoreResult};
use crate::models::{NewProduct, Product, ProductUpdate};
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Process-local [`ProductStore`] with the same ordering and id semantics as
/// the Postgres store: ids start at 1 and are never reused.
#[derive(Debug)]
pub struct InMemoryProductStore {
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    next_id: i32,
    products: BTreeMap<i32, Product>,
}

impl Default for InMemoryProductStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                products: BTreeMap::new(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every stored product in id order.
    pub fn snapshot(&self) -> Vec<Product> {
        self.inner.lock().products.values().cloned().collect()
    }
}

impl Inner {
    fn insert(&mut self, product: NewProduct) -> Product {
        let id = self.next_id;
        self.next_id += 1;
        let product = product.into_product(id);
        self.products.insert(id, product.clone());
        product
    }
}

fn window(products: impl Iterator<Item = Product>, offset: i64, limit: i64) -> Vec<Product> {
    let offset = usize::try_from(offset).unwrap_or(0);
    let limit = usize::try_from(limit).unwrap_or(0);
    products.skip(offset).take(limit).collect()
}

#[rocket::async_trait]
impl ProductStore for InMemoryProductStore {
    async fn create(&self, product: NewProduct) -> StoreResult<Product> {
        Ok(self.inner.lock().insert(product))
    }

    async fn create_many(&self, products: Vec<NewProduct>) -> StoreResult<usize> {
        let mut inner = self.inner.lock();
        let count = products.len();
        for product in products {
            inner.insert(product);
        }
        Ok(count)
    }

    async fn find_by_id(&self, id: i32) -> StoreResult<Product> {
        self.inner
            .lock()
            .products
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn update(&self, id: i32, update: ProductUpdate) -> StoreResult<Product> {
        let mut inner = self.inner.lock();
        let product = inner.products.get_mut(&id).ok_or(StoreError::NotFound(id))?;

        product.name = update.name;
        product.price = update.price;
        product.stock = update.stock;
        product.description = update.description;

        Ok(product.clone())
    }

    async fn delete(&self, id: i32) -> StoreResult<()> {
        self.inner
            .lock()
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound(id))
    }

    async fn page(&self, offset: i64, limit: i64) -> StoreResult<Vec<Product>> {
        let inner = self.inner.lock();
        Ok(window(inner.products.values().cloned(), offset, limit))
    }

    async fn page_after(&self, after: Option<i32>, limit: i64) -> StoreResult<Vec<Product>> {
        let start = match after {
            Some(i32::MAX) => return Ok(Vec::new()),
            Some(id) => id + 1,
            None => i32::MIN,
        };
        let inner = self.inner.lock();
        Ok(window(
            inner.products.range(start..).map(|(_, product)| product.clone()),
            0,
            limit,
        ))
    }

    async fn search(&self, filter: &ProductFilter) -> StoreResult<ProductPage> {
        let needle = filter.name.as_ref().map(|name| name.to_lowercase());
        let inner = self.inner.lock();

        let matches: Vec<Product> = inner
            .products
            .values()
            .filter(|product| {
                needle
                    .as_deref()
                    .is_none_or(|needle| product.name.to_lowercase().contains(needle))
            })
            .cloned()
            .collect();

        let total = matches.len() as i64;
        let items = window(matches.into_iter(), filter.offset, filter.limit);

        Ok(ProductPage { items, total })
    }
}
