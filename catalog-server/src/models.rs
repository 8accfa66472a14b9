use chrono::{DateTime, Utc};
use rocket_db_pools::sqlx::FromRow;
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Format used for `created_at` in exported CSV files.
pub const CREATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ===== Product Models =====

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub price: f64,
    pub stock: i32,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// `created_at` rendered as `YYYY-MM-DD HH:MM:SS` in UTC.
    pub fn created_at_display(&self) -> String {
        self.created_at.format(CREATED_AT_FORMAT).to_string()
    }
}

/// A product that has not been persisted yet.
///
/// The creation timestamp is stamped when the value is constructed, so a row
/// parsed from an import file carries the time it was read, not the time the
/// batch was committed.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub stock: i32,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price: f64, stock: i32, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price,
            stock,
            description: description.into(),
            created_at: Utc::now(),
        }
    }

    /// Attach a store-assigned id.
    pub fn into_product(self, id: i32) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            stock: self.stock,
            description: self.description,
            created_at: self.created_at,
        }
    }
}

/// Mutable fields of a product. `id` and `created_at` are deliberately absent.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductUpdate {
    pub name: String,
    pub price: f64,
    pub stock: i32,
    pub description: String,
}

// ===== Response Envelopes =====

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DataResponse<T> {
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub page: i64,
    pub size: i64,
    pub total_items: i64,
    pub total_pages: i64,
}

impl PageMetadata {
    pub fn new(page: i64, size: i64, total_items: i64) -> Self {
        let total_pages = if total_items == 0 {
            0
        } else {
            (total_items + size - 1) / size
        };

        Self {
            page,
            size,
            total_items,
            total_pages,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: PageMetadata,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, page: i64, size: i64, total_items: i64) -> Self {
        Self {
            data,
            page: PageMetadata::new(page, size, total_items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_created_at_without_fractional_seconds() {
        let product = NewProduct {
            created_at: Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap(),
            ..NewProduct::new("Widget", 9.99, 5, "")
        }
        .into_product(1);

        assert_eq!(product.created_at_display(), "2024-03-09 07:05:01");
    }

    #[test]
    fn page_metadata_rounds_up() {
        assert_eq!(PageMetadata::new(1, 10, 0).total_pages, 0);
        assert_eq!(PageMetadata::new(1, 10, 10).total_pages, 1);
        assert_eq!(PageMetadata::new(3, 10, 25).total_pages, 3);
    }
}
