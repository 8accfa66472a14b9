//! Query parameters for the product listing endpoint.
//!
//! The struct follows Rocket's `FromForm` conventions and derives
//! `JsonSchema` so the generated OpenAPI document lists the parameters and
//! their defaults.

use crate::config::MAX_LIST_PAGE_SIZE;
use rocket_okapi::okapi::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};

const fn default_page() -> i64 {
    1
}

/// Paging and name filter for `GET /products`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, rocket::form::FromForm)]
#[serde(rename_all = "camelCase")]
pub struct ProductListParams {
    /// Case-insensitive substring matched against product names.
    pub q: Option<String>,
    /// One-based page index (defaults to the first page).
    #[field(default = 1)]
    #[serde(default = "default_page")]
    pub page: i64,
    /// Items per page (clamped between 1 and 100, server default 10).
    pub size: Option<i64>,
}

impl Default for ProductListParams {
    fn default() -> Self {
        Self {
            q: None,
            page: default_page(),
            size: None,
        }
    }
}

impl ProductListParams {
    /// Normalized 1-based page index.
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    /// Requested size, or `default_size`, capped at [`MAX_LIST_PAGE_SIZE`].
    pub fn size(&self, default_size: i64) -> i64 {
        self.size.unwrap_or(default_size).clamp(1, MAX_LIST_PAGE_SIZE)
    }

    pub fn offset(&self, default_size: i64) -> i64 {
        (self.page() - 1).saturating_mul(self.size(default_size))
    }

    /// Trimmed search term, `None` when blank.
    pub fn normalized_query(&self) -> Option<String> {
        self.q
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(str::to_string)
    }
}
