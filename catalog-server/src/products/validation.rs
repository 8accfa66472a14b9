//! Typed mapping from request bodies to product fields.
//!
//! Every rule lives here so the JSON forms and the CSV importer reject the
//! same inputs. Validation collects all failing fields instead of stopping at
//! the first one.

use crate::models::{NewProduct, ProductUpdate};
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MAX_NAME_LEN: usize = 255;
pub const MAX_DESCRIPTION_LEN: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Non-empty list of field failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<FieldError> {
        self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for ValidationErrors {}

/// Request body for the create and edit endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ProductForm {
    /// Product display name (required).
    pub name: String,
    /// Unit price, must be zero or positive.
    pub price: f64,
    /// Units in stock, must be zero or positive.
    pub stock: i64,
    /// Optional free text.
    #[serde(default)]
    pub description: Option<String>,
}

/// Product fields that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFields {
    pub name: String,
    pub price: f64,
    pub stock: i32,
    pub description: String,
}

impl ProductFields {
    /// Build an unsaved product stamped with the current time.
    pub fn into_new_product(self) -> NewProduct {
        NewProduct::new(self.name, self.price, self.stock, self.description)
    }

    pub fn into_update(self) -> ProductUpdate {
        ProductUpdate {
            name: self.name,
            price: self.price,
            stock: self.stock,
            description: self.description,
        }
    }
}

impl ProductForm {
    pub fn validate(&self) -> Result<ProductFields, ValidationErrors> {
        let mut errors = Vec::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(FieldError::new("name", "must not be empty"));
        } else if name.chars().count() > MAX_NAME_LEN {
            errors.push(FieldError::new(
                "name",
                format!("must be at most {MAX_NAME_LEN} characters"),
            ));
        }

        if !self.price.is_finite() {
            errors.push(FieldError::new("price", "must be a finite number"));
        } else if self.price < 0.0 {
            errors.push(FieldError::new("price", "must not be negative"));
        }

        let stock = match i32::try_from(self.stock) {
            Ok(stock) if stock >= 0 => stock,
            Ok(_) => {
                errors.push(FieldError::new("stock", "must not be negative"));
                0
            }
            Err(_) => {
                errors.push(FieldError::new(
                    "stock",
                    format!("must be at most {}", i32::MAX),
                ));
                0
            }
        };

        let description = self.description.as_deref().unwrap_or_default();
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            errors.push(FieldError::new(
                "description",
                format!("must be at most {MAX_DESCRIPTION_LEN} characters"),
            ));
        }

        if !errors.is_empty() {
            return Err(ValidationErrors(errors));
        }

        Ok(ProductFields {
            name: name.to_string(),
            price: self.price,
            stock,
            description: description.to_string(),
        })
    }
}
