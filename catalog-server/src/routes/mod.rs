//! HTTP route handlers grouped by resource.
//!
//! JSON endpoints are annotated with `#[openapi]` so `rocket_okapi` can
//! derive an OpenAPI document; the file transfer endpoints are mounted
//! alongside them without documentation.

pub mod health;
pub mod params;
pub mod products;
pub mod transfer;
