use crate::products::{StoreError, ValidationErrors};
use crate::transfer::TransferError;
use rocket::http::{ContentType, Status};
use rocket::response::{self, Responder};
use rocket::{Request, Response};
use rocket_okapi::okapi::openapi3::{RefOr, Response as OpenApiResponse, Responses};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::response::OpenApiResponderInner;
use rocket_okapi::OpenApiError;
use serde::Serialize;
use serde_json::Value;
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("database error: {0}")]
    Database(sqlx::Error),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    /// Input was well-formed but failed validation; `details` lists each
    /// failing field or CSV row.
    #[error("{message}")]
    Validation { message: String, details: Value },
    #[error("io error: {0}")]
    Io(std::io::Error),
    #[error("archive error: {0}")]
    Archive(String),
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::BadRequest(_) => Status::BadRequest,
            ApiError::Validation { .. } => Status::UnprocessableEntity,
            ApiError::Database(_)
            | ApiError::Io(_)
            | ApiError::Archive(_)
            | ApiError::Internal(_) => Status::InternalServerError,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::Database(_) => "DatabaseError",
            ApiError::NotFound(_) => "NotFound",
            ApiError::BadRequest(_) => "BadRequest",
            ApiError::Validation { .. } => "ValidationError",
            ApiError::Io(_) => "IOError",
            ApiError::Archive(_) => "ArchiveError",
            ApiError::Internal(_) => "InternalError",
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let status = self.status();
        if status.code >= 500 {
            log::error!("{}: {}", self.kind(), self);
        } else {
            log::debug!("{}: {}", self.kind(), self);
        }

        let error = self.kind();
        let message = self.to_string();
        let details = match self {
            ApiError::Validation { details, .. } => Some(details),
            _ => None,
        };

        let json = serde_json::to_string(&ErrorResponse {
            error,
            message,
            details,
        })
        .unwrap_or_else(|_| {
            r#"{"error":"SerializationError","message":"Failed to serialize error"}"#.to_string()
        });

        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}

impl OpenApiResponderInner for ApiError {
    fn responses(_: &mut OpenApiGenerator) -> Result<Responses, OpenApiError> {
        let mut responses = Responses::default();
        for (code, description) in [
            ("400", "Malformed request or CSV file"),
            ("404", "Product not found"),
            ("422", "Validation failed; `details` lists every failing field or row"),
            ("500", "Database, file system or archive failure"),
        ] {
            responses.responses.insert(
                code.to_string(),
                RefOr::Object(OpenApiResponse {
                    description: description.to_string(),
                    ..Default::default()
                }),
            );
        }
        Ok(responses)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            _ => ApiError::Database(err),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ApiError::NotFound(format!("product {id} not found")),
            StoreError::Database(err) => ApiError::from(err),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation {
            message: errors.to_string(),
            details: serde_json::to_value(&errors).unwrap_or(Value::Null),
        }
    }
}

impl From<TransferError> for ApiError {
    fn from(err: TransferError) -> Self {
        match err {
            TransferError::Io(err) => ApiError::Io(err),
            TransferError::Archive(err) => ApiError::Archive(err.to_string()),
            TransferError::Csv(err) => ApiError::BadRequest(format!("malformed csv: {err}")),
            TransferError::Store(err) => ApiError::from(err),
            TransferError::Validation(rows) => {
                let details = serde_json::to_value(&rows).unwrap_or(Value::Null);
                ApiError::Validation {
                    message: TransferError::Validation(rows).to_string(),
                    details,
                }
            }
        }
    }
}
