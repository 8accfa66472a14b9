//! Bulk CSV import and ZIP export of product records.
//!
//! # Import
//!
//! [`CsvImporter`] streams a CSV file (header row skipped), validates every
//! row, and commits the whole file through a single
//! [`ProductStore::create_many`](crate::products::ProductStore::create_many)
//! call. A single bad row rejects the batch; nothing is written.
//!
//! # Export
//!
//! [`CsvExporter`] walks the store with a keyset cursor, writes one CSV chunk
//! per page into a private temporary directory, zips the chunks and returns
//! the archive bytes. The temporary directory is removed on every exit path.

pub mod export;
pub mod import;
pub mod upload;

pub use export::{CsvExporter, ExportArchive, ExportOptions};
pub use import::{CsvImporter, ImportSummary, read_products};
pub use upload::place_upload;

use crate::products::{FieldError, StoreError};
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::Serialize;
use std::fmt;
use std::io;
use thiserror::Error;
use zip::result::ZipError;

pub type TransferResult<T> = Result<T, TransferError>;

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("archive error: {0}")]
    Archive(#[from] ZipError),
    #[error("malformed csv: {0}")]
    Csv(csv::Error),
    #[error("{} invalid row(s): {}", .0.len(), summarize(.0))]
    Validation(Vec<RowError>),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<csv::Error> for TransferError {
    fn from(err: csv::Error) -> Self {
        if !err.is_io_error() {
            return TransferError::Csv(err);
        }
        match err.into_kind() {
            csv::ErrorKind::Io(io_err) => TransferError::Io(io_err),
            kind => TransferError::Io(io::Error::other(format!("{kind:?}"))),
        }
    }
}

/// Validation failures for one CSV line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct RowError {
    /// 1-based line number in the source file (the header is line 1).
    pub line: u64,
    pub errors: Vec<FieldError>,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "line {}: {}", self.line, joined)
    }
}

/// Run synchronous file, CSV or deflate work on tokio's blocking pool.
pub(crate) async fn run_blocking<T, F>(task: F) -> TransferResult<T>
where
    F: FnOnce() -> TransferResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| TransferError::Io(io::Error::other(format!("blocking task failed: {err}"))))?
}

fn summarize(rows: &[RowError]) -> String {
    const SHOWN: usize = 3;
    let mut text = rows
        .iter()
        .take(SHOWN)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    if rows.len() > SHOWN {
        text.push_str(&format!("; and {} more", rows.len() - SHOWN));
    }
    text
}
