use super::{RowError, TransferError, TransferResult, run_blocking};
use crate::models::NewProduct;
use crate::products::{FieldError, ProductForm, ProductStore};
use rocket_okapi::okapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

/// Column order expected after the header row.
const NAME: usize = 0;
const PRICE: usize = 1;
const STOCK: usize = 2;
const DESCRIPTION: usize = 3;

/// Result of a committed import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ImportSummary {
    /// Number of products written by the batch commit.
    pub imported: usize,
}

/// Loads CSV files into a [`ProductStore`] as one batch.
pub struct CsvImporter<'a> {
    store: &'a dyn ProductStore,
}

impl<'a> CsvImporter<'a> {
    pub fn new(store: &'a dyn ProductStore) -> Self {
        Self { store }
    }

    /// Import the CSV file at `path`.
    ///
    /// Opening and parsing run on the blocking pool; only the batch commit
    /// is awaited on the runtime. Failing to open the file is reported as
    /// [`TransferError::Io`] before anything is parsed.
    pub async fn import_path(&self, path: &Path) -> TransferResult<ImportSummary> {
        log::info!("importing products from {}", path.display());
        let source = path.to_path_buf();
        let parsed = run_blocking(move || {
            let file = File::open(&source)?;
            read_products(BufReader::new(file))
        })
        .await;

        self.commit(parsed).await
    }

    /// Parse an in-memory or already buffered stream, then commit it.
    ///
    /// Parsing and validation finish before the store is touched, so a read
    /// error or a single invalid row leaves the store unchanged.
    pub async fn import_reader<R: Read>(&self, reader: R) -> TransferResult<ImportSummary> {
        self.commit(read_products(reader)).await
    }

    /// Write every parsed row with one `create_many`.
    async fn commit(&self, parsed: TransferResult<Vec<NewProduct>>) -> TransferResult<ImportSummary> {
        let products = parsed.inspect_err(|err| {
            log::warn!("csv import rejected: {}", err);
        })?;

        if products.is_empty() {
            log::info!("csv import contained no data rows");
            return Ok(ImportSummary { imported: 0 });
        }

        let parsed = products.len();
        let imported = self.store.create_many(products).await?;
        log::info!("csv import committed {} of {} parsed rows", imported, parsed);

        Ok(ImportSummary { imported })
    }
}

/// Parse CSV text into unsaved products.
///
/// The first row is treated as a header and skipped. Each following row maps
/// positionally to name, price, stock, description; missing trailing fields
/// are empty, empty numbers default to zero, extra fields are ignored. Name
/// and numbers are trimmed; the description is kept exactly as written so
/// exported text re-imports unchanged. Every invalid row is reported in one
/// [`TransferError::Validation`].
pub fn read_products<R: Read>(reader: R) -> TransferResult<Vec<NewProduct>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut products = Vec::new();
    let mut rejected = Vec::new();
    let mut record = csv::StringRecord::new();

    while csv_reader.read_record(&mut record)? {
        let line = record.position().map_or(0, csv::Position::line);
        match parse_record(&record) {
            Ok(product) => products.push(product),
            Err(errors) => rejected.push(RowError { line, errors }),
        }
    }

    if !rejected.is_empty() {
        return Err(TransferError::Validation(rejected));
    }

    log::debug!("parsed {} csv rows", products.len());
    Ok(products)
}

fn parse_record(record: &csv::StringRecord) -> Result<NewProduct, Vec<FieldError>> {
    let field = |idx: usize| record.get(idx).unwrap_or_default();
    let mut errors = Vec::new();

    let price = parse_number::<f64>(field(PRICE).trim(), "price", &mut errors);
    let stock = parse_number::<i64>(field(STOCK).trim(), "stock", &mut errors);

    let form = ProductForm {
        name: field(NAME).to_string(),
        price: price.unwrap_or_default(),
        stock: stock.unwrap_or_default(),
        description: Some(field(DESCRIPTION).to_string()),
    };

    match form.validate() {
        Ok(fields) if errors.is_empty() => Ok(fields.into_new_product()),
        Ok(_) => Err(errors),
        Err(invalid) => {
            errors.extend(invalid.into_inner());
            errors.sort_by_key(|err| column_rank(&err.field));
            Err(errors)
        }
    }
}

/// Empty input is zero; anything else must parse.
fn parse_number<T: FromStr + Default>(
    raw: &str,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    if raw.is_empty() {
        return Some(T::default());
    }
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            errors.push(FieldError::new(field, format!("'{raw}' is not a valid number")));
            None
        }
    }
}

fn column_rank(field: &str) -> usize {
    match field {
        "name" => NAME,
        "price" => PRICE,
        "stock" => STOCK,
        _ => DESCRIPTION,
    }
}
