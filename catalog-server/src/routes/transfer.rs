//! CSV upload and ZIP download endpoints.
//!
//! These are mounted with plain `routes!`: multipart uploads and binary
//! attachments have no schema for `rocket_okapi` to derive.

use crate::config::CatalogConfig;
use crate::error::ApiError;
use crate::models::DataResponse;
use crate::products::SharedProductStore;
use crate::transfer::{CsvExporter, CsvImporter, ExportArchive, ImportSummary, place_upload};
use rocket::form::{Form, FromForm};
use rocket::fs::TempFile;
use rocket::http::{ContentType, Header};
use rocket::response::{self, Responder};
use rocket::serde::json::Json;
use rocket::{Request, Response, State, get, post};
use std::io::Cursor;

#[derive(FromForm)]
pub struct CsvUpload<'r> {
    pub csv_file: TempFile<'r>,
}

/// Store the uploaded CSV, then import it as one batch.
#[post("/products/import", data = "<upload>")]
pub async fn import_products(
    mut upload: Form<CsvUpload<'_>>,
    store: &State<SharedProductStore>,
    config: &State<CatalogConfig>,
) -> Result<Json<DataResponse<ImportSummary>>, ApiError> {
    if upload.csv_file.len() == 0 {
        return Err(ApiError::BadRequest("csv_file is empty".to_string()));
    }

    let path = place_upload(&mut upload.csv_file, &config.upload_dir).await?;
    let summary = CsvImporter::new(store.inner().as_ref())
        .import_path(&path)
        .await?;

    Ok(Json(DataResponse { data: summary }))
}

/// Export every product as chunked CSV files inside one ZIP attachment.
#[get("/products/export")]
pub async fn export_products(
    store: &State<SharedProductStore>,
    config: &State<CatalogConfig>,
) -> Result<ZipDownload, ApiError> {
    let archive = CsvExporter::new(store.inner().as_ref(), config.export_options())
        .export()
        .await?;

    if let Some(err) = &archive.cleanup_error {
        log::warn!("export served but work directory remains: {}", err);
    }
    Ok(ZipDownload(archive))
}

/// Archive bytes served as a file download.
pub struct ZipDownload(pub ExportArchive);

impl<'r> Responder<'r, 'static> for ZipDownload {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let ExportArchive {
            bytes, filename, ..
        } = self.0;

        Response::build()
            .header(ContentType::ZIP)
            .header(Header::new(
                "Content-Disposition",
                format!("attachment; filename=\"{filename}\""),
            ))
            .sized_body(bytes.len(), Cursor::new(bytes))
            .ok()
    }
}
