use super::{TransferError, TransferResult, run_blocking};
use crate::models::Product;
use crate::products::ProductStore;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const EXPORT_CONTENT_TYPE: &str = "application/zip";
pub const EXPORT_FILE_NAME: &str = "exported_files.zip";
pub const DEFAULT_EXPORT_PAGE_SIZE: i64 = 10;

const WORK_DIR_PREFIX: &str = "exported_files-";
const CHUNK_HEADER: [&str; 6] = ["ID", "Name", "Price", "Stock", "Description", "Created At"];

/// Where and how an export runs.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Directory under which each export creates its own private work directory.
    pub work_root: PathBuf,
    /// Products per chunk file.
    pub page_size: i64,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            work_root: std::env::temp_dir(),
            page_size: DEFAULT_EXPORT_PAGE_SIZE,
        }
    }
}

/// A finished export ready to be sent to a client.
#[derive(Debug, Clone)]
pub struct ExportArchive {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: &'static str,
    pub chunk_count: usize,
    pub row_count: usize,
    /// Set when the archive was produced but the work directory could not be removed.
    pub cleanup_error: Option<String>,
}

/// Writes every product into page-sized CSV chunks and zips them.
pub struct CsvExporter<'a> {
    store: &'a dyn ProductStore,
    options: ExportOptions,
}

struct Packaged {
    bytes: Vec<u8>,
    chunk_count: usize,
    row_count: usize,
}

impl<'a> CsvExporter<'a> {
    pub fn new(store: &'a dyn ProductStore, options: ExportOptions) -> Self {
        Self { store, options }
    }

    /// Run one export.
    ///
    /// Store pages are awaited on the runtime; chunk writing, zipping and
    /// cleanup run on the blocking pool. The work directory is removed
    /// whether or not packaging succeeded, and a removal failure never
    /// replaces the export's own error.
    pub async fn export(&self) -> TransferResult<ExportArchive> {
        let work_root = self.options.work_root.clone();
        let work_dir = run_blocking(move || {
            Ok(tempfile::Builder::new()
                .prefix(WORK_DIR_PREFIX)
                .tempdir_in(&work_root)?)
        })
        .await?;

        log::debug!("export working in {}", work_dir.path().display());

        let outcome = self.package(work_dir.path()).await;
        let cleanup = run_blocking(move || Ok(remove_work_dir(work_dir)))
            .await
            .and_then(|removed| removed.map_err(TransferError::Io));

        settle(outcome, cleanup)
    }

    async fn package(&self, dir: &Path) -> TransferResult<Packaged> {
        let page_size = self.options.page_size.max(1);
        let mut chunks = Vec::new();
        let mut row_count = 0;
        let mut cursor = None;

        loop {
            let page = self.store.page_after(cursor, page_size).await?;
            let Some(last) = page.last() else {
                break;
            };
            cursor = Some(last.id);
            row_count += page.len();

            let path = dir.join(format!("export_part_{}.csv", chunks.len() + 1));
            let target = path.clone();
            let rows = page.len();
            run_blocking(move || write_chunk(&target, &page)).await?;
            log::debug!("wrote {} rows to {}", rows, path.display());

            chunks.push(path);
        }

        let archive_path = dir.join(EXPORT_FILE_NAME);
        let chunk_count = chunks.len();
        let bytes = run_blocking(move || {
            write_archive(&archive_path, &chunks)?;
            Ok(fs::read(&archive_path)?)
        })
        .await?;

        Ok(Packaged {
            bytes,
            chunk_count,
            row_count,
        })
    }
}

/// Combine the packaging outcome with the cleanup result.
///
/// A cleanup failure is attached to a successful archive and dropped when
/// packaging already failed.
fn settle(
    outcome: TransferResult<Packaged>,
    cleanup: TransferResult<()>,
) -> TransferResult<ExportArchive> {
    let packaged = outcome.inspect_err(|err| log::error!("export failed: {}", err))?;

    log::info!(
        "exported {} products in {} chunk(s), {} bytes",
        packaged.row_count,
        packaged.chunk_count,
        packaged.bytes.len()
    );
    Ok(ExportArchive {
        bytes: packaged.bytes,
        content_type: EXPORT_CONTENT_TYPE,
        filename: EXPORT_FILE_NAME,
        chunk_count: packaged.chunk_count,
        row_count: packaged.row_count,
        cleanup_error: cleanup.err().map(|err| err.to_string()),
    })
}

fn write_chunk(path: &Path, products: &[Product]) -> TransferResult<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CHUNK_HEADER)?;

    for product in products {
        writer.write_record([
            product.id.to_string(),
            product.name.clone(),
            product.price.to_string(),
            product.stock.to_string(),
            product.description.clone(),
            product.created_at_display(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Zip `chunks` in order, one entry per file named by its base name.
fn write_archive(archive_path: &Path, chunks: &[PathBuf]) -> TransferResult<()> {
    let file = File::create(archive_path)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for chunk in chunks {
        let entry_name = chunk
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| io::Error::other(format!("chunk path {} has no file name", chunk.display())))?;

        zip.start_file(entry_name, options)?;
        let mut source = File::open(chunk)?;
        io::copy(&mut source, &mut zip)?;
    }

    let mut writer = zip.finish()?;
    writer.flush()?;
    Ok(())
}

fn remove_work_dir(work_dir: TempDir) -> io::Result<()> {
    let path = work_dir.path().to_path_buf();
    work_dir.close().inspect_err(|err| {
        log::error!("failed to remove export directory {}: {}", path.display(), err);
    })
}
