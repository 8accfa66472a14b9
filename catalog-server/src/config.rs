use crate::transfer::ExportOptions;
use crate::transfer::export::DEFAULT_EXPORT_PAGE_SIZE;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_LIST_PAGE_SIZE: i64 = 10;
pub const MAX_LIST_PAGE_SIZE: i64 = 100;

fn env_i64(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(default)
}

fn env_path(key: &str, default: PathBuf) -> PathBuf {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or(default)
}

/// Filesystem locations and paging sizes for the import/export flows.
///
/// Built once at startup and handed to handlers as Rocket state, so tests
/// can point each instance at its own temporary directories.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Uploaded CSV files are stored here before import.
    pub upload_dir: PathBuf,
    /// Each export creates a private work directory below this one.
    pub export_work_root: PathBuf,
    /// Products per exported chunk file.
    pub export_page_size: i64,
    /// Default page size for the listing endpoint.
    pub list_page_size: i64,
}

impl CatalogConfig {
    pub fn from_env() -> Self {
        Self {
            upload_dir: env_path("CATALOG_UPLOAD_DIR", PathBuf::from("./uploads")),
            export_work_root: env_path("CATALOG_EXPORT_WORK_ROOT", env::temp_dir()),
            export_page_size: env_i64("CATALOG_EXPORT_PAGE_SIZE", DEFAULT_EXPORT_PAGE_SIZE).max(1),
            list_page_size: env_i64("CATALOG_LIST_PAGE_SIZE", DEFAULT_LIST_PAGE_SIZE)
                .clamp(1, MAX_LIST_PAGE_SIZE),
        }
    }

    /// Config rooted in explicit directories with default page sizes.
    pub fn with_dirs(upload_dir: impl Into<PathBuf>, export_work_root: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            export_work_root: export_work_root.into(),
            export_page_size: DEFAULT_EXPORT_PAGE_SIZE,
            list_page_size: DEFAULT_LIST_PAGE_SIZE,
        }
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            work_root: self.export_work_root.clone(),
            page_size: self.export_page_size,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
