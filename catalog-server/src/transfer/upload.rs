use super::TransferResult;
use rocket::fs::TempFile;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const FALLBACK_STEM: &str = "upload";

/// Move an uploaded CSV into `upload_dir` under a collision-free name.
///
/// The directory is created when missing. Any failure here happens before
/// the file is parsed, so no product has been written yet.
pub async fn place_upload(file: &mut TempFile<'_>, upload_dir: &Path) -> TransferResult<PathBuf> {
    tokio::fs::create_dir_all(upload_dir).await?;

    let target = upload_dir.join(unique_upload_name(file.name()));
    file.move_copy_to(&target).await?;

    log::info!("stored upload at {}", target.display());
    Ok(target)
}

/// `{stem}-{uuid}.csv`, where `stem` is the client's file name without its
/// extension (Rocket has already stripped path components and unsafe characters).
pub fn unique_upload_name(client_stem: Option<&str>) -> String {
    let stem = client_stem
        .map(str::trim)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(FALLBACK_STEM);

    format!("{}-{}.csv", stem, Uuid::new_v4().simple())
}
