use image::imageops::FilterType;
use image::ImageFormat;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::api::PicsumClient;
use crate::error::MediaError;
use crate::state::data::Item;

/// Thumbnails fetched and decoded at the same time
pub const THUMBNAIL_CONCURRENCY: usize = 4;

/// Get the thumbnail cache directory
/// Returns ~/.cache/picsum-feed/thumbnails on Linux
pub fn thumbnail_cache_dir() -> Option<PathBuf> {
    let mut path = dirs::cache_dir().or_else(dirs::home_dir)?;
    path.push("picsum-feed");
    path.push("thumbnails");
    Some(path)
}

/// Where the thumbnail for `id` lives (doesn't generate, just the path)
pub fn thumbnail_path(cache_dir: &Path, id: &str) -> PathBuf {
    let safe_id: String = id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    cache_dir.join(format!("{}.jpg", safe_id))
}

/// Decode image bytes, shrink to fit a `size` x `size` box and save as JPEG
pub fn save_thumbnail(data: &[u8], size: u32, path: &Path) -> Result<(), MediaError> {
    let img = image::load_from_memory(data)?;

    // Resize maintaining aspect ratio
    let thumbnail = img.resize(size, size, FilterType::Lanczos3);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    // Write beside the final path, then rename, so an interrupted write
    // never leaves a truncated file that looks like a cache hit
    let tmp_path = partial_path(path);
    // JPEG has no alpha channel
    if let Err(err) = thumbnail.to_rgb8().save_with_format(&tmp_path, ImageFormat::Jpeg) {
        let _ = fs::remove_file(&tmp_path);
        return Err(err.into());
    }
    fs::rename(&tmp_path, path)?;

    debug!("Generated thumbnail: {}", path.display());
    Ok(())
}

/// In-progress file for `path` ("7.jpg" -> "7.jpg.tmp")
fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

/// Return a thumbnail for `item`, generating it on a cache miss
///
/// A pre-sized rendition is requested from Picsum. At most one job per
/// `permits` slot downloads or decodes at a time; decoding and resizing run
/// on a blocking thread.
pub async fn load_thumbnail(
    client: PicsumClient,
    item: Item,
    cache_dir: PathBuf,
    size: u32,
    permits: Arc<Semaphore>,
) -> Result<PathBuf, MediaError> {
    let path = thumbnail_path(&cache_dir, &item.id);
    if path.exists() {
        debug!(id = %item.id, "Thumbnail cache hit");
        return Ok(path);
    }

    let _permit = permits
        .acquire_owned()
        .await
        .map_err(|e| MediaError::Join(e.to_string()))?;

    let url = client.thumbnail_url(&item, size);
    let data = client.fetch_bytes(&url).await?;
    info!(id = %item.id, kb = data.len() / 1024, "Downloaded image for thumbnail");

    let target = path.clone();
    tokio::task::spawn_blocking(move || save_thumbnail(&data, size, &target)).await??;

    Ok(path)
}
