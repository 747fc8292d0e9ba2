use std::path::PathBuf;
use tracing::info;

use crate::api::PicsumClient;
use crate::error::MediaError;
use crate::state::data::Item;

/// Folder full-size downloads are saved into
/// Returns ~/Downloads/picsum-feed on most systems
pub fn download_dir() -> Option<PathBuf> {
    let mut path = dirs::download_dir().or_else(dirs::home_dir)?;
    path.push("picsum-feed");
    Some(path)
}

/// File name for a downloaded item, e.g. "10-paul-jarvis.jpg"
pub fn download_file_name(item: &Item) -> String {
    let mut slug = String::new();
    for c in item.author.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');

    let id: String = item
        .id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    if slug.is_empty() {
        format!("{}.jpg", id)
    } else {
        format!("{}-{}.jpg", id, slug)
    }
}

/// Save the full-resolution image for `item` into `dir`
pub async fn download_item(
    client: PicsumClient,
    item: Item,
    dir: PathBuf,
) -> Result<PathBuf, MediaError> {
    let data = client.fetch_bytes(&item.download_url).await?;

    tokio::fs::create_dir_all(&dir).await?;
    let path = dir.join(download_file_name(&item));
    tokio::fs::write(&path, &data).await?;

    info!(id = %item.id, bytes = data.len(), "Saved download to {}", path.display());
    Ok(path)
}
