//! Shared data structures for the application state
//!
//! These structs represent the data model that flows between
//! the API client and the UI layer.

use serde::{Deserialize, Serialize};

/// A single photo listed by the Picsum API
///
/// Items are immutable once fetched; the feed only ever replaces or
/// appends whole items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Picsum photo id (e.g. "0", "1025"), unique within the source
    pub id: String,
    /// Photographer name
    pub author: String,
    /// Original width in pixels
    pub width: u32,
    /// Original height in pixels
    pub height: u32,
    /// Source page on Unsplash
    pub url: String,
    /// Direct link to the full-resolution image
    pub download_url: String,
}

impl Item {
    /// Dimensions formatted as shown in the list ("5000 X 3333")
    pub fn dimensions_label(&self) -> String {
        format!("{} X {}", self.width, self.height)
    }
}
