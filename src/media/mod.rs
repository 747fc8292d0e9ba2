//! Image handling for feed items
//!
//! This module handles:
//! - Downloading and resizing thumbnails for the list
//! - Caching thumbnails to disk
//! - Saving full-size images on request

pub mod download;
pub mod thumbnail;
