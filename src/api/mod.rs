//! Picsum API access
//!
//! `GET {base}/v2/list?page={page}&limit={size}` returns a JSON array of
//! `{id, author, width, height, url, download_url}` objects.

pub mod client;

pub use client::PicsumClient;
