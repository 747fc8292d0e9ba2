//! State management module
//!
//! This module handles all application state:
//! - Shared data structures (data.rs)
//! - The pagination controller (feed.rs)
//! - The infinite-scroll trigger (scroll.rs)

pub mod data;
pub mod feed;
pub mod scroll;
