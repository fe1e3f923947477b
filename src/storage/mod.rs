//! Storage module
//!
//! Handles the shared and download folders on local disk.

pub mod folder;

// Re-export folder types
pub use folder::{is_safe_filename, ShareFolder};
