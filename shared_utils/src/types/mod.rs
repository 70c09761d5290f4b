//! Type-Safe Wrappers Module
//!
//! - `file_size`: byte counts and the upload size limit

pub mod file_size;

pub use file_size::{FileSize, DISCORD_SIZE_LIMIT};
