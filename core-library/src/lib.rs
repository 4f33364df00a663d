//! # Core Library
//!
//! Chapter catalog and the default content resolver.
//!
//! - [`catalog`]: the 114 chapters with names and verse counts, used for
//!   identifier validation and as offline fallback data
//! - [`HttpContentResolver`]: [`bridge_traits::ContentResolver`] over the
//!   host HTTP bridge

pub mod catalog;
pub mod error;
pub mod resolver;

pub use catalog::CHAPTER_COUNT;
pub use error::{LibraryError, Result};
pub use resolver::HttpContentResolver;
