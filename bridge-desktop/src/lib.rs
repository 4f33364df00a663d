//! # Desktop Bridge Implementations
//!
//! Default implementations of the storage and networking bridges for desktop
//! platforms (macOS, Windows, Linux):
//! - `HttpClient` using `reqwest`
//! - `SettingsStore` using an SQLite-backed key-value table
//!
//! Audio output and the media control surface are always host-provided.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, SqliteSettingsStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let http = ReqwestHttpClient::new();
//!     let settings = SqliteSettingsStore::new(SqliteSettingsStore::default_path()).await?;
//! }
//! ```

mod http;
mod settings;

pub use http::ReqwestHttpClient;
pub use settings::SqliteSettingsStore;
