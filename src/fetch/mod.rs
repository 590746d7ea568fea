//! Source acquisition: downloading archives (with mirror fallback handled
//! by the resolver) and extracting them into canonical source directories.

pub mod download;
pub mod extract;

pub use download::{download_one, http_client, DOWNLOAD_TIMEOUT};
pub use extract::extract;
