pub mod backend;
pub mod error;
mod models;
mod path;

#[cfg(any(test, feature = "mock"))]
pub use crate::backend::{Fault, MockShare, MockStats};
pub use crate::backend::{ByteStream, MountedShare, SessionHandle, ShareClient, ShareSession, TimeoutShare};
pub use crate::models::ShareEntry;
pub use crate::path::{is_plain_name, normalize as normalize_path, validate as validate_path};
use std::sync::Arc;

pub type ShareHandle = Arc<dyn ShareClient + Send + Sync>;
