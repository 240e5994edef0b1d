//! Shared application state handed to every request.
//!
//! Built once in `main.rs` from the `Config` and registered as `web::Data<AppState>`.
//! Cloning is cheap: the store sits behind an `Arc` and is shared by all workers.

use crate::ingest::guard::DuplicatePolicy;
use crate::store::DocumentStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// The one store connection of the process.
    pub store: Arc<dyn DocumentStore>,
    /// Duplicate policy every upload is checked against.
    pub policy: DuplicatePolicy,
    /// Uploads above this many bytes are refused while streaming.
    pub max_upload_bytes: usize,
}
