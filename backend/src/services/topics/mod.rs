//! HTTP endpoints for topic spreadsheet uploads.
//!
//! - `POST /api/topics/upload`: multipart/form-data with a `file` field holding the
//!   spreadsheet and, when the server runs the user-named policy, a `collection_name`
//!   field. The upload goes through the ingestion pipeline and the outcome comes back
//!   as a `common::responses::UploadResponse` JSON body.
//!
//! - `GET /api/topics/policy`: reports the active duplicate policy so the upload form
//!   knows whether to ask for a collection name.
//!
//! - `GET /api/topics/collections/{name}`: whether a container exists and how many
//!   documents it holds, to check what an upload stored.

use actix_web::web::{get, post, scope};
use actix_web::Scope;

mod collection;
mod policy;
mod upload;

const API_PATH: &str = "/api/topics";

/// Shown whenever the store fails; the cause only goes to the log.
const STORAGE_FAILURE_MESSAGE: &str = "The upload could not be stored. Please try again later.";

/// Configures and returns the Actix scope for topic upload routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/upload", post().to(upload::process))
        .route("/policy", get().to(policy::process))
        .route("/collections/{name}", get().to(collection::process))
}
