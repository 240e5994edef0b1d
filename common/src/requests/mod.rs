//! Field names of the multipart upload form.

/// The spreadsheet itself.
pub const FILE_FIELD: &str = "file";

/// Destination container chosen by the user (only read by the user-named policy).
pub const COLLECTION_NAME_FIELD: &str = "collection_name";
