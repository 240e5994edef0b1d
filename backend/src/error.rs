use thiserror::Error;

/// Failures of the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    /// Another request panicked while holding the connection.
    #[error("store connection lock poisoned")]
    Poisoned,
}

/// Everything that can stop an upload from being ingested.
///
/// All variants are turned into a user facing message at the request boundary.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("No file selected.")]
    MissingFile,

    #[error("A collection name is required.")]
    MissingCollectionName,

    /// Carries the identifying detail (digest or container name).
    #[error("This file has already been uploaded ({0}).")]
    DuplicateUpload(String),

    #[error("Error reading the spreadsheet: {0}")]
    ParseFailure(String),

    #[error("The file is empty or invalid.")]
    EmptyFile,

    #[error("The file exceeds the {0} byte upload limit.")]
    FileTooLarge(usize),

    /// The request body could not be read as a multipart form after a file arrived.
    #[error("The upload form could not be read: {0}")]
    InvalidForm(String),

    #[error("storage failure: {0}")]
    StorageWriteFailure(#[from] StoreError),
}

/// Problems with the process environment, reported once at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("invalid value '{value}' for {name}: {message}")]
    Invalid {
        name: &'static str,
        value: String,
        message: String,
    },
}
