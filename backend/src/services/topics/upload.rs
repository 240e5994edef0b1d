use crate::error::IngestError;
use crate::ingest::{ingest, IngestReport, Upload, UploadedFile};
use crate::state::AppState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use common::requests::{COLLECTION_NAME_FIELD, FILE_FIELD};
use common::responses::{UploadResponse, UploadStatus};
use futures_util::StreamExt;
use log::{error, warn};
use md5::Context;

use super::STORAGE_FAILURE_MESSAGE;

/// HTTP handler: reads the form, runs the ingestion pipeline on the blocking pool and
/// converts the outcome into an `UploadResponse`.
pub async fn process(payload: Multipart, state: web::Data<AppState>) -> impl Responder {
    let upload = match read_upload(payload, state.max_upload_bytes).await {
        Ok(upload) => upload,
        Err(e) => return respond(Err(e)),
    };

    let store = state.store.clone();
    let policy = state.policy.clone();
    match web::block(move || ingest(store.as_ref(), &policy, upload)).await {
        Ok(result) => respond(result),
        Err(e) => {
            error!("ingestion task failed: {}", e);
            HttpResponse::InternalServerError().json(UploadResponse::failure(
                UploadStatus::StorageError,
                STORAGE_FAILURE_MESSAGE,
            ))
        }
    }
}

fn respond(result: Result<IngestReport, IngestError>) -> HttpResponse {
    let err = match result {
        Ok(report) => {
            return HttpResponse::Ok().json(UploadResponse::success(report.collection, report.inserted))
        }
        Err(e) => e,
    };

    let message = err.to_string();
    match err {
        IngestError::MissingFile => HttpResponse::BadRequest()
            .json(UploadResponse::failure(UploadStatus::MissingFile, message)),
        IngestError::MissingCollectionName => HttpResponse::BadRequest().json(
            UploadResponse::failure(UploadStatus::MissingCollectionName, message),
        ),
        IngestError::DuplicateUpload(_) => HttpResponse::Conflict()
            .json(UploadResponse::failure(UploadStatus::Duplicate, message)),
        IngestError::ParseFailure(_) => HttpResponse::BadRequest()
            .json(UploadResponse::failure(UploadStatus::ParseError, message)),
        IngestError::EmptyFile => HttpResponse::BadRequest()
            .json(UploadResponse::failure(UploadStatus::EmptyFile, message)),
        IngestError::FileTooLarge(_) => HttpResponse::PayloadTooLarge()
            .json(UploadResponse::failure(UploadStatus::FileTooLarge, message)),
        IngestError::InvalidForm(_) => HttpResponse::BadRequest()
            .json(UploadResponse::failure(UploadStatus::InvalidForm, message)),
        IngestError::StorageWriteFailure(cause) => {
            error!("upload failed in the store: {}", cause);
            HttpResponse::InternalServerError().json(UploadResponse::failure(
                UploadStatus::StorageError,
                STORAGE_FAILURE_MESSAGE,
            ))
        }
    }
}

/// A form that breaks before any file arrived carries no spreadsheet at all.
fn form_error(e: actix_multipart::MultipartError, file_seen: bool) -> IngestError {
    if file_seen {
        IngestError::InvalidForm(e.to_string())
    } else {
        warn!("unreadable upload form: {}", e);
        IngestError::MissingFile
    }
}

/// Collects the form fields. The file is hashed while it streams in and refused as
/// soon as it grows past `limit`; the collection name is held to the same limit. A file
/// field without a filename means the user did not pick a file.
async fn read_upload(mut payload: Multipart, limit: usize) -> Result<Upload, IngestError> {
    let mut upload = Upload::default();
    let mut file_seen = false;

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| form_error(e, file_seen))?;
        let field_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match field_name.as_deref() {
            Some(FILE_FIELD) => {
                file_seen = true;
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();

                let mut md5_hasher = Context::new();
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(|e| form_error(e, file_seen))?;
                    if bytes.len() + chunk.len() > limit {
                        return Err(IngestError::FileTooLarge(limit));
                    }
                    md5_hasher.consume(&chunk);
                    bytes.extend_from_slice(&chunk);
                }

                if !filename.is_empty() {
                    upload.file = Some(UploadedFile {
                        name: filename,
                        bytes,
                        md5: format!("{:x}", md5_hasher.finalize()),
                    });
                }
            }

            Some(COLLECTION_NAME_FIELD) => {
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk.map_err(|e| form_error(e, file_seen))?;
                    if bytes.len() + chunk.len() > limit {
                        return Err(IngestError::InvalidForm(format!(
                            "{} exceeds {} bytes",
                            COLLECTION_NAME_FIELD, limit
                        )));
                    }
                    bytes.extend_from_slice(&chunk);
                }
                upload.collection_name = Some(String::from_utf8_lossy(&bytes).into_owned());
            }

            _ => {}
        }
    }

    Ok(upload)
}
