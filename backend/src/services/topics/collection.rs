use crate::error::StoreError;
use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder};
use common::responses::{CollectionSummary, UploadResponse, UploadStatus};
use log::error;

use super::STORAGE_FAILURE_MESSAGE;

/// Reports whether a container exists and how many documents it holds.
pub(crate) async fn process(name: web::Path<String>, state: web::Data<AppState>) -> impl Responder {
    let name = name.into_inner();
    let store = state.store.clone();
    let lookup = web::block(move || -> Result<CollectionSummary, StoreError> {
        let exists = store.collection_exists(&name)?;
        let documents = if exists { store.count_documents(&name)? } else { 0 };
        Ok(CollectionSummary {
            name,
            exists,
            documents,
        })
    })
    .await;

    match lookup {
        Ok(Ok(summary)) => HttpResponse::Ok().json(summary),
        Ok(Err(e)) => {
            error!("collection lookup failed: {}", e);
            storage_failure()
        }
        Err(e) => {
            error!("collection lookup task failed: {}", e);
            storage_failure()
        }
    }
}

fn storage_failure() -> HttpResponse {
    HttpResponse::InternalServerError().json(UploadResponse::failure(
        UploadStatus::StorageError,
        STORAGE_FAILURE_MESSAGE,
    ))
}
