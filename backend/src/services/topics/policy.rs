use crate::state::AppState;
use actix_web::{web, HttpResponse, Responder};
use common::responses::PolicyInfo;

pub(crate) async fn process(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(PolicyInfo {
        policy: state.policy.name().to_string(),
        requires_collection_name: state.policy.requires_collection_name(),
    })
}
