//! Audit trail REST API - read-only.
//!
//! Events are appended by the notes lifecycle service; there is no mutating
//! endpoint here.

use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::AppState;

#[derive(Debug, Deserialize)]
struct ListAuditQuery {
    #[serde(rename = "noteId")]
    note_id: Option<String>,
}

async fn list_events(data: web::Data<AppState>, query: web::Query<ListAuditQuery>) -> impl Responder {
    match data.audit.list(query.note_id.as_deref()) {
        Ok(events) => HttpResponse::Ok().json(events),
        Err(e) => {
            log::error!("Failed to list audit events: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/audit").route("", web::get().to(list_events)));
}
