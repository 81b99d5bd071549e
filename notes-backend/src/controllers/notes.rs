//! Notes REST API.
//!
//! Reads (list/get) are open; every mutation requires the shared-secret
//! `x-api-key` header. Input shape validation happens here, before the
//! lifecycle service is reached.

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

use crate::error::ServiceError;
use crate::models::{CreateNoteRequest, UpdateNoteRequest};
use crate::services::notes::ListNotesRequest;
use crate::AppState;

/// Validate the shared-secret api key from the request headers.
/// With no API_KEY configured, all mutations are rejected.
fn validate_api_key(state: &web::Data<AppState>, req: &HttpRequest) -> Result<(), HttpResponse> {
    let provided = req
        .headers()
        .get("x-api-key")
        .and_then(|h| h.to_str().ok());

    match (&state.config.api_key, provided) {
        (Some(expected), Some(given)) if given == expected => Ok(()),
        _ => Err(HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid API key"
        }))),
    }
}

#[derive(Debug, Deserialize)]
struct ListNotesQuery {
    limit: Option<i64>,
    offset: Option<i64>,
    q: Option<String>,
    tag: Option<String>,
    published: Option<String>,
}

async fn list_notes(data: web::Data<AppState>, query: web::Query<ListNotesQuery>) -> impl Responder {
    let query = query.into_inner();
    let published = query.published.map(|p| p.to_lowercase() == "true");

    match data.notes.list(ListNotesRequest {
        limit: query.limit,
        offset: query.offset,
        q: query.q,
        tag: query.tag,
        published,
    }) {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(e) => {
            log::error!("Failed to list notes: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

async fn get_note(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();

    match data.notes.get(&id) {
        Ok(note) => HttpResponse::Ok().json(note),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Note not found"
        })),
        Err(e) => {
            log::error!("Failed to get note {}: {}", id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

async fn create_note(
    data: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateNoteRequest>,
) -> impl Responder {
    if let Err(resp) = validate_api_key(&data, &req) {
        return resp;
    }

    let body = body.into_inner();
    if body.title.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Title must not be empty"
        }));
    }

    match data.notes.create(body) {
        Ok(note) => HttpResponse::Ok().json(note),
        Err(e) => {
            log::error!("Failed to create note: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

async fn update_note(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<UpdateNoteRequest>,
) -> impl Responder {
    if let Err(resp) = validate_api_key(&data, &req) {
        return resp;
    }

    let id = path.into_inner();
    let body = body.into_inner();

    if let Some(title) = &body.title {
        if title.trim().is_empty() {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Title must not be empty"
            }));
        }
    }

    match data.notes.update(&id, body, None) {
        Ok(note) => HttpResponse::Ok().json(note),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Note not found"
        })),
        Err(e) => {
            log::error!("Failed to update note {}: {}", id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

async fn remove_note(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    if let Err(resp) = validate_api_key(&data, &req) {
        return resp;
    }

    let id = path.into_inner();

    match data.notes.remove(&id) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "ok": true })),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Note not found"
        })),
        Err(e) => {
            log::error!("Failed to remove note {}: {}", id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

#[derive(Debug, Deserialize)]
struct PublishRequest {
    #[serde(default)]
    published: bool,
}

async fn publish_note(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<PublishRequest>,
) -> impl Responder {
    if let Err(resp) = validate_api_key(&data, &req) {
        return resp;
    }

    let id = path.into_inner();

    match data.notes.set_published(&id, body.published) {
        Ok(note) => HttpResponse::Ok().json(note),
        Err(ServiceError::NotFound) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Note not found"
        })),
        Err(e) => {
            log::error!("Failed to set publish state for note {}: {}", id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/notes")
            .route("", web::get().to(list_notes))
            .route("", web::post().to(create_note))
            .route("/{id}", web::get().to(get_note))
            .route("/{id}", web::patch().to(update_note))
            .route("/{id}", web::delete().to(remove_note))
            .route("/{id}/publish", web::post().to(publish_note)),
    );
}
