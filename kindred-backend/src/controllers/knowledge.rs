//! Role knowledge endpoints plus the global shared-note list

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

use super::require_user_session;
use crate::models::{
    AddKnowledgeRequest, BatchKnowledgeRequest, Knowledge, UpdateKnowledgeRequest,
};
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/role/{id}/knowledge")
            .route(web::get().to(list_role_knowledge))
            .route(web::post().to(add_knowledge)),
    )
    .service(
        web::resource("/api/role/{id}/knowledge/batch").route(web::post().to(add_batch_knowledge)),
    )
    .service(web::resource("/api/knowledge").route(web::post().to(add_shared_notes)))
    .service(
        web::resource("/api/knowledge/{id}")
            .route(web::put().to(update_knowledge))
            .route(web::delete().to(delete_knowledge)),
    );
}

async fn list_role_knowledge(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    if let Err(resp) = require_user_session(&state, &req) {
        return resp;
    }
    let role_id = path.into_inner();

    match state.db.list_role_knowledge(&role_id) {
        Ok(entries) => HttpResponse::Ok().json(entries),
        Err(e) => {
            log::error!("Failed to list knowledge for role {}: {}", role_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to list knowledge"
            }))
        }
    }
}

async fn add_knowledge(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<AddKnowledgeRequest>,
) -> impl Responder {
    if let Err(resp) = require_user_session(&state, &req) {
        return resp;
    }
    let role_id = path.into_inner();

    if body.content.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Content cannot be empty"
        }));
    }

    let kind = body.kind.unwrap_or_default();
    match state
        .db
        .add_knowledge(&role_id, body.content.trim(), body.name.as_deref(), kind)
    {
        Ok(knowledge) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "knowledge": knowledge
        })),
        Err(e) => {
            log::error!("Failed to add knowledge to role {}: {}", role_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to add knowledge"
            }))
        }
    }
}

/// Batch insert used by file uploads; blank entries are skipped
async fn add_batch_knowledge(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<BatchKnowledgeRequest>,
) -> impl Responder {
    if let Err(resp) = require_user_session(&state, &req) {
        return resp;
    }
    let role_id = path.into_inner();

    if body.contents.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Contents cannot be empty"
        }));
    }

    let kind = body.kind.unwrap_or_default();
    let mut added: Vec<Knowledge> = Vec::new();

    for (i, content) in body.contents.iter().enumerate() {
        let content = content.trim();
        if content.is_empty() {
            continue;
        }
        let name = body
            .names
            .as_ref()
            .and_then(|names| names.get(i))
            .map(|n| n.as_str());

        match state.db.add_knowledge(&role_id, content, name, kind) {
            Ok(knowledge) => added.push(knowledge),
            Err(e) => {
                log::error!("Failed to add batch knowledge to role {}: {}", role_id, e);
                return HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "Failed to add knowledge"
                }));
            }
        }
    }

    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "count": added.len(),
        "knowledge": added
    }))
}

async fn update_knowledge(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<UpdateKnowledgeRequest>,
) -> impl Responder {
    if let Err(resp) = require_user_session(&state, &req) {
        return resp;
    }
    let knowledge_id = path.into_inner();

    if body.content.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Content cannot be empty"
        }));
    }

    match state
        .db
        .update_knowledge(&knowledge_id, &body.content, body.name.as_deref())
    {
        Ok(Some(knowledge)) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "knowledge": knowledge
        })),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Knowledge not found"
        })),
        Err(e) => {
            log::error!("Failed to update knowledge {}: {}", knowledge_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to update knowledge"
            }))
        }
    }
}

async fn delete_knowledge(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    if let Err(resp) = require_user_session(&state, &req) {
        return resp;
    }
    let knowledge_id = path.into_inner();

    match state.db.delete_knowledge(&knowledge_id) {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": "Knowledge deleted"
        })),
        Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Knowledge not found"
        })),
        Err(e) => {
            log::error!("Failed to delete knowledge {}: {}", knowledge_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to delete knowledge"
            }))
        }
    }
}

/// Payload of the global note endpoint: one string or a list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NotesPayload {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct AddNotesRequest {
    data: NotesPayload,
}

/// Append to the global shared-note list feeding the demo stream
/// endpoint. Unauthenticated, like the demo itself.
async fn add_shared_notes(
    state: web::Data<AppState>,
    body: web::Json<AddNotesRequest>,
) -> impl Responder {
    let contents: Vec<String> = match body.into_inner().data {
        NotesPayload::One(note) => vec![note],
        NotesPayload::Many(notes) => notes,
    };
    let contents: Vec<String> = contents
        .into_iter()
        .filter(|note| !note.trim().is_empty())
        .collect();

    match state.db.append_shared_notes(&contents) {
        Ok(count) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "count": count
        })),
        Err(e) => {
            log::error!("Failed to append shared notes: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to add notes"
            }))
        }
    }
}
