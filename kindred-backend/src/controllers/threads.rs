//! Thread endpoints, including reply generation

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use uuid::Uuid;

use super::require_user_session;
use crate::ai::persona;
use crate::ai::{ChatMessage, MessageRole};
use crate::models::{
    AddTextRequest, CreateThreadRequest, Message, MessageKind, MessageSender,
    RenameThreadRequest, Role, Thread,
};
use crate::AppState;

/// Reply used when the completion call fails for any reason. The
/// request still reports success so the conversation keeps moving.
const FALLBACK_REPLY: &str = "Sorry, I'm a little busy right now. Can we chat again later?";

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/thread")
            .route("/create", web::post().to(create_thread))
            .route("/all", web::get().to(list_threads))
            .route("/{id}", web::delete().to(delete_thread))
            .route("/{id}/content", web::get().to(get_thread))
            .route("/{id}/title", web::put().to(rename_thread))
            .route("/{id}/text", web::post().to(add_text))
            .route("/{id}/reply", web::get().to(generate_reply)),
    );
}

async fn create_thread(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateThreadRequest>,
) -> impl Responder {
    let user = match require_user_session(&state, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    match state.db.create_thread(&user.id, &body.role_id) {
        Ok(thread) => HttpResponse::Ok().json(serde_json::json!({ "id": thread.id })),
        Err(e) => {
            log::error!("Failed to create thread for {}: {}", user.id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to create thread"
            }))
        }
    }
}

async fn list_threads(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let user = match require_user_session(&state, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    match state.db.list_user_threads(&user.id) {
        Ok(threads) => HttpResponse::Ok().json(threads),
        Err(e) => {
            log::error!("Failed to list threads for {}: {}", user.id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to list threads"
            }))
        }
    }
}

async fn delete_thread(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    let user = match require_user_session(&state, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let thread_id = path.into_inner();

    match state.db.delete_thread(&user.id, &thread_id) {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Thread not found"
        })),
        Err(e) => {
            log::error!("Failed to delete thread {}: {}", thread_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to delete thread"
            }))
        }
    }
}

async fn get_thread(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    if let Err(resp) = require_user_session(&state, &req) {
        return resp;
    }
    let thread_id = path.into_inner();

    match state.db.get_thread(&thread_id) {
        Ok(Some(thread)) => HttpResponse::Ok().json(thread),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Thread not found"
        })),
        Err(e) => {
            log::error!("Failed to get thread {}: {}", thread_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to get thread"
            }))
        }
    }
}

async fn rename_thread(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<RenameThreadRequest>,
) -> impl Responder {
    if let Err(resp) = require_user_session(&state, &req) {
        return resp;
    }
    let thread_id = path.into_inner();

    if body.title.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Title cannot be empty"
        }));
    }

    match state.db.set_thread_title(&thread_id, &body.title) {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Thread not found"
        })),
        Err(e) => {
            log::error!("Failed to rename thread {}: {}", thread_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to rename thread"
            }))
        }
    }
}

/// Append a user text message to a thread
async fn add_text(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<AddTextRequest>,
) -> impl Responder {
    let user = match require_user_session(&state, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let thread_id = path.into_inner();

    if body.message.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Message cannot be empty"
        }));
    }

    let message = Message {
        id: Uuid::new_v4().to_string(),
        sender: MessageSender::User,
        sender_id: user.id,
        kind: MessageKind::Text,
        content: body.into_inner().message,
    };

    match state.db.append_message(&thread_id, &message) {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Thread not found"
        })),
        Err(e) => {
            log::error!("Failed to append message to thread {}: {}", thread_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to append message"
            }))
        }
    }
}

/// Generate the persona's reply for a thread: load thread and role,
/// ground the system prompt in the role's knowledge, call the
/// completion API, and append the result as an "ai" message. Any
/// failure past the 404 checks is swallowed into the fallback reply.
async fn generate_reply(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    if let Err(resp) = require_user_session(&state, &req) {
        return resp;
    }
    let thread_id = path.into_inner();

    let thread = match state.db.get_thread(&thread_id) {
        Ok(Some(thread)) => thread,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Thread not found"
            }));
        }
        Err(e) => {
            log::error!("Failed to get thread {}: {}", thread_id, e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to get thread"
            }));
        }
    };

    let role = match state.db.get_role(&thread.role_id) {
        Ok(Some(role)) => role,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Role not found"
            }));
        }
        Err(e) => {
            log::error!("Failed to get role {}: {}", thread.role_id, e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to get role"
            }));
        }
    };

    let reply = match persona_reply(&state, &thread, &role).await {
        Ok(text) => text,
        Err(e) => {
            log::error!("Reply generation failed for thread {}: {}", thread.id, e);
            FALLBACK_REPLY.to_string()
        }
    };

    let message = Message {
        id: Uuid::new_v4().to_string(),
        sender: MessageSender::Ai,
        sender_id: thread.role_id.clone(),
        kind: MessageKind::Text,
        content: reply.clone(),
    };

    match state.db.append_message(&thread.id, &message) {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "message": reply
        })),
        Err(e) => {
            log::error!("Failed to append reply to thread {}: {}", thread.id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to store reply"
            }))
        }
    }
}

async fn persona_reply(
    state: &web::Data<AppState>,
    thread: &Thread,
    role: &Role,
) -> Result<String, String> {
    let knowledge = state
        .db
        .role_knowledge_texts(&role.id)
        .map_err(|e| format!("Failed to load knowledge: {}", e))?;

    let mut turns = vec![ChatMessage {
        role: MessageRole::System,
        content: persona::build_system_prompt(role, &knowledge),
    }];
    turns.extend(persona::history_to_turns(thread));

    state.ai.generate_text(&turns).await
}
