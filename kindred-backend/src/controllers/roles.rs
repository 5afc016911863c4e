//! Persona role endpoints

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use uuid::Uuid;

use super::require_user_session;
use crate::models::{CreateRoleRequest, Role, RoleResponse};
use crate::AppState;

/// Description given to roles created without one
const DEFAULT_ROLE_DESCRIPTION: &str = "My digital relative";

pub fn config(cfg: &mut web::ServiceConfig) {
    // Plain resources rather than a scope: the role-knowledge routes in
    // the knowledge controller share the /api/role/{id} prefix.
    cfg.service(web::resource("/api/role/create").route(web::post().to(create_role)))
        .service(web::resource("/api/role/all").route(web::get().to(list_roles)))
        .service(web::resource("/api/role/{id}").route(web::delete().to(delete_role)));
}

async fn create_role(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateRoleRequest>,
) -> impl Responder {
    let user = match require_user_session(&state, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    if body.name.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Name is required"
        }));
    }

    let body = body.into_inner();
    let role = Role {
        id: Uuid::new_v4().to_string(),
        belongs_to: user.id.clone(),
        name: body.name,
        description: body
            .description
            .unwrap_or_else(|| DEFAULT_ROLE_DESCRIPTION.to_string()),
        avatar: body.avatar.unwrap_or_default(),
        background: body.background.unwrap_or_default(),
        voice_id: body.voice_id.unwrap_or_else(|| "default".to_string()),
        created_at: Utc::now(),
    };

    match state.db.create_role(&role) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "id": role.id })),
        Err(e) => {
            log::error!("Failed to create role for {}: {}", user.id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to create role"
            }))
        }
    }
}

/// List the owner's roles, each with its knowledge entry count
async fn list_roles(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let user = match require_user_session(&state, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    match state.db.list_user_roles(&user.id) {
        Ok(roles) => {
            let responses: Vec<RoleResponse> = roles
                .into_iter()
                .map(|role| {
                    let role_id = role.id.clone();
                    let mut response: RoleResponse = role.into();
                    if let Ok(count) = state.db.count_role_knowledge(&role_id) {
                        response.knowledge_count = count;
                    }
                    response
                })
                .collect();
            HttpResponse::Ok().json(responses)
        }
        Err(e) => {
            log::error!("Failed to list roles for {}: {}", user.id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to list roles"
            }))
        }
    }
}

async fn delete_role(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    let user = match require_user_session(&state, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let role_id = path.into_inner();

    match state.db.delete_role(&user.id, &role_id) {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Role not found"
        })),
        Err(e) => {
            log::error!("Failed to delete role {}: {}", role_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to delete role"
            }))
        }
    }
}
