//! Avatar image endpoints

use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use uuid::Uuid;

use super::{read_multipart_file, require_user_session};
use crate::AppState;

const MAX_AVATAR_BYTES: usize = 5 * 1024 * 1024;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/avatar")
            .route("/upload", web::post().to(upload_avatar))
            .route("/{id}", web::get().to(get_avatar)),
    );
}

async fn upload_avatar(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: Multipart,
) -> impl Responder {
    if let Err(resp) = require_user_session(&state, &req) {
        return resp;
    }

    let file = match read_multipart_file(payload).await {
        Ok(file) => file,
        Err(e) => {
            return HttpResponse::BadRequest().json(serde_json::json!({ "error": e }));
        }
    };

    if !file.mime_type.starts_with("image/") {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Only image files are allowed"
        }));
    }

    if file.data.len() > MAX_AVATAR_BYTES {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "File size too large (max 5MB)"
        }));
    }

    let avatar_id = Uuid::new_v4().to_string();
    match state.db.add_avatar(&avatar_id, &file.mime_type, &file.data) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "id": avatar_id,
            "url": format!("/api/avatar/{}", avatar_id)
        })),
        Err(e) => {
            log::error!("Failed to store avatar: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to store avatar"
            }))
        }
    }
}

/// Serve avatar bytes. Unauthenticated so image tags can load them.
async fn get_avatar(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let avatar_id = path.into_inner();

    match state.db.get_avatar(&avatar_id) {
        Ok(Some((mime_type, data))) => HttpResponse::Ok()
            .content_type(mime_type)
            .insert_header(("Cache-Control", "public, max-age=31536000"))
            .body(data),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Avatar not found"
        })),
        Err(e) => {
            log::error!("Failed to get avatar {}: {}", avatar_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to get avatar"
            }))
        }
    }
}
