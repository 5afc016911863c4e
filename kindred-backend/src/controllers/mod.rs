pub mod avatars;
pub mod generate;
pub mod health;
pub mod knowledge;
pub mod roles;
pub mod threads;
pub mod users;
pub mod voices;

use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use futures_util::TryStreamExt;

use crate::models::PublicUser;
use crate::AppState;

/// Name of the session cookie set at login
pub const SESSION_COOKIE: &str = "kindred_session";

/// Resolve the logged-in user from the session cookie. Every protected
/// handler calls this first; the Err side is the ready-made rejection.
pub fn require_user_session(
    state: &web::Data<AppState>,
    req: &HttpRequest,
) -> Result<PublicUser, HttpResponse> {
    let token = match req.cookie(SESSION_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => {
            return Err(HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Not logged in"
            })));
        }
    };

    let session = match state.db.validate_session(&token) {
        Ok(Some(session)) => session,
        Ok(None) => {
            return Err(HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid or expired session"
            })));
        }
        Err(e) => {
            log::error!("Session validation error: {}", e);
            return Err(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            })));
        }
    };

    match state.db.get_user(&session.user_id) {
        Ok(Some(user)) => Ok(user.into()),
        Ok(None) => Err(HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid or expired session"
        }))),
        Err(e) => {
            log::error!("Failed to load session user: {}", e);
            Err(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            })))
        }
    }
}

/// A file pulled out of a multipart upload
pub struct UploadedFile {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Read the first `file` field of a multipart payload into memory.
pub async fn read_multipart_file(mut payload: Multipart) -> Result<UploadedFile, String> {
    while let Ok(Some(mut field)) = payload.try_next().await {
        if field.name() != "file" {
            continue;
        }

        let file_name = field
            .content_disposition()
            .get_filename()
            .map(|name| name.to_string())
            .unwrap_or_else(|| "upload".to_string());
        let mime_type = field
            .content_type()
            .map(|mime| mime.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let mut data = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| format!("Failed to read upload: {}", e))?
        {
            data.extend_from_slice(&chunk);
        }

        return Ok(UploadedFile {
            file_name,
            mime_type,
            data,
        });
    }

    Err("No file provided".to_string())
}
