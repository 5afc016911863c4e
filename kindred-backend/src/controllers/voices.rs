//! Voice sample endpoints: upload, serving, listings, and the
//! text-to-speech passthrough

use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::Utc;
use uuid::Uuid;

use super::{read_multipart_file, require_user_session};
use crate::models::{SpeechRequest, VoiceDetails, VoiceSample, VoiceSummary};
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/voice")
            .route("/upload", web::post().to(upload_voice))
            .route("/list", web::get().to(list_voices))
            .route("/details", web::get().to(voice_details))
            .route("/speech", web::post().to(speech))
            // keep the catch-all id route last
            .route("/{id}", web::get().to(get_voice)),
    );
}

async fn upload_voice(
    state: web::Data<AppState>,
    req: HttpRequest,
    payload: Multipart,
) -> impl Responder {
    let user = match require_user_session(&state, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    let file = match read_multipart_file(payload).await {
        Ok(file) => file,
        Err(e) => {
            return HttpResponse::BadRequest().json(serde_json::json!({ "error": e }));
        }
    };

    if file.data.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Uploaded file is empty"
        }));
    }

    let voice = VoiceSample {
        id: Uuid::new_v4().to_string(),
        user_id: user.id,
        name: file.file_name,
        mime_type: file.mime_type,
        size: file.data.len() as i64,
        data: file.data,
        created_at: Utc::now(),
    };

    match state.db.add_voice(&voice) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "id": voice.id })),
        Err(e) => {
            log::error!("Failed to store voice sample: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to store voice sample"
            }))
        }
    }
}

/// Serve the raw audio bytes of a sample
async fn get_voice(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    if let Err(resp) = require_user_session(&state, &req) {
        return resp;
    }
    let voice_id = path.into_inner();

    let voice = match state.db.get_voice(&voice_id) {
        Ok(Some(voice)) => voice,
        Ok(None) => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "Voice not found"
            }));
        }
        Err(e) => {
            log::error!("Failed to get voice {}: {}", voice_id, e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to get voice"
            }));
        }
    };

    HttpResponse::Ok()
        .content_type(voice.mime_type.clone())
        .insert_header(("Cache-Control", "public, max-age=31536000"))
        .insert_header((
            "Content-Disposition",
            format!(
                "attachment; filename=\"voice-{}.{}\"",
                voice.id,
                audio_extension(&voice.mime_type)
            ),
        ))
        .body(voice.data)
}

async fn list_voices(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let user = match require_user_session(&state, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    match state.db.list_user_voice_meta(&user.id) {
        Ok(metas) => {
            let summaries: Vec<VoiceSummary> = metas
                .into_iter()
                .map(|meta| VoiceSummary {
                    id: meta.id,
                    name: meta.name,
                })
                .collect();
            HttpResponse::Ok().json(summaries)
        }
        Err(e) => {
            log::error!("Failed to list voices for {}: {}", user.id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to list voices"
            }))
        }
    }
}

async fn voice_details(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let user = match require_user_session(&state, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    match state.db.list_user_voice_meta(&user.id) {
        Ok(metas) => {
            let details: Vec<VoiceDetails> = metas
                .into_iter()
                .map(|meta| VoiceDetails {
                    url: format!("/api/voice/{}", meta.id),
                    id: meta.id,
                    name: meta.name,
                    size: meta.size,
                    mime_type: meta.mime_type,
                })
                .collect();
            HttpResponse::Ok().json(details)
        }
        Err(e) => {
            log::error!("Failed to list voice details for {}: {}", user.id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to list voice details"
            }))
        }
    }
}

/// Synthesize speech in a role's voice via the hosted TTS space. The
/// role's voice_id points at the sample used as the prompt audio.
async fn speech(state: web::Data<AppState>, body: web::Json<SpeechRequest>) -> impl Responder {
    let role = match state.db.get_role(&body.role_id) {
        Ok(Some(role)) => role,
        Ok(None) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "No audio found"
            }));
        }
        Err(e) => {
            log::error!("Failed to get role {}: {}", body.role_id, e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    let voice = match state.db.get_voice(&role.voice_id) {
        Ok(Some(voice)) => voice,
        Ok(None) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "No audio found"
            }));
        }
        Err(e) => {
            log::error!("Failed to get voice {}: {}", role.voice_id, e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    match state
        .tts
        .synthesize(&voice.data, &voice.mime_type, &voice.name, &body.text)
        .await
    {
        Ok(url) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "url": url
        })),
        Err(e) => {
            log::error!("Speech synthesis failed for role {}: {}", body.role_id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Speech synthesis failed"
            }))
        }
    }
}

/// Map an audio mime type to a download extension
fn audio_extension(mime_type: &str) -> &'static str {
    match mime_type {
        "audio/mpeg" => "mp3",
        "audio/wav" => "wav",
        "audio/mp4" | "audio/x-m4a" => "m4a",
        "audio/ogg" => "ogg",
        _ => "audio",
    }
}

#[cfg(test)]
mod tests {
    use super::audio_extension;

    #[test]
    fn known_mime_types_map_to_extensions() {
        assert_eq!(audio_extension("audio/mpeg"), "mp3");
        assert_eq!(audio_extension("audio/wav"), "wav");
        assert_eq!(audio_extension("audio/mp4"), "m4a");
        assert_eq!(audio_extension("audio/x-m4a"), "m4a");
        assert_eq!(audio_extension("audio/ogg"), "ogg");
        assert_eq!(audio_extension("application/octet-stream"), "audio");
    }
}
