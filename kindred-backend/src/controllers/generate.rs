//! Unauthenticated demo endpoint that relays provider chunks straight
//! to the HTTP response as they arrive.

use actix_web::web::Bytes;
use actix_web::{web, HttpResponse, Responder};
use futures_util::StreamExt;
use serde::Deserialize;

use crate::ai::gemini::SseTextParser;
use crate::AppState;

/// System role given to the model for the memory-capsule demo
const CURATOR_PROMPT: &str = "\
# Role
You are an empathetic family biographer and memory curator. Your craft
is listening to scattered, colloquial fragments of everyday life and
finding in them the speaker's character, core values, and the moments
worth keeping.

# Task
Do not write an academic analysis. Work through these recordings the
way a loving family member would:

1. Themes and personality: identify the life themes running through the
   fragments (responsibility to family, love of work, an optimistic
   streak) and the personality traits behind them, woven into one warm,
   humane description.

2. Guiding questions: produce a JSON list of open, caring questions
   that would help a younger relative start a deeper conversation with
   the speaker, each answered with lightly cleaned-up quotes from the
   original text.

# Setting
The text below is an informal transcript of an elder talking. It jumps
between topics, is heavily colloquial, and hides what matters inside
small everyday detail.

# Transcript
";

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    prompt: String,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/generate-stream").route(web::post().to(generate_stream)));
}

async fn generate_stream(
    state: web::Data<AppState>,
    body: web::Json<GenerateRequest>,
) -> impl Responder {
    let notes = match state.db.list_shared_notes() {
        Ok(notes) => notes,
        Err(e) => {
            log::error!("Failed to load shared notes: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to load notes"
            }));
        }
    };

    let joined = if notes.is_empty() {
        "> nothing recorded yet".to_string()
    } else {
        notes.join("\n\n---\n\n")
    };
    let system_instruction = format!("{}\n---\n\n{}", CURATOR_PROMPT, joined);

    let upstream = match state
        .gemini
        .stream_generate(&system_instruction, &body.prompt)
        .await
    {
        Ok(response) => response,
        Err(e) => {
            log::error!("Streaming generation failed: {}", e);
            return HttpResponse::BadGateway().json(serde_json::json!({ "error": e }));
        }
    };

    // Relay each text chunk as soon as the upstream produces it. The
    // parser reassembles SSE events split across network chunks; a
    // chunk with no completed event relays as an empty body chunk.
    let mut parser = SseTextParser::new();
    let relay = upstream.bytes_stream().map(move |chunk| {
        chunk
            .map(|bytes| Bytes::from(parser.push(&bytes).concat()))
            .map_err(|e| {
                log::warn!("Upstream stream ended with error: {}", e);
                actix_web::error::ErrorInternalServerError(e)
            })
    });

    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .streaming(relay)
}
