//! Registration, login, and the cookie-backed session endpoints

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::Cookie;
use actix_web::{web, HttpRequest, HttpResponse, Responder};

use super::{require_user_session, SESSION_COOKIE};
use crate::models::{LoginRequest, PublicUser, RegisterRequest};
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/user")
            .route("/register", web::post().to(register))
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout))
            .route("/session", web::get().to(session)),
    );
}

async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> impl Responder {
    if body.id.trim().is_empty() || body.name.trim().is_empty() || body.password.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "id, name and password are required"
        }));
    }

    match state.db.get_user(&body.id) {
        Ok(Some(_)) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "User already exists"
            }));
        }
        Ok(None) => {}
        Err(e) => {
            log::error!("Failed to check user {}: {}", body.id, e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    }

    match state.db.create_user(&body.id, &body.name, &body.password) {
        Ok(user) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Registration successful",
            "user": PublicUser::from(user)
        })),
        Err(e) => {
            log::error!("Failed to create user {}: {}", body.id, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to create user"
            }))
        }
    }
}

async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> impl Responder {
    let user = match state.db.get_user(&body.id) {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "User not found"
            }));
        }
        Err(e) => {
            log::error!("Failed to load user {}: {}", body.id, e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    if user.password != body.password {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Incorrect username or password"
        }));
    }

    let session = match state.db.create_session(&user.id) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Failed to create session for {}: {}", user.id, e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to create session"
            }));
        }
    };

    let cookie = Cookie::build(SESSION_COOKIE, session.token)
        .path("/")
        .http_only(true)
        .finish();

    HttpResponse::Ok().cookie(cookie).json(serde_json::json!({
        "message": "Login success",
        "user": PublicUser::from(user)
    }))
}

async fn logout(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if let Some(cookie) = req.cookie(SESSION_COOKIE) {
        if let Err(e) = state.db.delete_session(cookie.value()) {
            log::error!("Failed to delete session: {}", e);
        }
    }

    let removal = Cookie::build(SESSION_COOKIE, "")
        .path("/")
        .max_age(CookieDuration::ZERO)
        .finish();

    HttpResponse::Ok().cookie(removal).json(serde_json::json!({
        "success": true
    }))
}

async fn session(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let user = match require_user_session(&state, &req) {
        Ok(user) => user,
        Err(resp) => return resp,
    };

    HttpResponse::Ok().json(serde_json::json!({ "user": user }))
}
