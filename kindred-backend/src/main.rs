use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

mod ai;
mod config;
mod controllers;
mod db;
mod http;
mod models;

use ai::{GeminiClient, IndexTtsClient, KimiClient};
use config::Config;
use db::Database;

pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
    pub ai: Arc<KimiClient>,
    pub gemini: Arc<GeminiClient>,
    pub tts: Arc<IndexTtsClient>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let port = config.port;

    log::info!("Initializing database at {}", config.database_url);
    let db = Database::new(&config.database_url).expect("Failed to initialize database");
    let db = Arc::new(db);

    if let Some(password) = &config.default_admin_password {
        match db.seed_admin_user(password) {
            Ok(true) => log::info!("Seeded default admin user"),
            Ok(false) => {}
            Err(e) => log::warn!("Failed to seed admin user: {}", e),
        }
    }

    if config.kimi_api_key.is_none() {
        log::warn!("KIMI_API_KEY not set; persona replies will use the fallback message");
    }

    let ai = Arc::new(KimiClient::new(
        config.kimi_api_key.as_deref(),
        &config.kimi_endpoint,
        &config.kimi_model,
    ));
    let gemini = Arc::new(GeminiClient::new(
        config.google_api_key.as_deref(),
        &config.gemini_model,
    ));
    let tts = Arc::new(IndexTtsClient::new(&config.tts_space_url));

    log::info!("Starting Kindred server on port {}", port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(AppState {
                db: Arc::clone(&db),
                config: config.clone(),
                ai: Arc::clone(&ai),
                gemini: Arc::clone(&gemini),
                tts: Arc::clone(&tts),
            }))
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::health::config)
            .configure(controllers::users::config)
            .configure(controllers::roles::config)
            .configure(controllers::threads::config)
            .configure(controllers::knowledge::config)
            .configure(controllers::voices::config)
            .configure(controllers::avatars::config)
            .configure(controllers::generate::config)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
