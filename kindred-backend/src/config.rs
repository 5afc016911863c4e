use std::env;

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    /// Moonshot (Kimi) credentials for persona replies. Missing key
    /// means the reply path always takes the fallback branch.
    pub kimi_api_key: Option<String>,
    pub kimi_endpoint: String,
    pub kimi_model: String,
    /// Gemini credentials for the demo streaming endpoint
    pub google_api_key: Option<String>,
    pub gemini_model: String,
    /// Hosted IndexTTS Gradio space for text-to-speech
    pub tts_space_url: String,
    /// When set, an `admin` user is seeded at startup with this password
    pub default_admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "./.db/kindred.db".to_string()),
            kimi_api_key: env::var("KIMI_API_KEY").ok(),
            kimi_endpoint: env::var("KIMI_ENDPOINT")
                .unwrap_or_else(|_| "https://api.moonshot.cn/v1/chat/completions".to_string()),
            kimi_model: env::var("KIMI_MODEL").unwrap_or_else(|_| "kimi-latest".to_string()),
            google_api_key: env::var("GOOGLE_API_KEY").ok(),
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash".to_string()),
            tts_space_url: env::var("TTS_SPACE_URL")
                .unwrap_or_else(|_| "https://indexteam-indextts.hf.space".to_string()),
            default_admin_password: env::var("DEFAULT_ADMIN_PASSWORD").ok(),
        }
    }
}
