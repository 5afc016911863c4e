use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An uploaded voice sample. `data` holds the raw audio payload and is
/// only loaded when serving or synthesizing, never in listings.
#[derive(Debug, Clone)]
pub struct VoiceSample {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub mime_type: String,
    pub size: i64,
    pub data: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

/// Sample metadata without the audio payload
#[derive(Debug, Clone)]
pub struct VoiceMeta {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub mime_type: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoiceSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct VoiceDetails {
    pub id: String,
    pub name: String,
    pub size: i64,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub url: String,
}

/// Request to synthesize speech in a role's voice
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRequest {
    pub role_id: String,
    pub text: String,
}
