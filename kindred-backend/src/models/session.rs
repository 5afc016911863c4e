use chrono::{DateTime, Utc};
use serde::Serialize;

/// Web login session backing the session cookie
#[derive(Debug, Clone, Serialize)]
pub struct AuthSession {
    pub id: i64,
    pub token: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
