use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An AI persona ("digital relative") owned by a user
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: String,
    pub belongs_to: String,
    pub name: String,
    pub description: String,
    pub avatar: String,
    pub background: String,
    pub voice_id: String,
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

/// Request to create a new role. Everything but the name is optional
/// and defaulted server-side.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    pub name: String,
    pub description: Option<String>,
    pub avatar: Option<String>,
    pub background: Option<String>,
    pub voice_id: Option<String>,
}

/// Role plus derived fields for the listing endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub id: String,
    pub belongs_to: String,
    pub name: String,
    pub description: String,
    pub avatar: String,
    pub background: String,
    pub voice_id: String,
    pub knowledge_count: i64,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        RoleResponse {
            id: role.id,
            belongs_to: role.belongs_to,
            name: role.name,
            description: role.description,
            avatar: role.avatar,
            background: role.background,
            voice_id: role.voice_id,
            knowledge_count: 0,
        }
    }
}
