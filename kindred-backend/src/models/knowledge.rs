use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a knowledge entry was captured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeKind {
    Text,
    File,
}

impl KnowledgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            KnowledgeKind::Text => "text",
            KnowledgeKind::File => "file",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(KnowledgeKind::Text),
            "file" => Some(KnowledgeKind::File),
            _ => None,
        }
    }
}

impl Default for KnowledgeKind {
    fn default() -> Self {
        KnowledgeKind::Text
    }
}

/// A free-text memory snippet attached to a role, injected into the
/// system prompt when that role replies
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Knowledge {
    pub id: String,
    pub role_id: String,
    pub name: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: KnowledgeKind,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct AddKnowledgeRequest {
    pub content: String,
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<KnowledgeKind>,
}

/// Batch variant used by file uploads; blank entries are skipped
#[derive(Debug, Deserialize)]
pub struct BatchKnowledgeRequest {
    pub contents: Vec<String>,
    pub names: Option<Vec<String>>,
    #[serde(rename = "type", default)]
    pub kind: Option<KnowledgeKind>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateKnowledgeRequest {
    pub content: String,
    pub name: Option<String>,
}
