pub mod gemini;
pub mod kimi;
pub mod persona;
pub mod tts;

pub use gemini::GeminiClient;
pub use kimi::KimiClient;
pub use tts::IndexTtsClient;

use serde::{Deserialize, Serialize};

/// Message role on the chat-completion wire format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// A single turn sent to the completion endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}
