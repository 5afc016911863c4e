pub mod knowledge;
pub mod role;
pub mod session;
pub mod thread;
pub mod user;
pub mod voice;

pub use knowledge::{
    AddKnowledgeRequest, BatchKnowledgeRequest, Knowledge, KnowledgeKind, UpdateKnowledgeRequest,
};
pub use role::{CreateRoleRequest, Role, RoleResponse};
pub use session::AuthSession;
pub use thread::{
    AddTextRequest, CreateThreadRequest, Message, MessageKind, MessageSender,
    RenameThreadRequest, Thread,
};
pub use user::{LoginRequest, PublicUser, RegisterRequest, User};
pub use voice::{SpeechRequest, VoiceDetails, VoiceMeta, VoiceSample, VoiceSummary};
