pub mod auth;
pub mod avatars;
pub mod knowledge;
pub mod roles;
pub mod shared_notes;
pub mod threads;
pub mod users;
pub mod voices;
