pub mod candidate;
pub mod chat;
pub mod user;
