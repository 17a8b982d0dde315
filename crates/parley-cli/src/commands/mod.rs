pub mod ask;
pub mod chat;
pub mod completion;
pub mod profile;
pub mod session;
