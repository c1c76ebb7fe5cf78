pub mod ask;
pub mod chat;
pub mod plans;
pub mod sweep;
