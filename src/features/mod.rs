pub mod assignments;
pub mod auth;
pub mod categories;
pub mod chat;
pub mod notifications;
pub mod reports;
