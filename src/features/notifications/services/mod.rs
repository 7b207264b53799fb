mod notification_hub;
mod notification_service;
mod push;

pub use notification_hub::NotificationHub;
pub use notification_service::NotificationService;
pub use push::{PushChannel, PushError};
