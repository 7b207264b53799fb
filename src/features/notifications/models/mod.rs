mod notification;

pub use notification::{NewNotification, Notification};
