mod conversation_service;
mod read_tracker_service;

pub use conversation_service::ConversationService;
pub use read_tracker_service::ReadTrackerService;
