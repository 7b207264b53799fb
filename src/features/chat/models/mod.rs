mod message;
mod read_watermark;
mod thread;

pub use message::{Message, NewMessage, SenderType};
pub use read_watermark::{ParticipantRole, ReadWatermark, WatermarkKey};
pub use thread::{ChatThread, ChatThreadRow, MessageSnapshot, ThreadScope};
