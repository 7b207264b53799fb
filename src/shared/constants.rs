/// Longest accepted conversation message, in characters
pub const MAX_MESSAGE_LENGTH: u64 = 2000;

/// Photos a citizen may attach to one report
pub const MAX_REPORT_PHOTOS: u64 = 10;

// =============================================================================
// REPORT FIELD LIMITS
// =============================================================================

pub const MAX_REPORT_TITLE_LENGTH: u64 = 200;

pub const MAX_REPORT_DESCRIPTION_LENGTH: u64 = 5000;

pub const MAX_REJECTION_REASON_LENGTH: u64 = 1000;
