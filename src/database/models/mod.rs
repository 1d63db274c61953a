pub mod followup_note;
pub mod warranty;

pub use followup_note::ClientFollowupNote;
pub use warranty::Warranty;
