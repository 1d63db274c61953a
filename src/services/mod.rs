pub mod calendar;
pub mod error;
pub mod followup_notes;
pub mod identity;
pub mod note_stats;
pub mod token_cache;
pub mod warranties;

pub use calendar::CalendarClient;
pub use error::UpstreamError;
pub use followup_notes::FollowupNoteService;
pub use identity::IdentityClient;
pub use note_stats::NoteStatsService;
pub use token_cache::{TokenCache, TokenSource};
pub use warranties::WarrantyService;
