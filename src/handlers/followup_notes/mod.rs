// handlers/followup_notes/mod.rs - Client follow-up note handlers

use crate::error::ApiError;
use crate::filter::{parse_range_bound, RangeEdge};
use crate::middleware::QueryParams;
use crate::services::followup_notes::NoteFilter;

pub mod create; // POST /client-followup-notes
pub mod delete; // DELETE /client-followup-notes/:id
pub mod list;   // GET /client-followup-notes
pub mod show;   // GET /client-followup-notes/:id
pub mod stats;  // GET /client-followup-notes/stats
pub mod update; // PATCH|PUT /client-followup-notes/:id

pub use create::note_create;
pub use delete::note_delete;
pub use list::note_list;
pub use show::note_show;
pub use stats::note_stats;
pub use update::note_update;

/// Note predicates from the query string. `clients_ids` may be repeated,
/// comma-separated, or both.
pub fn filter_from_query(query: &QueryParams) -> Result<NoteFilter, ApiError> {
    Ok(NoteFilter {
        client_id: query.get_owned("client_id"),
        clients_ids: query.list("clients_ids"),
        tag: query.get_owned("tag"),
        created_by_user_id: query.get_owned("created_by_user_id"),
        created_by_user_email: query.get_owned("created_by_user_email"),
        client_name: query.get_owned("client_name"),
        date_start: parse_range_bound("date_start", query.get("date_start"), RangeEdge::Start)?,
        date_end: parse_range_bound("date_end", query.get("date_end"), RangeEdge::End)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_sets_merge_repeated_and_comma_forms() {
        let query = QueryParams::parse(Some("clients_ids=c1,c2&clients_ids=c3&tag=call"));
        let filter = filter_from_query(&query).unwrap();
        assert_eq!(filter.clients_ids, Some(vec!["c1".into(), "c2".into(), "c3".into()]));
        assert_eq!(filter.tag.as_deref(), Some("call"));
        assert!(filter.date_start.is_none());
    }
}
