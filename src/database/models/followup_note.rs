use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClientFollowupNote {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub tag: Option<String>,
    pub file_url: Option<String>,
    pub client_id: String,
    pub client_name: Option<String>,

    pub created_at: DateTime<Utc>,
    pub created_by_user_id: String,
    pub created_by_user_name: String,
    pub created_by_user_image: Option<String>,
    pub created_by_user_email: Option<String>,

    pub updated_at: DateTime<Utc>,
    pub updated_by_user_id: String,
    pub updated_by_user_name: String,
    pub updated_by_user_image: Option<String>,
}

impl ClientFollowupNote {
    pub const TABLE: &'static str = "client_followup_notes";
}
