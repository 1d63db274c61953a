use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Warranty {
    pub id: i64,
    pub customer_id: String,
    pub customer_name: String,
    pub customer_identification: String,
    pub customer_email: Option<String>,
    pub customer_cellphone: Option<String>,
    pub seller_id: String,
    pub seller_name: String,
    pub status: String,
    pub is_active: bool,
    pub products_relation_ids: Option<Vec<String>>,
    pub notes_relation_ids: Option<Vec<String>>,

    pub user_created_date: DateTime<Utc>,
    pub user_created_name: String,
    pub user_created_id: String,
    pub user_created_img: Option<String>,

    pub user_updated_date: Option<DateTime<Utc>>,
    pub user_updated_name: Option<String>,
    pub user_updated_id: Option<String>,
    pub user_updated_img: Option<String>,

    pub user_updated_status_date: Option<DateTime<Utc>>,
    pub user_updated_status_name: Option<String>,
    pub user_updated_status_id: Option<String>,
    pub user_updated_status_img: Option<String>,
}

impl Warranty {
    pub const TABLE: &'static str = "warranties";
}
