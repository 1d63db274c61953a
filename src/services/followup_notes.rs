use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::database::models::ClientFollowupNote;
use crate::database::{DatabaseError, Repository};
use crate::error::{ApiError, FieldErrors};
use crate::filter::{Filter, FilterError, FilterOrderInfo, FilterWhere, Pagination};

pub fn note_order() -> Vec<FilterOrderInfo> {
    vec![
        FilterOrderInfo::desc("updated_at"),
        FilterOrderInfo::desc("created_at"),
        FilterOrderInfo::desc("id"),
    ]
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateNote {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tag: Option<String>,
    pub file_url: Option<String>,
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub created_by_user_id: Option<String>,
    pub created_by_user_name: Option<String>,
    pub created_by_user_image: Option<String>,
    pub created_by_user_email: Option<String>,
}

impl CreateNote {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.require("title", self.title.as_deref());
        errors.require("description", self.description.as_deref());
        errors.require("client_id", self.client_id.as_deref());
        errors.require("created_by_user_id", self.created_by_user_id.as_deref());
        errors.require("created_by_user_name", self.created_by_user_name.as_deref());
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateNote {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tag: Option<String>,
    pub file_url: Option<String>,
    pub updated_by_user_id: Option<String>,
    pub updated_by_user_name: Option<String>,
    pub updated_by_user_image: Option<String>,
}

impl UpdateNote {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.require("updated_by_user_id", self.updated_by_user_id.as_deref());
        errors.require("updated_by_user_name", self.updated_by_user_name.as_deref());
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteActor {
    pub updated_by_user_id: Option<String>,
    pub updated_by_user_name: Option<String>,
    pub updated_by_user_image: Option<String>,
}

/// Predicates shared by the list and stats endpoints. The date range only
/// applies to listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteFilter {
    pub client_id: Option<String>,
    pub clients_ids: Option<Vec<String>>,
    pub tag: Option<String>,
    pub created_by_user_id: Option<String>,
    pub created_by_user_email: Option<String>,
    pub client_name: Option<String>,
    pub date_start: Option<DateTime<Utc>>,
    pub date_end: Option<DateTime<Utc>>,
}

impl NoteFilter {
    /// Conditions without the date range.
    pub fn base_conditions(&self) -> FilterWhere {
        let mut conditions = FilterWhere::new();
        conditions
            .eq("client_id", self.client_id.as_deref())
            .any_of("client_id", self.clients_ids.as_deref())
            .contains("tag", self.tag.as_deref())
            .eq("created_by_user_id", self.created_by_user_id.as_deref())
            .eq("created_by_user_email", self.created_by_user_email.as_deref())
            .contains("client_name", self.client_name.as_deref());
        conditions
    }

    pub fn to_filter(&self, pagination: Pagination) -> Result<Filter, FilterError> {
        let mut conditions = self.base_conditions();
        conditions
            .gte("created_at", self.date_start)
            .lte("created_at", self.date_end);

        let mut filter = Filter::new(ClientFollowupNote::TABLE)?;
        filter.where_clause(conditions).order(note_order()).paginate(pagination);
        Ok(filter)
    }
}

pub struct FollowupNoteService {
    repo: Repository<ClientFollowupNote>,
}

impl FollowupNoteService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repo: Repository::new(ClientFollowupNote::TABLE, pool),
        }
    }

    pub async fn get_paginated(
        &self,
        filter: &NoteFilter,
        pagination: Pagination,
    ) -> Result<(Vec<ClientFollowupNote>, i64), DatabaseError> {
        self.repo.paginate(filter.to_filter(pagination)?).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<ClientFollowupNote, DatabaseError> {
        self.repo.select_by_id(id).await?.ok_or_else(not_found)
    }

    /// The creator is also recorded as the first updater.
    pub async fn create(&self, input: CreateNote) -> Result<ClientFollowupNote, DatabaseError> {
        let row = sqlx::query_as::<_, ClientFollowupNote>(
            r#"
            INSERT INTO client_followup_notes (
                title, description, tag, file_url, client_id, client_name,
                created_by_user_id, created_by_user_name, created_by_user_image, created_by_user_email,
                updated_by_user_id, updated_by_user_name, updated_by_user_image
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(input.title)
        .bind(input.description)
        .bind(input.tag)
        .bind(input.file_url)
        .bind(input.client_id)
        .bind(input.client_name)
        .bind(input.created_by_user_id)
        .bind(input.created_by_user_name)
        .bind(input.created_by_user_image)
        .bind(input.created_by_user_email)
        .fetch_one(self.repo.pool())
        .await?;

        info!("Created client follow-up note {}", row.id);
        Ok(row)
    }

    pub async fn update(&self, id: i64, input: UpdateNote) -> Result<ClientFollowupNote, DatabaseError> {
        let row = sqlx::query_as::<_, ClientFollowupNote>(
            r#"
            UPDATE client_followup_notes
            SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                tag = COALESCE($3, tag),
                file_url = COALESCE($4, file_url),
                updated_at = now(),
                updated_by_user_id = COALESCE($5, updated_by_user_id),
                updated_by_user_name = COALESCE($6, updated_by_user_name),
                updated_by_user_image = COALESCE($7, updated_by_user_image)
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(input.title)
        .bind(input.description)
        .bind(input.tag)
        .bind(input.file_url)
        .bind(input.updated_by_user_id)
        .bind(input.updated_by_user_name)
        .bind(input.updated_by_user_image)
        .bind(id)
        .fetch_optional(self.repo.pool())
        .await?;

        row.ok_or_else(not_found)
    }

    /// Notes carry no active flag, so "deleting" only re-stamps the update audit.
    pub async fn deactivate(&self, id: i64, actor: NoteActor) -> Result<ClientFollowupNote, DatabaseError> {
        let row = sqlx::query_as::<_, ClientFollowupNote>(
            r#"
            UPDATE client_followup_notes
            SET
                updated_at = now(),
                updated_by_user_id = COALESCE($1, updated_by_user_id),
                updated_by_user_name = COALESCE($2, updated_by_user_name),
                updated_by_user_image = COALESCE($3, updated_by_user_image)
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(actor.updated_by_user_id)
        .bind(actor.updated_by_user_name)
        .bind(actor.updated_by_user_image)
        .bind(id)
        .fetch_optional(self.repo.pool())
        .await?;

        row.ok_or_else(not_found)
    }
}

fn not_found() -> DatabaseError {
    DatabaseError::NotFound("Client followup note not found".to_string())
}
