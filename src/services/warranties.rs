use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::database::models::Warranty;
use crate::database::{DatabaseError, Repository};
use crate::error::{ApiError, FieldErrors};
use crate::filter::{Filter, FilterError, FilterOrderInfo, FilterWhere, Pagination};
use crate::types::{LooseString, Patch};

/// Most recently touched first; `id` keeps pages stable when timestamps tie.
pub fn warranty_order() -> Vec<FilterOrderInfo> {
    vec![
        FilterOrderInfo::desc("user_updated_date").or_else("user_created_date"),
        FilterOrderInfo::desc("user_created_date"),
        FilterOrderInfo::desc("id"),
    ]
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWarranty {
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub customer_identification: Option<LooseString>,
    pub customer_email: Option<String>,
    pub customer_cellphone: Option<String>,
    pub seller_id: Option<String>,
    pub seller_name: Option<String>,
    pub status: Option<String>,
    pub is_active: Option<bool>,
    pub products_relation_ids: Option<Vec<String>>,
    pub notes_relation_ids: Option<Vec<String>>,
    pub user_created_name: Option<String>,
    pub user_created_id: Option<String>,
    pub user_created_img: Option<String>,
}

impl CreateWarranty {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.require("customer_id", self.customer_id.as_deref());
        errors.require("customer_name", self.customer_name.as_deref());
        errors.require(
            "customer_identification",
            self.customer_identification.as_ref().map(|v| v.0.as_str()),
        );
        errors.require("seller_id", self.seller_id.as_deref());
        errors.require("seller_name", self.seller_name.as_deref());
        errors.require("status", self.status.as_deref());
        errors.require("user_created_name", self.user_created_name.as_deref());
        errors.require("user_created_id", self.user_created_id.as_deref());
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateWarranty {
    pub customer_name: Option<String>,
    pub customer_identification: Option<LooseString>,
    #[serde(default)]
    pub customer_email: Patch<String>,
    #[serde(default)]
    pub customer_cellphone: Patch<String>,
    pub seller_id: Option<String>,
    pub seller_name: Option<String>,
    pub status: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub products_relation_ids: Patch<Vec<String>>,
    #[serde(default)]
    pub notes_relation_ids: Patch<Vec<String>>,
    pub user_updated_name: Option<String>,
    pub user_updated_id: Option<String>,
    pub user_updated_img: Option<String>,
}

impl UpdateWarranty {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = FieldErrors::new();
        errors.require("user_updated_name", self.user_updated_name.as_deref());
        errors.require("user_updated_id", self.user_updated_id.as_deref());
        if let Some(status) = &self.status {
            errors.require("status", Some(status));
        }
        errors.into_result()
    }
}

/// Optional actor recorded by a soft delete.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WarrantyActor {
    pub user_updated_name: Option<String>,
    pub user_updated_id: Option<String>,
    pub user_updated_img: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WarrantyFilter {
    pub customer_name: Option<String>,
    pub customer_identification: Option<String>,
    pub seller_id: Option<String>,
    pub status: Option<String>,
    pub is_active: Option<bool>,
    pub date_start: Option<DateTime<Utc>>,
    pub date_end: Option<DateTime<Utc>>,
}

impl WarrantyFilter {
    pub fn to_filter(&self, pagination: Pagination) -> Result<Filter, FilterError> {
        let mut conditions = FilterWhere::new();
        conditions
            .contains("customer_name", self.customer_name.as_deref())
            .eq("customer_identification", self.customer_identification.as_deref())
            .eq("seller_id", self.seller_id.as_deref())
            .eq("status", self.status.as_deref())
            .eq("is_active", self.is_active)
            .gte("user_created_date", self.date_start)
            .lte("user_created_date", self.date_end);

        let mut filter = Filter::new(Warranty::TABLE)?;
        filter.where_clause(conditions).order(warranty_order()).paginate(pagination);
        Ok(filter)
    }
}

pub struct WarrantyService {
    repo: Repository<Warranty>,
}

impl WarrantyService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repo: Repository::new(Warranty::TABLE, pool),
        }
    }

    pub async fn get_paginated(
        &self,
        filter: &WarrantyFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Warranty>, i64), DatabaseError> {
        self.repo.paginate(filter.to_filter(pagination)?).await
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Warranty, DatabaseError> {
        self.repo.select_by_id(id).await?.ok_or_else(not_found)
    }

    /// Insert a new warranty. Callers run [`CreateWarranty::validate`] first.
    pub async fn create(&self, input: CreateWarranty) -> Result<Warranty, DatabaseError> {
        let row = sqlx::query_as::<_, Warranty>(
            r#"
            INSERT INTO warranties (
                customer_id, customer_name, customer_identification,
                customer_email, customer_cellphone,
                seller_id, seller_name, status, is_active,
                products_relation_ids, notes_relation_ids,
                user_created_date, user_created_name, user_created_id, user_created_img
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, now(), $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(input.customer_id)
        .bind(input.customer_name)
        .bind(input.customer_identification.map(String::from))
        .bind(input.customer_email)
        .bind(input.customer_cellphone)
        .bind(input.seller_id)
        .bind(input.seller_name)
        .bind(input.status)
        .bind(input.is_active.unwrap_or(true))
        .bind(input.products_relation_ids)
        .bind(input.notes_relation_ids)
        .bind(input.user_created_name)
        .bind(input.user_created_id)
        .bind(input.user_created_img)
        .fetch_one(self.repo.pool())
        .await?;

        info!("Created warranty {}", row.id);
        Ok(row)
    }

    /// Partial update. Update audit is always stamped; status audit only
    /// when the payload carries `status`.
    pub async fn update(&self, id: i64, input: UpdateWarranty) -> Result<Warranty, DatabaseError> {
        let is_status_update = input.status.is_some();
        let (email_set, email) = input.customer_email.into_bind();
        let (cellphone_set, cellphone) = input.customer_cellphone.into_bind();
        let (products_set, products) = input.products_relation_ids.into_bind();
        let (notes_set, notes) = input.notes_relation_ids.into_bind();

        let row = sqlx::query_as::<_, Warranty>(
            r#"
            UPDATE warranties
            SET
                customer_name = COALESCE($1, customer_name),
                customer_identification = COALESCE($2, customer_identification),
                customer_email = CASE WHEN $3 THEN $4 ELSE customer_email END,
                customer_cellphone = CASE WHEN $5 THEN $6 ELSE customer_cellphone END,
                seller_id = COALESCE($7, seller_id),
                seller_name = COALESCE($8, seller_name),
                status = COALESCE($9, status),
                is_active = COALESCE($10, is_active),
                products_relation_ids = CASE WHEN $11 THEN $12 ELSE products_relation_ids END,
                notes_relation_ids = CASE WHEN $13 THEN $14 ELSE notes_relation_ids END,
                user_updated_date = now(),
                user_updated_name = COALESCE($15, user_updated_name),
                user_updated_id = COALESCE($16, user_updated_id),
                user_updated_img = COALESCE($17, user_updated_img),
                user_updated_status_date = CASE WHEN $18 THEN now() ELSE user_updated_status_date END,
                user_updated_status_name = CASE WHEN $18 THEN $15 ELSE user_updated_status_name END,
                user_updated_status_id = CASE WHEN $18 THEN $16 ELSE user_updated_status_id END,
                user_updated_status_img = CASE WHEN $18 THEN $17 ELSE user_updated_status_img END
            WHERE id = $19
            RETURNING *
            "#,
        )
        .bind(input.customer_name)
        .bind(input.customer_identification.map(String::from))
        .bind(email_set)
        .bind(email)
        .bind(cellphone_set)
        .bind(cellphone)
        .bind(input.seller_id)
        .bind(input.seller_name)
        .bind(input.status)
        .bind(input.is_active)
        .bind(products_set)
        .bind(products)
        .bind(notes_set)
        .bind(notes)
        .bind(input.user_updated_name)
        .bind(input.user_updated_id)
        .bind(input.user_updated_img)
        .bind(is_status_update)
        .bind(id)
        .fetch_optional(self.repo.pool())
        .await?;

        row.ok_or_else(not_found)
    }

    /// Soft delete: flips `is_active` and stamps the update audit. Repeat
    /// calls succeed and keep the row inactive.
    pub async fn deactivate(&self, id: i64, actor: WarrantyActor) -> Result<Warranty, DatabaseError> {
        let row = sqlx::query_as::<_, Warranty>(
            r#"
            UPDATE warranties
            SET
                is_active = false,
                user_updated_date = now(),
                user_updated_name = COALESCE($1, user_updated_name),
                user_updated_id = COALESCE($2, user_updated_id),
                user_updated_img = COALESCE($3, user_updated_img)
            WHERE id = $4
            RETURNING *
            "#,
        )
        .bind(actor.user_updated_name)
        .bind(actor.user_updated_id)
        .bind(actor.user_updated_img)
        .bind(id)
        .fetch_optional(self.repo.pool())
        .await?;

        let row = row.ok_or_else(not_found)?;
        info!("Deactivated warranty {}", row.id);
        Ok(row)
    }
}

fn not_found() -> DatabaseError {
    DatabaseError::NotFound("Warranty not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn filter_fields_render_in_fixed_order() {
        let filter = WarrantyFilter {
            customer_name: Some("perez".into()),
            status: Some("open".into()),
            is_active: Some(true),
            date_start: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        let sql = filter.to_filter(Pagination { page: 1, limit: 20 }).unwrap().to_sql().unwrap();
        assert_eq!(
            sql.query,
            "SELECT * FROM \"warranties\" WHERE \"customer_name\" ILIKE $1 AND \"status\" = $2 \
             AND \"is_active\" = $3 AND \"user_created_date\" >= $4 \
             ORDER BY COALESCE(\"user_updated_date\", \"user_created_date\") DESC, \
             \"user_created_date\" DESC, \"id\" DESC LIMIT $5 OFFSET $6"
        );
        assert_eq!(sql.params.len(), 6);
    }

    #[test]
    fn create_requires_customer_seller_and_creator() {
        let input: CreateWarranty = serde_json::from_value(serde_json::json!({
            "customer_id": "c1",
            "customer_name": "Ana",
            "customer_identification": 123,
            "seller_id": "s1",
            "status": "open",
            "user_created_id": "u1",
        }))
        .unwrap();
        let err = input.validate().unwrap_err();
        let body = err.to_json();
        assert!(body["field_errors"]["seller_name"].is_string());
        assert!(body["field_errors"]["user_created_name"].is_string());
        assert!(body["field_errors"].get("customer_identification").is_none());
    }

    #[test]
    fn update_requires_actor() {
        let input: UpdateWarranty = serde_json::from_value(serde_json::json!({ "status": "closed" })).unwrap();
        assert!(input.validate().is_err());

        let input: UpdateWarranty = serde_json::from_value(serde_json::json!({
            "status": "closed",
            "user_updated_name": "Bob",
            "user_updated_id": "u2",
            "customer_email": null,
        }))
        .unwrap();
        assert!(input.validate().is_ok());
        assert_eq!(input.customer_email, Patch::Null);
        assert_eq!(input.notes_relation_ids, Patch::Missing);
    }
}
