use serde::Serialize;

use super::error::FilterError;
use crate::config::FilterConfig;

/// A validated `(page, limit)` pair. `page` is 1-based and `limit` has already
/// been clamped to the configured ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    /// Build from raw query-string values.
    ///
    /// Missing values fall back to page 1 and the configured default limit.
    /// A limit above the ceiling is clamped rather than rejected.
    pub fn from_query(page: Option<&str>, limit: Option<&str>, config: &FilterConfig) -> Result<Self, FilterError> {
        let page = match page.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|p| *p >= 1)
                .ok_or_else(|| FilterError::InvalidPage(format!("page must be a positive integer, got '{}'", raw)))?,
            None => 1,
        };

        let requested = match limit.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|l| *l >= 1)
                .ok_or_else(|| FilterError::InvalidLimit(format!("limit must be a positive integer, got '{}'", raw)))?,
            None => u64::from(config.default_limit),
        };

        Ok(Self::new(page, requested, config.max_limit))
    }

    pub fn new(page: u32, limit: u64, max_limit: u32) -> Self {
        let max_limit = max_limit.max(1);
        let limit = if limit > u64::from(max_limit) {
            tracing::warn!("Limit {} exceeds max {}, capping to max", limit, max_limit);
            max_limit
        } else {
            // fits: limit <= max_limit which is a u32
            limit as u32
        };
        Self { page: page.max(1), limit: limit.max(1) }
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }
}

/// Paging metadata reported next to a page of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub data_items: i64,
    pub page_current: u32,
    pub page_total: u32,
    pub have_next_page: bool,
    pub have_previus_page: bool,
}

impl PageInfo {
    pub fn new(pagination: Pagination, total: i64) -> Self {
        let total = total.max(0);
        if total == 0 {
            return Self {
                data_items: 0,
                page_current: 1,
                page_total: 0,
                have_next_page: false,
                have_previus_page: false,
            };
        }

        let limit = i64::from(pagination.limit);
        let page_total = u32::try_from((total + limit - 1) / limit).unwrap_or(u32::MAX);
        let page = pagination.page;
        Self {
            data_items: total,
            page_current: page,
            page_total,
            have_next_page: page < page_total,
            have_previus_page: page > 1,
        }
    }
}
