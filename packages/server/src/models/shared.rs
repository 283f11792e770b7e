use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::PaginationConfig;
use crate::error::AppError;

/// Pagination metadata included in list responses.
#[derive(Serialize, utoipa::ToSchema)]
pub struct Pagination {
    /// Current page number (1-based).
    #[schema(example = 1)]
    pub page: u64,
    /// Number of items per page.
    #[schema(example = 6)]
    pub per_page: u64,
    /// Total number of matching items across all pages.
    #[schema(example = 47)]
    pub total: u64,
    /// Total number of pages.
    #[schema(example = 8)]
    pub total_pages: u64,
}

impl Pagination {
    pub fn of(window: PageWindow, total: u64) -> Self {
        Self::new(window.page, window.per_page, total)
    }

    pub fn new(page: u64, per_page: u64, total: u64) -> Self {
        Self {
            page,
            per_page,
            total,
            total_pages: total.div_ceil(per_page),
        }
    }
}

/// Common `page` / `limit` query parameters.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Page number (1-based). Default: 1.
    pub page: Option<u64>,
    /// Items per page. Default and maximum come from configuration.
    pub limit: Option<u64>,
}

/// A resolved page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub per_page: u64,
    /// Rows to skip. Always fits a Postgres `bigint`.
    pub offset: u64,
}

/// Resolve raw `page` / `limit` parameters into a clamped window.
///
/// Pages whose offset would not fit a signed 64-bit integer are rejected.
pub fn resolve_page(
    page: Option<u64>,
    limit: Option<u64>,
    cfg: &PaginationConfig,
) -> Result<PageWindow, AppError> {
    let page = Ord::max(page.unwrap_or(1), 1);
    let per_page = limit
        .unwrap_or(cfg.default_limit)
        .clamp(1, cfg.max_limit.max(1));
    let offset = page
        .saturating_sub(1)
        .checked_mul(per_page)
        .filter(|offset| i64::try_from(*offset).is_ok())
        .ok_or_else(|| AppError::Validation("page is out of range".into()))?;
    Ok(PageWindow {
        page,
        per_page,
        offset,
    })
}

/// Escape LIKE wildcard characters in a search string.
pub fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Validate a trimmed string field against a maximum length in characters.
pub fn validate_text_field(value: &str, field: &str, max: usize) -> Result<(), AppError> {
    let value = value.trim();
    if value.is_empty() || value.chars().count() > max {
        return Err(AppError::Validation(format!(
            "{field} must be 1-{max} characters"
        )));
    }
    Ok(())
}

/// De-duplicate ids, keeping the order of first appearance.
pub fn dedup_ids(ids: &[i32]) -> Vec<i32> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
