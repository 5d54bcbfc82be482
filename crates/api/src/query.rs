//! Query parameter types shared by list handlers.

use serde::Deserialize;

/// Pagination parameters (`?limit=&offset=`).
///
/// Handlers clamp the values with `clamp_limit` / `clamp_offset` before
/// they reach the repository.
#[derive(Debug, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
