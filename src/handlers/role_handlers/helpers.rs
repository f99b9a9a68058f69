use serde::Deserialize;
use std::collections::BTreeSet;

use crate::errors::AppError;

/// `?ids=1,2,3`
#[derive(Debug, Deserialize)]
pub struct IdsQuery {
    #[serde(default)]
    pub ids: String,
}

/// Parse a comma-separated id list. Blank entries are skipped, duplicates merged.
pub fn parse_ids(raw: &str) -> Result<BTreeSet<i64>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<i64>()
                .map_err(|_| AppError::BadRequest(format!("Invalid id '{s}'")))
        })
        .collect()
}
