// src/models/role/filter.rs
use serde::Deserialize;

use crate::models::table_filter::{Condition, FieldSet, FilterTree, Logic};

/// SQL column expressions for each role filter field.
pub const FIELDS: FieldSet = FieldSet {
    columns: &[
        ("name",        "r.name"),
        ("description", "r.description"),
        ("data_scope",  "r.data_scope"),
        ("created_at",  "to_char(r.created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD HH24:MI:SS')"),
    ],
    ops: &["contains", "not_contains", "equals", "not_equals", "starts_with", "before", "after", "on"],
};

/// Allowed sort column keys and their SQL expressions. Unknown keys sort by level.
pub fn sort_col(key: &str) -> &'static str {
    match key {
        "name"       => "r.name",
        "created_at" => "r.created_at",
        "updated_at" => "r.updated_at",
        _            => "r.level",
    }
}

/// Role listing filter as sent by the admin UI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleQueryCriteria {
    /// Fuzzy match on name or description.
    pub blurry: Option<String>,
    /// Only roles created strictly after this timestamp prefix.
    pub created_from: Option<String>,
    /// Only roles created strictly before this timestamp prefix.
    pub created_to: Option<String>,
}

impl RoleQueryCriteria {
    pub fn to_filter(&self) -> FilterTree {
        let mut tree = FilterTree::default();
        if let Some(from) = non_blank(&self.created_from) {
            tree = tree.with(Condition::new("created_at", "after", from));
        }
        if let Some(to) = non_blank(&self.created_to) {
            tree = tree.with(Condition::new("created_at", "before", to));
        }
        if let Some(blurry) = non_blank(&self.blurry) {
            tree = tree.with_group(Logic::Or, vec![
                Condition::new("name", "contains", blurry),
                Condition::new("description", "contains", blurry),
            ]);
        }
        tree
    }
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
