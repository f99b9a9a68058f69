//! Composable filter trees shared by every criteria query.
//!
//! A `FilterTree` is a root list of conditions plus one level of groups. The same
//! tree is rendered to a parameterised SQL fragment by [`builder`] for the
//! PostgreSQL repositories and evaluated directly by [`eval`] for the memory store.

use serde::{Deserialize, Serialize};

pub mod builder;
pub mod eval;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Logic { #[default] And, Or }

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: String,
    pub value: String,
}

impl Condition {
    pub fn new(field: &str, op: &str, value: impl Into<String>) -> Self {
        Condition { field: field.to_string(), op: op.to_string(), value: value.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Group {
    #[serde(default)]
    pub logic: Logic,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FilterTree {
    #[serde(default)]
    pub logic: Logic,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl FilterTree {
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.groups.iter().all(|g| g.conditions.is_empty())
    }

    /// Append a root-level condition.
    pub fn with(mut self, cond: Condition) -> Self {
        self.conditions.push(cond);
        self
    }

    /// Append a group; empty groups are dropped.
    pub fn with_group(mut self, logic: Logic, conditions: Vec<Condition>) -> Self {
        if !conditions.is_empty() {
            self.groups.push(Group { logic, conditions });
        }
        self
    }
}

/// Whitelisted columns and operators for one table.
///
/// Column expressions are hardcoded SQL, never user input.
#[derive(Debug, Clone, Copy)]
pub struct FieldSet {
    pub columns: &'static [(&'static str, &'static str)],
    pub ops: &'static [&'static str],
}

impl FieldSet {
    pub fn column(&self, key: &str) -> Option<&'static str> {
        self.columns.iter().find(|(k, _)| *k == key).map(|(_, col)| *col)
    }

    pub fn allows(&self, op: &str) -> bool {
        self.ops.contains(&op)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDir { #[default] Asc, Desc }

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SortSpec {
    pub column: String,
    pub dir: SortDir,
}

impl SortSpec {
    pub fn from_params(sort: Option<&str>, dir: Option<&str>) -> Self {
        SortSpec {
            column: sort.unwrap_or("").to_string(),
            dir: if dir == Some("desc") { SortDir::Desc } else { SortDir::Asc },
        }
    }

    pub fn sql_dir(&self) -> &'static str {
        match self.dir { SortDir::Asc => "ASC", SortDir::Desc => "DESC" }
    }
}
