use serde::Serialize;

/// A navigable permission unit. `permission` may be empty for pure containers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Menu {
    pub id: i64,
    pub title: String,
    pub permission: String,
}
