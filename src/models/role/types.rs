use serde::{Deserialize, Serialize};

use crate::auth::validate;
use crate::models::menu::Menu;
use crate::models::table_filter::eval::Filterable;

/// How far a role's data visibility reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataScope {
    All,
    #[default]
    OwnLevel,
    Custom,
}

impl DataScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataScope::All => "all",
            DataScope::OwnLevel => "own_level",
            DataScope::Custom => "custom",
        }
    }
}

impl TryFrom<String> for DataScope {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "all" => Ok(DataScope::All),
            "own_level" => Ok(DataScope::OwnLevel),
            "custom" => Ok(DataScope::Custom),
            other => Err(format!("unknown data scope '{other}'")),
        }
    }
}

/// Role row as stored.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub level: i32,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub data_scope: DataScope,
    pub created_at: String,
    pub updated_at: String,
}

impl Filterable for Role {
    fn field_text(&self, key: &str) -> Option<String> {
        match key {
            "name" => Some(self.name.clone()),
            "description" => Some(self.description.clone()),
            "data_scope" => Some(self.data_scope.as_str().to_string()),
            "created_at" => Some(self.created_at.clone()),
            _ => None,
        }
    }
}

/// Full read model: role plus its bound menus.
#[derive(Debug, Clone, Serialize)]
pub struct RoleDto {
    pub id: i64,
    pub name: String,
    pub level: i32,
    pub description: String,
    pub data_scope: DataScope,
    pub menus: Vec<Menu>,
    pub created_at: String,
    pub updated_at: String,
}

impl RoleDto {
    pub fn from_role(role: Role, menus: Vec<Menu>) -> Self {
        RoleDto {
            id: role.id,
            name: role.name,
            level: role.level,
            description: role.description,
            data_scope: role.data_scope,
            menus,
            created_at: role.created_at,
            updated_at: role.updated_at,
        }
    }
}

/// Abbreviated read model used in user payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleSmallDto {
    pub id: i64,
    pub name: String,
    pub level: i32,
    pub data_scope: DataScope,
}

impl From<Role> for RoleSmallDto {
    fn from(r: Role) -> Self {
        RoleSmallDto { id: r.id, name: r.name, level: r.level, data_scope: r.data_scope }
    }
}

fn default_level() -> i32 {
    3
}

/// Create / update payload. `menus` is only read on create.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleForm {
    pub name: String,
    #[serde(default = "default_level")]
    pub level: i32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub data_scope: DataScope,
    #[serde(default)]
    pub menus: Vec<i64>,
}

impl RoleForm {
    pub fn new(name: &str, level: i32) -> Self {
        RoleForm {
            name: name.to_string(),
            level,
            description: String::new(),
            data_scope: DataScope::default(),
            menus: vec![],
        }
    }

    pub fn validate(&self) -> Vec<String> {
        let mut errors = vec![];
        errors.extend(validate::validate_role_name(&self.name));
        errors.extend(validate::validate_level(self.level));
        errors.extend(validate::validate_optional(&self.description, "Description", 255));
        errors
    }

    /// Copy with surrounding whitespace removed from the text fields.
    pub fn trimmed(&self) -> Self {
        RoleForm {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            ..self.clone()
        }
    }
}
