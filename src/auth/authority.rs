use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::menu::Menu;

/// Authority granted to every admin user, regardless of role bindings.
pub const ADMIN_AUTHORITY: &str = "admin";

/// A permission token handed to the request-authorization layer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct GrantedAuthority(pub String);

impl GrantedAuthority {
    pub fn new(code: impl Into<String>) -> Self {
        GrantedAuthority(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Distinct, non-blank menu permissions, sorted.
pub fn from_menus<'a>(menus: impl IntoIterator<Item = &'a Menu>) -> Vec<GrantedAuthority> {
    menus
        .into_iter()
        .map(|m| m.permission.trim())
        .filter(|p| !p.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(GrantedAuthority::new)
        .collect()
}
