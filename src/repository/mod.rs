//! Data-access seams.
//!
//! Every store implements these traits: PostgreSQL through the `Pg*Repository`
//! types under `models::*::queries`, and [`memory::MemoryStore`] in process.

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::dict_detail::{DictDetail, DictDetailForm};
use crate::models::menu::Menu;
use crate::models::page::Pageable;
use crate::models::role::{Role, RoleForm};
use crate::models::table_filter::{FilterTree, SortSpec};
use crate::models::user::UserDto;

pub mod memory;

#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// All roles matching `filter`, in `sort` order (level, then id, by default).
    async fn find_all(&self, filter: &FilterTree, sort: &SortSpec) -> Result<Vec<Role>, AppError>;

    /// One page of roles matching `filter` plus the total match count.
    async fn find_page(&self, filter: &FilterTree, pageable: &Pageable) -> Result<(Vec<Role>, i64), AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Role>, AppError>;

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Role>, AppError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AppError>;

    /// Insert a role and bind `form.menus`; unknown menu ids are skipped.
    async fn create(&self, form: &RoleForm) -> Result<i64, AppError>;

    /// Update scalar fields. Returns false when the role does not exist.
    async fn update(&self, id: i64, form: &RoleForm) -> Result<bool, AppError>;

    /// Delete roles and their menu bindings. Fails with `Conflict` if a user
    /// still holds one of them.
    async fn delete_all(&self, ids: &[i64]) -> Result<u64, AppError>;

    async fn find_by_user_id(&self, user_id: i64) -> Result<Vec<Role>, AppError>;

    /// The subset of `ids` held by at least one user.
    async fn find_held_by_users(&self, ids: &[i64]) -> Result<Vec<Role>, AppError>;

    /// `(role_id, menu)` pairs for every binding of the given roles.
    async fn find_menus(&self, role_ids: &[i64]) -> Result<Vec<(i64, Menu)>, AppError>;

    /// Replace every menu binding of a role; unknown menu ids are skipped.
    async fn replace_menus(&self, role_id: i64, menu_ids: &[i64]) -> Result<(), AppError>;

    /// Remove one menu from every role. Returns the number of bindings dropped.
    async fn untie_menu(&self, menu_id: i64) -> Result<u64, AppError>;

    /// Roles bound to at least one of the given menus, each once.
    async fn find_in_menu_id(&self, menu_ids: &[i64]) -> Result<Vec<Role>, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_dto_by_id(&self, id: i64) -> Result<Option<UserDto>, AppError>;
}

#[async_trait]
pub trait DictDetailRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<DictDetail>, AppError>;

    async fn find_all(&self, filter: &FilterTree) -> Result<Vec<DictDetail>, AppError>;

    async fn find_page(&self, filter: &FilterTree, pageable: &Pageable) -> Result<(Vec<DictDetail>, i64), AppError>;

    /// Insert a detail, creating its dictionary on first use.
    async fn create(&self, form: &DictDetailForm) -> Result<i64, AppError>;

    async fn update(&self, id: i64, form: &DictDetailForm) -> Result<bool, AppError>;

    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Every detail of the named dictionary, and none other.
    async fn find_by_dict_name(&self, name: &str) -> Result<Vec<DictDetail>, AppError>;
}
