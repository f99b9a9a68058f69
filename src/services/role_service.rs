//! Role lifecycle, menu bindings and authority derivation.
//!
//! Every method is one request against the repositories; multi-row writes are
//! atomic inside the repository, so the service holds no locks of its own.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::sync::Arc;

use crate::auth::authority::{self, ADMIN_AUTHORITY, GrantedAuthority};
use crate::errors::AppError;
use crate::models::menu::Menu;
use crate::models::page::{Page, Pageable};
use crate::models::role::{Role, RoleDto, RoleForm, RoleQueryCriteria, RoleSmallDto};
use crate::models::table_filter::{FilterTree, SortSpec};
use crate::models::user::UserDto;
use crate::repository::{RoleRepository, UserRepository};
use crate::services::export;

#[derive(Clone)]
pub struct RoleService {
    roles: Arc<dyn RoleRepository>,
    users: Arc<dyn UserRepository>,
}

impl RoleService {
    pub fn new(roles: Arc<dyn RoleRepository>, users: Arc<dyn UserRepository>) -> Self {
        RoleService { roles, users }
    }

    /// Attach bound menus to each role, with one menu query for the batch.
    async fn to_dtos(&self, roles: Vec<Role>) -> Result<Vec<RoleDto>, AppError> {
        if roles.is_empty() {
            return Ok(vec![]);
        }
        let ids: Vec<i64> = roles.iter().map(|r| r.id).collect();
        let mut by_role: BTreeMap<i64, Vec<Menu>> = BTreeMap::new();
        for (role_id, menu) in self.roles.find_menus(&ids).await? {
            by_role.entry(role_id).or_default().push(menu);
        }
        Ok(roles
            .into_iter()
            .map(|r| {
                let menus = by_role.remove(&r.id).unwrap_or_default();
                RoleDto::from_role(r, menus)
            })
            .collect())
    }

    async fn require_role(&self, id: i64) -> Result<Role, AppError> {
        self.roles
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Role", id))
    }

    pub async fn query_all(&self) -> Result<Vec<RoleDto>, AppError> {
        let roles = self.roles.find_all(&FilterTree::default(), &SortSpec::default()).await?;
        self.to_dtos(roles).await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<RoleDto, AppError> {
        let role = self.require_role(id).await?;
        let mut dtos = self.to_dtos(vec![role]).await?;
        dtos.pop().ok_or_else(|| AppError::not_found("Role", id))
    }

    pub async fn create(&self, form: &RoleForm) -> Result<i64, AppError> {
        let form = form.trimmed();
        let errors = form.validate();
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        if self.roles.find_by_name(&form.name).await?.is_some() {
            return Err(AppError::Conflict(format!("A role named '{}' already exists", form.name)));
        }
        let id = self.roles.create(&form).await?;
        log::info!("Created role '{}' (id={id}, level={})", form.name, form.level);
        Ok(id)
    }

    /// Update name, level, description and data scope. Menu bindings are untouched.
    pub async fn update(&self, id: i64, form: &RoleForm) -> Result<(), AppError> {
        let form = form.trimmed();
        let errors = form.validate();
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        self.require_role(id).await?;
        if let Some(other) = self.roles.find_by_name(&form.name).await? {
            if other.id != id {
                return Err(AppError::Conflict(format!("A role named '{}' already exists", form.name)));
            }
        }
        if !self.roles.update(id, &form).await? {
            return Err(AppError::not_found("Role", id));
        }
        log::info!("Updated role {id}");
        Ok(())
    }

    /// Delete roles after `verification`; nothing is removed if any is still held.
    pub async fn delete(&self, ids: &BTreeSet<i64>) -> Result<u64, AppError> {
        self.verification(ids).await?;
        let ids: Vec<i64> = ids.iter().copied().collect();
        let removed = self.roles.delete_all(&ids).await?;
        log::info!("Deleted {removed} role(s): {ids:?}");
        Ok(removed)
    }

    pub async fn find_by_users_id(&self, user_id: i64) -> Result<Vec<RoleSmallDto>, AppError> {
        let roles = self.roles.find_by_user_id(user_id).await?;
        Ok(roles.into_iter().map(RoleSmallDto::from).collect())
    }

    /// Most privileged (lowest) level among the given roles.
    pub async fn find_by_roles(&self, role_ids: &BTreeSet<i64>) -> Result<i32, AppError> {
        if role_ids.is_empty() {
            return Err(AppError::Validation(vec!["At least one role is required".to_string()]));
        }
        let ids: Vec<i64> = role_ids.iter().copied().collect();
        let roles = self.roles.find_by_ids(&ids).await?;
        if let Some(missing) = ids.iter().find(|id| !roles.iter().any(|r| r.id == **id)) {
            return Err(AppError::not_found("Role", *missing));
        }
        roles
            .iter()
            .map(|r| r.level)
            .min()
            .ok_or_else(|| AppError::Validation(vec!["At least one role is required".to_string()]))
    }

    /// Replace the whole menu set of a role.
    pub async fn update_menu(&self, id: i64, menu_ids: &BTreeSet<i64>) -> Result<(), AppError> {
        self.require_role(id).await?;
        let menu_ids: Vec<i64> = menu_ids.iter().copied().collect();
        self.roles.replace_menus(id, &menu_ids).await?;
        log::info!("Role {id} now bound to {} menu(s)", menu_ids.len());
        Ok(())
    }

    pub async fn untied_menu(&self, menu_id: i64) -> Result<u64, AppError> {
        let dropped = self.roles.untie_menu(menu_id).await?;
        log::info!("Menu {menu_id} untied from {dropped} role(s)");
        Ok(dropped)
    }

    pub async fn query_page(&self, criteria: &RoleQueryCriteria, pageable: &Pageable) -> Result<Page<RoleDto>, AppError> {
        let (roles, total) = self.roles.find_page(&criteria.to_filter(), pageable).await?;
        let content = self.to_dtos(roles).await?;
        Ok(Page::new(content, total, pageable))
    }

    pub async fn query_all_by(&self, criteria: &RoleQueryCriteria) -> Result<Vec<RoleDto>, AppError> {
        let roles = self.roles.find_all(&criteria.to_filter(), &SortSpec::default()).await?;
        self.to_dtos(roles).await
    }

    /// Serialize roles as CSV into `out`.
    pub fn download<W: Write>(&self, roles: &[RoleDto], out: &mut W) -> Result<(), AppError> {
        export::write_roles_csv(roles, out)?;
        Ok(())
    }

    /// Admins get `admin` alone; everyone else gets the permissions of the
    /// menus bound to their roles.
    pub async fn map_to_granted_authorities(&self, user: &UserDto) -> Result<Vec<GrantedAuthority>, AppError> {
        if user.is_admin {
            return Ok(vec![GrantedAuthority::new(ADMIN_AUTHORITY)]);
        }
        let role_ids = user.role_ids();
        if role_ids.is_empty() {
            return Ok(vec![]);
        }
        let menus = self.roles.find_menus(&role_ids).await?;
        Ok(authority::from_menus(menus.iter().map(|(_, m)| m)))
    }

    pub async fn authorities_for_user(&self, user_id: i64) -> Result<Vec<GrantedAuthority>, AppError> {
        let user = self
            .users
            .find_dto_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User", user_id))?;
        self.map_to_granted_authorities(&user).await
    }

    /// Fail with `Conflict` if any of the roles is still assigned to a user.
    pub async fn verification(&self, ids: &BTreeSet<i64>) -> Result<(), AppError> {
        if ids.is_empty() {
            return Ok(());
        }
        let ids: Vec<i64> = ids.iter().copied().collect();
        let held = self.roles.find_held_by_users(&ids).await?;
        if held.is_empty() {
            return Ok(());
        }
        let names: Vec<&str> = held.iter().map(|r| r.name.as_str()).collect();
        Err(AppError::Conflict(format!(
            "Role(s) still assigned to users, unassign them first: {}",
            names.join(", ")
        )))
    }

    pub async fn find_in_menu_id(&self, menu_ids: &[i64]) -> Result<Vec<Role>, AppError> {
        if menu_ids.is_empty() {
            return Ok(vec![]);
        }
        self.roles.find_in_menu_id(menu_ids).await
    }
}
