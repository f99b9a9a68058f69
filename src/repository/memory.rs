//! In-process store implementing every repository trait.
//!
//! Mirrors the PostgreSQL schema: the same uniqueness and restrict rules, the
//! same default ordering, and filters evaluated with the same field sets.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

use super::{DictDetailRepository, RoleRepository, UserRepository};
use crate::errors::AppError;
use crate::models::dict_detail::{self, DictDetail, DictDetailForm};
use crate::models::menu::Menu;
use crate::models::page::Pageable;
use crate::models::role::{self, Role, RoleForm, RoleSmallDto};
use crate::models::table_filter::{FilterTree, SortDir, SortSpec, eval};
use crate::models::user::{User, UserDto};

#[derive(Default)]
struct State {
    next_id: i64,
    roles: BTreeMap<i64, Role>,
    menus: BTreeMap<i64, Menu>,
    users: BTreeMap<i64, User>,
    /// (user_id, role_id)
    users_roles: BTreeSet<(i64, i64)>,
    /// (role_id, menu_id)
    roles_menus: BTreeSet<(i64, i64)>,
    dict_details: BTreeMap<i64, DictDetail>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn role_held(&self, role_id: i64) -> bool {
        self.users_roles.iter().any(|(_, r)| *r == role_id)
    }

    fn name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.roles.values().any(|r| r.name == name && Some(r.id) != except)
    }

    fn bind_menus(&mut self, role_id: i64, menu_ids: &[i64]) {
        for menu_id in menu_ids {
            if self.menus.contains_key(menu_id) {
                self.roles_menus.insert((role_id, *menu_id));
            }
        }
    }
}

fn now() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn sort_roles(roles: &mut [Role], sort: &SortSpec) {
    roles.sort_by(|a, b| {
        let primary = match role::filter::sort_col(&sort.column) {
            "r.name" => a.name.cmp(&b.name),
            "r.created_at" => a.created_at.cmp(&b.created_at),
            "r.updated_at" => a.updated_at.cmp(&b.updated_at),
            _ => a.level.cmp(&b.level),
        };
        let primary = if sort.dir == SortDir::Desc { primary.reverse() } else { primary };
        primary.then(a.id.cmp(&b.id))
    });
}

fn page_of<T: Clone>(items: &[T], pageable: &Pageable) -> Vec<T> {
    let offset = usize::try_from(pageable.offset()).unwrap_or(usize::MAX);
    let size = usize::try_from(pageable.size).unwrap_or(0);
    items.iter().skip(offset).take(size).cloned().collect()
}

fn conflict_name(name: &str) -> AppError {
    AppError::Conflict(format!("A role named '{name}' already exists"))
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_menu(&self, title: &str, permission: &str) -> i64 {
        let mut st = self.state.write().await;
        let id = st.next_id();
        st.menus.insert(id, Menu { id, title: title.to_string(), permission: permission.to_string() });
        id
    }

    pub async fn add_user(&self, username: &str, is_admin: bool) -> i64 {
        let mut st = self.state.write().await;
        let id = st.next_id();
        st.users.insert(id, User { id, username: username.to_string(), is_admin });
        id
    }

    /// Assign a role to a user. Unknown ids are a `NotFound`.
    pub async fn assign_role(&self, user_id: i64, role_id: i64) -> Result<(), AppError> {
        let mut st = self.state.write().await;
        if !st.users.contains_key(&user_id) {
            return Err(AppError::not_found("User", user_id));
        }
        if !st.roles.contains_key(&role_id) {
            return Err(AppError::not_found("Role", role_id));
        }
        st.users_roles.insert((user_id, role_id));
        Ok(())
    }

    pub async fn unassign_role(&self, user_id: i64, role_id: i64) {
        self.state.write().await.users_roles.remove(&(user_id, role_id));
    }

    /// Same demo data `db::seed_demo` loads into PostgreSQL.
    pub async fn with_demo_data() -> Result<Self, AppError> {
        let store = MemoryStore::new();
        let mut all_menus = vec![store.add_menu("System", "").await];
        let mut operator_menus = vec![];
        for (title, permission) in [
            ("Users", "user:list"),
            ("Roles", "roles:list"),
            ("Add role", "roles:add"),
            ("Edit role", "roles:edit"),
            ("Delete role", "roles:del"),
            ("Dictionaries", "dict:list"),
        ] {
            let id = store.add_menu(title, permission).await;
            all_menus.push(id);
            if matches!(permission, "user:list" | "roles:list" | "dict:list") {
                operator_menus.push(id);
            }
        }

        let admin_role = RoleRepository::create(&store, &RoleForm {
            description: "Full access".to_string(),
            data_scope: role::DataScope::All,
            menus: all_menus,
            ..RoleForm::new("admin", 1)
        }).await?;
        let operator_role = RoleRepository::create(&store, &RoleForm {
            description: "Day-to-day administration".to_string(),
            menus: operator_menus,
            ..RoleForm::new("operator", 2)
        }).await?;

        let admin = store.add_user("admin", true).await;
        let alice = store.add_user("alice", false).await;
        store.assign_role(admin, admin_role).await?;
        store.assign_role(alice, operator_role).await?;

        store.create_detail(&DictDetailForm { dict_sort: 1, ..DictDetailForm::new("user_status", "Active", "true") }).await?;
        store.create_detail(&DictDetailForm { dict_sort: 2, ..DictDetailForm::new("user_status", "Disabled", "false") }).await?;
        Ok(store)
    }

    async fn create_detail(&self, form: &DictDetailForm) -> Result<i64, AppError> {
        DictDetailRepository::create(self, form).await
    }

    async fn filtered_roles(&self, tree: &FilterTree, sort: &SortSpec) -> Result<Vec<Role>, AppError> {
        let st = self.state.read().await;
        let mut roles = vec![];
        for r in st.roles.values() {
            if eval::matches(tree, &role::filter::FIELDS, r)? {
                roles.push(r.clone());
            }
        }
        sort_roles(&mut roles, sort);
        Ok(roles)
    }

    async fn filtered_details(&self, tree: &FilterTree) -> Result<Vec<DictDetail>, AppError> {
        let st = self.state.read().await;
        let mut details = vec![];
        for d in st.dict_details.values() {
            if eval::matches(tree, &dict_detail::filter::FIELDS, d)? {
                details.push(d.clone());
            }
        }
        details.sort_by(|a, b| a.dict_sort.cmp(&b.dict_sort).then(a.id.cmp(&b.id)));
        Ok(details)
    }
}

fn by_level(mut roles: Vec<Role>) -> Vec<Role> {
    sort_roles(&mut roles, &SortSpec::default());
    roles
}

#[async_trait]
impl RoleRepository for MemoryStore {
    async fn find_all(&self, filter: &FilterTree, sort: &SortSpec) -> Result<Vec<Role>, AppError> {
        self.filtered_roles(filter, sort).await
    }

    async fn find_page(&self, filter: &FilterTree, pageable: &Pageable) -> Result<(Vec<Role>, i64), AppError> {
        let all = self.filtered_roles(filter, &pageable.sort).await?;
        let total = all.len() as i64;
        Ok((page_of(&all, pageable), total))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Role>, AppError> {
        Ok(self.state.read().await.roles.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Role>, AppError> {
        let st = self.state.read().await;
        let roles = st.roles.values().filter(|r| ids.contains(&r.id)).cloned().collect();
        Ok(by_level(roles))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        let st = self.state.read().await;
        Ok(st.roles.values().find(|r| r.name == name).cloned())
    }

    async fn create(&self, form: &RoleForm) -> Result<i64, AppError> {
        let mut st = self.state.write().await;
        if st.name_taken(&form.name, None) {
            return Err(conflict_name(&form.name));
        }
        let id = st.next_id();
        let ts = now();
        st.roles.insert(id, Role {
            id,
            name: form.name.clone(),
            level: form.level,
            description: form.description.clone(),
            data_scope: form.data_scope,
            created_at: ts.clone(),
            updated_at: ts,
        });
        st.bind_menus(id, &form.menus);
        Ok(id)
    }

    async fn update(&self, id: i64, form: &RoleForm) -> Result<bool, AppError> {
        let mut st = self.state.write().await;
        if !st.roles.contains_key(&id) {
            return Ok(false);
        }
        if st.name_taken(&form.name, Some(id)) {
            return Err(conflict_name(&form.name));
        }
        if let Some(r) = st.roles.get_mut(&id) {
            r.name = form.name.clone();
            r.level = form.level;
            r.description = form.description.clone();
            r.data_scope = form.data_scope;
            r.updated_at = now();
        }
        Ok(true)
    }

    async fn delete_all(&self, ids: &[i64]) -> Result<u64, AppError> {
        let mut st = self.state.write().await;
        if ids.iter().any(|id| st.role_held(*id)) {
            return Err(AppError::Conflict("Role is still assigned to users".to_string()));
        }
        let mut removed = 0;
        for id in ids {
            if st.roles.remove(id).is_some() {
                removed += 1;
            }
        }
        st.roles_menus.retain(|(role_id, _)| !ids.contains(role_id));
        Ok(removed)
    }

    async fn find_by_user_id(&self, user_id: i64) -> Result<Vec<Role>, AppError> {
        let st = self.state.read().await;
        let roles = st
            .users_roles
            .iter()
            .filter(|(u, _)| *u == user_id)
            .filter_map(|(_, r)| st.roles.get(r).cloned())
            .collect();
        Ok(by_level(roles))
    }

    async fn find_held_by_users(&self, ids: &[i64]) -> Result<Vec<Role>, AppError> {
        let st = self.state.read().await;
        let roles = st
            .roles
            .values()
            .filter(|r| ids.contains(&r.id) && st.role_held(r.id))
            .cloned()
            .collect();
        Ok(by_level(roles))
    }

    async fn find_menus(&self, role_ids: &[i64]) -> Result<Vec<(i64, Menu)>, AppError> {
        let st = self.state.read().await;
        Ok(st
            .roles_menus
            .iter()
            .filter(|(r, _)| role_ids.contains(r))
            .filter_map(|(r, m)| st.menus.get(m).map(|menu| (*r, menu.clone())))
            .collect())
    }

    async fn replace_menus(&self, role_id: i64, menu_ids: &[i64]) -> Result<(), AppError> {
        let mut st = self.state.write().await;
        st.roles_menus.retain(|(r, _)| *r != role_id);
        st.bind_menus(role_id, menu_ids);
        if let Some(r) = st.roles.get_mut(&role_id) {
            r.updated_at = now();
        }
        Ok(())
    }

    async fn untie_menu(&self, menu_id: i64) -> Result<u64, AppError> {
        let mut st = self.state.write().await;
        let before = st.roles_menus.len();
        st.roles_menus.retain(|(_, m)| *m != menu_id);
        Ok((before - st.roles_menus.len()) as u64)
    }

    async fn find_in_menu_id(&self, menu_ids: &[i64]) -> Result<Vec<Role>, AppError> {
        let st = self.state.read().await;
        let role_ids: BTreeSet<i64> = st
            .roles_menus
            .iter()
            .filter(|(_, m)| menu_ids.contains(m))
            .map(|(r, _)| *r)
            .collect();
        let roles = role_ids.iter().filter_map(|id| st.roles.get(id).cloned()).collect();
        Ok(by_level(roles))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_dto_by_id(&self, id: i64) -> Result<Option<UserDto>, AppError> {
        let user = self.state.read().await.users.get(&id).cloned();
        let Some(user) = user else {
            return Ok(None);
        };
        let roles = self
            .find_by_user_id(id)
            .await?
            .into_iter()
            .map(RoleSmallDto::from)
            .collect();
        Ok(Some(UserDto::from_user(user, roles)))
    }
}

#[async_trait]
impl DictDetailRepository for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<DictDetail>, AppError> {
        Ok(self.state.read().await.dict_details.get(&id).cloned())
    }

    async fn find_all(&self, filter: &FilterTree) -> Result<Vec<DictDetail>, AppError> {
        self.filtered_details(filter).await
    }

    async fn find_page(&self, filter: &FilterTree, pageable: &Pageable) -> Result<(Vec<DictDetail>, i64), AppError> {
        let all = self.filtered_details(filter).await?;
        let total = all.len() as i64;
        Ok((page_of(&all, pageable), total))
    }

    async fn create(&self, form: &DictDetailForm) -> Result<i64, AppError> {
        let mut st = self.state.write().await;
        let id = st.next_id();
        st.dict_details.insert(id, DictDetail {
            id,
            dict_name: form.dict_name.clone(),
            label: form.label.clone(),
            value: form.value.clone(),
            dict_sort: form.dict_sort,
        });
        Ok(id)
    }

    async fn update(&self, id: i64, form: &DictDetailForm) -> Result<bool, AppError> {
        let mut st = self.state.write().await;
        match st.dict_details.get_mut(&id) {
            Some(d) => {
                d.dict_name = form.dict_name.clone();
                d.label = form.label.clone();
                d.value = form.value.clone();
                d.dict_sort = form.dict_sort;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.state.write().await.dict_details.remove(&id).is_some())
    }

    async fn find_by_dict_name(&self, name: &str) -> Result<Vec<DictDetail>, AppError> {
        self.filtered_details(&dict_detail::DictDetailQueryCriteria::by_dict_name(name).to_filter()).await
    }
}
