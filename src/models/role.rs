pub mod filter;
pub mod queries;
pub mod types;

pub use filter::RoleQueryCriteria;
pub use queries::PgRoleRepository;
pub use types::{DataScope, Role, RoleDto, RoleForm, RoleSmallDto};
