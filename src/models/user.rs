pub mod queries;
pub mod types;

pub use queries::PgUserRepository;
pub use types::{User, UserDto};
