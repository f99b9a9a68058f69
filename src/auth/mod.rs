pub mod authority;
pub mod validate;
