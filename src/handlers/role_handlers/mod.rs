pub mod crud;
pub mod helpers;
pub mod list;
pub mod menus;
