pub mod dict_detail;
pub mod menu;
pub mod page;
pub mod role;
pub mod table_filter;
pub mod user;
