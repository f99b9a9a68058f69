pub mod filter;
pub mod queries;
pub mod types;

pub use filter::DictDetailQueryCriteria;
pub use queries::PgDictDetailRepository;
pub use types::{DictDetail, DictDetailForm};
