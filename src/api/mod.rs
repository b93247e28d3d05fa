pub mod extract;
pub mod pagination;

pub use extract::{ApiPath, ApiQuery, ValidatedJson};
pub use pagination::{LeadQuery, PageQuery};
