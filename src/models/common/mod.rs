pub mod pagination;
pub mod response;

pub use pagination::{PaginatedResponse, PaginationInfo, PaginationQuery};
pub use response::{ApiResponse, FieldIssue};
