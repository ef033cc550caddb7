pub mod auth;
pub mod response;

pub use auth::{authenticate, extract_bearer_token};
pub use response::{ApiResponse, ApiResult};
