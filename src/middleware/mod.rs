pub mod auth;
pub mod response;

pub use auth::{authenticate, require_user_role};
pub use response::{ApiResponse, ApiResult, JsonBody};
