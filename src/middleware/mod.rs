pub mod auth;
pub mod fallback;
pub mod response;

pub use auth::{jwt_auth_middleware, AuthUser};
pub use fallback::{json_method_not_allowed, not_found_fallback};
pub use response::{ApiResponse, ApiResult};
