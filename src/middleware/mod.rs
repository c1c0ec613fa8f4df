pub mod auth;
pub mod rate_limit;
pub mod response;

pub use auth::{authenticate_token, optional_auth, require_admin, AuthUser};
pub use rate_limit::{client_ip, rate_limit_middleware, RateLimiter};
pub use response::{ApiResponse, ApiResult, Pagination};
