pub mod capability;
pub mod require_jwt;
pub mod require_role;

use actix_web::{HttpResponse, http::StatusCode};

use crate::models::{ApiResponse, ErrorCode};

pub use capability::{Operation, authorize};
pub use require_jwt::RequireJWT;
pub use require_role::RequireRole;

/// 中间件中使用的统一错误响应
pub fn create_error_response(status: StatusCode, code: ErrorCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(ApiResponse::<()>::error_empty(code, message))
}
