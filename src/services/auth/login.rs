use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use crate::models::{
    ApiResponse, ErrorCode,
    auth::{requests::LoginRequest, responses::LoginResponse},
};
use crate::services::error_response;
use crate::utils::jwt::JwtUtils;
use crate::utils::password::verify_password;

use super::AuthService;

const INVALID_CREDENTIALS: &str = "Email or password is incorrect";

pub async fn handle_login(
    service: &AuthService,
    login_request: LoginRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = match service.get_storage(request) {
        Ok(storage) => storage,
        Err(e) => return Ok(error_response(request, &e)),
    };

    let email = login_request.email.trim().to_lowercase();

    // 1. 根据邮箱获取用户
    let user = match storage.get_user_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
                ErrorCode::AuthFailed,
                INVALID_CREDENTIALS,
            )));
        }
        Err(e) => return Ok(error_response(request, &e)),
    };

    // 2. 验证密码
    if !verify_password(&login_request.password, &user.password_hash) {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::AuthFailed,
            INVALID_CREDENTIALS,
        )));
    }

    if !user.is_active() {
        return Ok(HttpResponse::Unauthorized().json(ApiResponse::error_empty(
            ErrorCode::UserInactive,
            "User account is not active",
        )));
    }

    // 3. 更新最后登录时间
    if let Err(e) = storage.update_last_login(user.id).await {
        warn!("Failed to update last login for user {}: {}", user.id, e);
    }

    // 4. 签发访问令牌
    let access_token = match user.generate_access_token() {
        Ok(token) => token,
        Err(e) => return Ok(error_response(request, &e)),
    };

    info!("User {} logged in successfully", user.id);

    let response = LoginResponse {
        access_token,
        expires_in: JwtUtils::access_token_ttl_secs(),
        user,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Login successful")))
}
