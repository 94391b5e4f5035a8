use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use crate::errors::EduHubError;
use crate::models::{
    ApiResponse, ErrorCode,
    auth::{requests::RegisterRequest, responses::LoginResponse},
    users::entities::{NewUser, UserStatus},
};
use crate::services::{error_response, error_response_with_code, validation_response};
use crate::utils::jwt::JwtUtils;
use crate::utils::password::hash_password;
use crate::utils::validate::{FieldIssues, validate_email, validate_full_name, validate_password};

use super::AuthService;

pub async fn handle_register(
    service: &AuthService,
    register_request: RegisterRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let full_name = register_request.full_name.trim().to_string();
    let email = register_request.email.trim().to_lowercase();

    let mut issues = FieldIssues::new();
    issues
        .check("full_name", validate_full_name(&full_name))
        .check("email", validate_email(&email))
        .check("password", validate_password(&register_request.password))
        .check(
            "role",
            if register_request.role.is_self_assignable() {
                Ok(())
            } else {
                Err("Role must be student or teacher")
            },
        );
    if let Err(issues) = issues.into_result() {
        return Ok(validation_response(issues));
    }

    let storage = match service.get_storage(request) {
        Ok(storage) => storage,
        Err(e) => return Ok(error_response(request, &e)),
    };

    let password_hash = match hash_password(&register_request.password) {
        Ok(hash) => hash,
        Err(e) => return Ok(error_response(request, &e)),
    };

    // 邮箱唯一性由存储层唯一索引保证
    let new_user = NewUser {
        full_name,
        email,
        password_hash,
        role: register_request.role,
        status: UserStatus::Active,
    };
    let user = match storage.create_user(new_user).await {
        Ok(user) => user,
        Err(e @ EduHubError::Conflict(_)) => {
            return Ok(error_response_with_code(
                request,
                &e,
                ErrorCode::UserEmailAlreadyExists,
            ));
        }
        Err(e) => return Ok(error_response(request, &e)),
    };

    let access_token = match user.generate_access_token() {
        Ok(token) => token,
        Err(e) => return Ok(error_response(request, &e)),
    };

    info!("User {} registered as {}", user.id, user.role);

    let response = LoginResponse {
        access_token,
        expires_in: JwtUtils::access_token_ttl_secs(),
        user,
    };
    Ok(HttpResponse::Created().json(ApiResponse::success(response, "Registration successful")))
}
