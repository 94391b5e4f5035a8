pub mod analytics;
pub mod auth;
pub mod centers;
pub mod groups;
pub mod submissions;
pub mod tasks;
pub mod users;

use actix_web::{HttpRequest, HttpResponse, web};
use std::sync::Arc;
use tracing::error;

use crate::config::AppConfig;
use crate::errors::{EduHubError, Result};
use crate::middlewares::{Operation, RequireJWT, authorize};
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode, FieldIssue};
use crate::utils::upload_filter::UploadRejection;

pub use analytics::AnalyticsService;
pub use auth::AuthService;
pub use centers::CenterService;
pub use groups::GroupService;
pub use submissions::SubmissionService;
pub use tasks::TaskService;
pub use users::UserService;

/// 从 app_data 中取出共享依赖
pub(crate) fn shared<T: ?Sized + 'static>(request: &HttpRequest, name: &str) -> Result<Arc<T>> {
    request
        .app_data::<web::Data<Arc<T>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| EduHubError::internal(format!("{name} not found in app data")))
}

/// 当前登录用户（由 RequireJWT 写入）
pub(crate) fn current_user(request: &HttpRequest) -> Result<User> {
    RequireJWT::extract_user_claims(request)
        .ok_or_else(|| EduHubError::authentication("Unable to resolve the current user"))
}

/// 当前用户，并按能力表检查角色
pub(crate) fn authorized_user(request: &HttpRequest, operation: Operation) -> Result<User> {
    let user = current_user(request)?;
    authorize(operation, user.role)?;
    Ok(user)
}

/// 领域错误转响应，错误码由错误类型推导
pub(crate) fn error_response(request: &HttpRequest, err: &EduHubError) -> HttpResponse {
    error_response_with_code(request, err, ErrorCode::from_error(err))
}

/// 领域错误转响应，使用指定的业务错误码
///
/// 内部错误记录请求上下文；生产环境只返回通用消息。
pub(crate) fn error_response_with_code(
    request: &HttpRequest,
    err: &EduHubError,
    code: ErrorCode,
) -> HttpResponse {
    let message = if err.is_internal() {
        let caller = RequireJWT::extract_user_claims(request);
        error!(
            "{} {} failed (user: {:?}, role: {:?}): {}",
            request.method(),
            request.path(),
            caller.as_ref().map(|u| u.id),
            caller.as_ref().map(|u| u.role),
            err
        );
        if AppConfig::get().is_production() {
            "Internal server error".to_string()
        } else {
            err.format_simple()
        }
    } else {
        err.message().to_string()
    };

    HttpResponse::build(err.http_status()).json(ApiResponse::error_empty(code, message))
}

/// 上传被过滤器拒绝
pub(crate) fn rejection_response(rejection: &UploadRejection) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::error_empty(
        rejection.error_code(),
        rejection.to_string(),
    ))
}

/// 字段级校验失败
pub(crate) fn validation_response(issues: Vec<FieldIssue>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::validation_failed(issues))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{body::to_bytes, http::StatusCode, test::TestRequest};

    #[actix_web::test]
    async fn test_domain_error_keeps_message_and_status() {
        let req = TestRequest::default().to_http_request();
        let resp = error_response(&req, &EduHubError::already_submitted("Already submitted"));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], ErrorCode::AlreadySubmitted as i32);
        assert_eq!(json["message"], "Already submitted");
    }

    #[actix_web::test]
    async fn test_rejection_uses_specific_code() {
        let resp = rejection_response(&UploadRejection::MultipleFiles);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], ErrorCode::MultifileUploadNotAllowed as i32);
    }

    #[actix_web::test]
    async fn test_validation_lists_fields() {
        let resp = validation_response(vec![FieldIssue::new("score", "bad")]);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["data"][0]["field"], "score");
    }

    #[test]
    fn test_missing_app_data_is_internal() {
        let req = TestRequest::default().to_http_request();
        let Err(err) = shared::<dyn crate::storage::Storage>(&req, "Storage") else {
            panic!("storage should be missing");
        };
        assert!(err.is_internal());
        assert!(current_user(&req).is_err());
    }
}
