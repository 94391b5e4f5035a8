use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::UserService;
use crate::cache::user_cache_key;
use crate::errors::EduHubError;
use crate::middlewares::Operation;
use crate::models::users::{
    entities::UserRole, requests::UpdateUserRoleRequest, responses::UserResponse,
};
use crate::models::{ApiResponse, ErrorCode, FieldIssue};
use crate::services::{
    authorized_user, centers::center_not_found, error_response, error_response_with_code,
    validation_response,
};

/// 唯一允许的角色变更：教师晋升为教育中心管理员
pub fn is_allowed_transition(from: UserRole, to: UserRole) -> bool {
    matches!((from, to), (UserRole::Teacher, UserRole::CenterAdmin))
}

/// 中心管理员必须指定所属中心
fn required_center(role: UserRole, center_id: Option<i64>) -> Result<Option<i64>, Vec<FieldIssue>> {
    match (role, center_id) {
        (UserRole::CenterAdmin, None) => Err(vec![FieldIssue::new(
            "center_id",
            "center_id is required when promoting to center_admin",
        )]),
        (_, center_id) => Ok(center_id),
    }
}

/// PUT /users/{id}/role
pub async fn update_user_role(
    service: &UserService,
    request: &HttpRequest,
    user_id: i64,
    body: UpdateUserRoleRequest,
) -> ActixResult<HttpResponse> {
    let admin = match authorized_user(request, Operation::ChangeUserRole) {
        Ok(admin) => admin,
        Err(e) => return Ok(error_response(request, &e)),
    };
    let (storage, cache) = match service
        .get_storage(request)
        .and_then(|s| service.get_cache(request).map(|c| (s, c)))
    {
        Ok(pair) => pair,
        Err(e) => return Ok(error_response(request, &e)),
    };

    let target = match storage.get_user_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(error_response_with_code(
                request,
                &EduHubError::not_found("User not found"),
                ErrorCode::UserNotFound,
            ));
        }
        Err(e) => return Ok(error_response(request, &e)),
    };

    if !is_allowed_transition(target.role, body.role) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::RoleTransitionInvalid,
            format!(
                "Cannot change role from '{}' to '{}'",
                target.role, body.role
            ),
        )));
    }

    let center_id = match required_center(body.role, body.center_id) {
        Ok(center_id) => center_id,
        Err(issues) => return Ok(validation_response(issues)),
    };
    if let Some(center_id) = center_id {
        match storage.get_center_by_id(center_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return Ok(center_not_found(request)),
            Err(e) => return Ok(error_response(request, &e)),
        }
    }

    match storage
        .update_user_role(user_id, body.role, center_id)
        .await
    {
        Ok(Some(user)) => {
            cache.remove(&user_cache_key(user_id)).await;
            info!(
                "User {} promoted to {} by admin {}",
                user_id, user.role, admin.id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                UserResponse { user },
                "Role updated successfully",
            )))
        }
        Ok(None) => Ok(error_response_with_code(
            request,
            &EduHubError::not_found("User not found"),
            ErrorCode::UserNotFound,
        )),
        Err(e) => Ok(error_response(request, &e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_teacher_to_center_admin() {
        assert!(is_allowed_transition(UserRole::Teacher, UserRole::CenterAdmin));
        assert!(!is_allowed_transition(UserRole::Student, UserRole::CenterAdmin));
        assert!(!is_allowed_transition(UserRole::Student, UserRole::Teacher));
        assert!(!is_allowed_transition(UserRole::Teacher, UserRole::SuperAdmin));
        assert!(!is_allowed_transition(UserRole::CenterAdmin, UserRole::Teacher));
    }

    #[test]
    fn test_center_admin_needs_center() {
        let issues = required_center(UserRole::CenterAdmin, None).unwrap_err();
        assert_eq!(issues[0].field, "center_id");
        assert_eq!(required_center(UserRole::CenterAdmin, Some(2)).unwrap(), Some(2));
    }
}
