use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{CenterService, load_managed_center};
use crate::cache::user_cache_key;
use crate::errors::EduHubError;
use crate::middlewares::Operation;
use crate::models::centers::requests::AddCenterTeacherRequest;
use crate::models::users::{
    entities::{User, UserRole},
    responses::UserResponse,
};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{authorized_user, error_response, error_response_with_code};

/// 教师能否加入中心：必须是教师，且不属于其他中心
fn check_joinable(teacher: &User, center_id: i64) -> Result<(), EduHubError> {
    if teacher.role != UserRole::Teacher {
        return Err(EduHubError::validation(format!(
            "Only teachers can join a center (current role: '{}')",
            teacher.role
        )));
    }
    match teacher.center_id {
        Some(current) if current != center_id => Err(EduHubError::conflict(
            "Teacher already belongs to another center",
        )),
        _ => Ok(()),
    }
}

/// POST /centers/{id}/teachers
pub async fn add_center_teacher(
    service: &CenterService,
    request: &HttpRequest,
    center_id: i64,
    body: AddCenterTeacherRequest,
) -> ActixResult<HttpResponse> {
    let user = match authorized_user(request, Operation::AddCenterTeacher) {
        Ok(user) => user,
        Err(e) => return Ok(error_response(request, &e)),
    };
    let (storage, cache) = match service
        .get_storage(request)
        .and_then(|s| service.get_cache(request).map(|c| (s, c)))
    {
        Ok(pair) => pair,
        Err(e) => return Ok(error_response(request, &e)),
    };
    if let Err(resp) = load_managed_center(&storage, request, &user, center_id).await {
        return Ok(resp);
    }

    let email = body.teacher_email.trim().to_lowercase();
    let teacher = match storage.get_user_by_email(&email).await {
        Ok(Some(teacher)) => teacher,
        Ok(None) => {
            return Ok(error_response_with_code(
                request,
                &EduHubError::not_found("Teacher not found"),
                ErrorCode::UserNotFound,
            ));
        }
        Err(e) => return Ok(error_response(request, &e)),
    };
    if let Err(e) = check_joinable(&teacher, center_id) {
        return Ok(error_response(request, &e));
    }

    match storage
        .update_user_role(teacher.id, UserRole::Teacher, Some(center_id))
        .await
    {
        Ok(Some(teacher)) => {
            cache.remove(&user_cache_key(teacher.id)).await;
            info!("Teacher {} joined center {} (by user {})", teacher.id, center_id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                UserResponse { user: teacher },
                "Teacher added to center",
            )))
        }
        Ok(None) => Ok(error_response_with_code(
            request,
            &EduHubError::not_found("Teacher not found"),
            ErrorCode::UserNotFound,
        )),
        Err(e) => Ok(error_response(request, &e)),
    }
}
