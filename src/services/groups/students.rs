use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{GroupService, group_response, load_managed_group};
use crate::errors::EduHubError;
use crate::middlewares::Operation;
use crate::models::groups::requests::AddGroupStudentRequest;
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{
    authorized_user, error_response, error_response_with_code, validation_response,
};

/// 加入小组失败时的业务错误码
fn join_error_code(err: &EduHubError) -> ErrorCode {
    match err {
        EduHubError::CapacityExceeded(_) => ErrorCode::GroupFull,
        EduHubError::Conflict(_) => ErrorCode::AlreadyGroupMember,
        EduHubError::NotFound(_) => ErrorCode::GroupNotFound,
        other => ErrorCode::from_error(other),
    }
}

/// POST /groups/{id}/students
pub async fn add_group_student(
    service: &GroupService,
    request: &HttpRequest,
    group_id: i64,
    body: AddGroupStudentRequest,
) -> ActixResult<HttpResponse> {
    let user = match authorized_user(request, Operation::ManageGroupStudents) {
        Ok(user) => user,
        Err(e) => return Ok(error_response(request, &e)),
    };
    let email = match body.normalized_email() {
        Ok(email) => email,
        Err(issues) => return Ok(validation_response(issues)),
    };
    let storage = match service.get_storage(request) {
        Ok(storage) => storage,
        Err(e) => return Ok(error_response(request, &e)),
    };
    if let Err(resp) = load_managed_group(&storage, request, &user, group_id).await {
        return Ok(resp);
    }

    let student = match storage.get_user_by_email(&email).await {
        Ok(Some(student)) if student.role == UserRole::Student => student,
        Ok(Some(_)) => {
            return Ok(error_response(
                request,
                &EduHubError::validation("Only students can join a group"),
            ));
        }
        Ok(None) => {
            return Ok(error_response_with_code(
                request,
                &EduHubError::not_found("Student not found"),
                ErrorCode::UserNotFound,
            ));
        }
        Err(e) => return Ok(error_response(request, &e)),
    };

    let group = match storage.add_group_student(group_id, student.id).await {
        Ok(group) => group,
        Err(e) => return Ok(error_response_with_code(request, &e, join_error_code(&e))),
    };
    info!(
        "Student {} added to group {} ({}/{}) by user {}",
        student.id, group_id, group.current_students, group.max_students, user.id
    );

    match group_response(&storage, group, true).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Student added to group",
        ))),
        Err(e) => Ok(error_response(request, &e)),
    }
}

/// DELETE /groups/{id}/students/{student_id}
pub async fn remove_group_student(
    service: &GroupService,
    request: &HttpRequest,
    group_id: i64,
    student_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match authorized_user(request, Operation::ManageGroupStudents) {
        Ok(user) => user,
        Err(e) => return Ok(error_response(request, &e)),
    };
    let storage = match service.get_storage(request) {
        Ok(storage) => storage,
        Err(e) => return Ok(error_response(request, &e)),
    };
    if let Err(resp) = load_managed_group(&storage, request, &user, group_id).await {
        return Ok(resp);
    }

    let group = match storage.remove_group_student(group_id, student_id).await {
        Ok(Some(group)) => group,
        Ok(None) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::NotGroupMember,
                "Student is not a member of this group",
            )));
        }
        Err(e) => return Ok(error_response(request, &e)),
    };
    info!("Student {} removed from group {} by user {}", student_id, group_id, user.id);

    match group_response(&storage, group, true).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Student removed from group",
        ))),
        Err(e) => Ok(error_response(request, &e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_errors_map_to_group_codes() {
        assert_eq!(
            join_error_code(&EduHubError::capacity_exceeded("Group is full")),
            ErrorCode::GroupFull
        );
        assert_eq!(
            join_error_code(&EduHubError::conflict("Student is already in this group")),
            ErrorCode::AlreadyGroupMember
        );
        assert_eq!(
            join_error_code(&EduHubError::not_found("Group not found")),
            ErrorCode::GroupNotFound
        );
        assert_eq!(
            join_error_code(&EduHubError::database_operation("boom")),
            ErrorCode::InternalServerError
        );
    }
}
