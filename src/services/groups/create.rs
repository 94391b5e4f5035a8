use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::GroupService;
use crate::errors::EduHubError;
use crate::middlewares::Operation;
use crate::models::groups::{
    entities::NewGroup, requests::CreateGroupRequest, responses::GroupResponse,
};
use crate::models::users::entities::{User, UserSummary};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{
    authorized_user, error_response, error_response_with_code, validation_response,
};

/// 小组归属的中心：未指定时取创建者所在中心，指定时必须是创建者所在中心
fn resolve_center(user: &User, requested: Option<i64>) -> Result<Option<i64>, EduHubError> {
    match requested {
        None => Ok(user.center_id),
        Some(center_id) if user.center_id == Some(center_id) => Ok(Some(center_id)),
        Some(_) => Err(EduHubError::authorization(
            "Groups can only be created in your own center",
        )),
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// POST /groups：创建者即小组教师
pub async fn create_group(
    service: &GroupService,
    request: &HttpRequest,
    body: CreateGroupRequest,
) -> ActixResult<HttpResponse> {
    let user = match authorized_user(request, Operation::CreateGroup) {
        Ok(user) => user,
        Err(e) => return Ok(error_response(request, &e)),
    };
    if let Err(issues) = body.validate() {
        return Ok(validation_response(issues));
    }
    let center_id = match resolve_center(&user, body.center_id) {
        Ok(center_id) => center_id,
        Err(e) => {
            return Ok(error_response_with_code(
                request,
                &e,
                ErrorCode::GroupPermissionDenied,
            ));
        }
    };
    let storage = match service.get_storage(request) {
        Ok(storage) => storage,
        Err(e) => return Ok(error_response(request, &e)),
    };

    if let Some(center_id) = center_id {
        match storage.get_center_by_id(center_id).await {
            Ok(Some(_)) => {}
            Ok(None) => return Ok(crate::services::centers::center_not_found(request)),
            Err(e) => return Ok(error_response(request, &e)),
        }
    }

    let new_group = NewGroup {
        name: body.name.trim().to_string(),
        description: optional(body.description),
        center_id,
        teacher_id: user.id,
        subject: optional(body.subject),
        max_students: body.max_students,
        schedule: optional(body.schedule),
    };
    match storage.create_group(new_group).await {
        Ok(group) => {
            info!("Group {} created by user {}", group.id, user.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                GroupResponse {
                    group,
                    teacher: Some(UserSummary::from(&user)),
                    students: Vec::new(),
                },
                "Group created",
            )))
        }
        Err(e) => Ok(error_response(request, &e)),
    }
}
