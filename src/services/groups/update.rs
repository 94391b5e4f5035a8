use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{GroupService, group_not_found, group_response, load_managed_group};
use crate::middlewares::Operation;
use crate::models::ApiResponse;
use crate::models::groups::{entities::GroupChanges, requests::UpdateGroupRequest};
use crate::services::{authorized_user, error_response, validation_response};

fn into_changes(body: UpdateGroupRequest) -> GroupChanges {
    let trim = |v: Option<String>| v.map(|s| s.trim().to_string());
    GroupChanges {
        name: trim(body.name),
        description: trim(body.description),
        subject: trim(body.subject),
        max_students: body.max_students,
        schedule: trim(body.schedule),
        is_active: body.is_active,
    }
}

pub async fn update_group(
    service: &GroupService,
    request: &HttpRequest,
    group_id: i64,
    body: UpdateGroupRequest,
) -> ActixResult<HttpResponse> {
    let user = match authorized_user(request, Operation::UpdateGroup) {
        Ok(user) => user,
        Err(e) => return Ok(error_response(request, &e)),
    };
    let storage = match service.get_storage(request) {
        Ok(storage) => storage,
        Err(e) => return Ok(error_response(request, &e)),
    };
    let group = match load_managed_group(&storage, request, &user, group_id).await {
        Ok(group) => group,
        Err(resp) => return Ok(resp),
    };
    if let Err(issues) = body.validate(group.current_students) {
        return Ok(validation_response(issues));
    }

    // 存储层会再次检查容量，防止与加入成员并发
    let group = match storage.update_group(group_id, into_changes(body)).await {
        Ok(Some(group)) => group,
        Ok(None) => return Ok(group_not_found(request)),
        Err(e) => return Ok(error_response(request, &e)),
    };
    info!("Group {} updated by user {}", group_id, user.id);

    match group_response(&storage, group, true).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Group updated"))),
        Err(e) => Ok(error_response(request, &e)),
    }
}
