use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{GroupService, group_not_found, group_response};
use crate::middlewares::Operation;
use crate::models::ApiResponse;
use crate::models::groups::entities::can_manage_group;
use crate::services::{authorized_user, error_response};

/// GET /groups/{id}：成员名单只对管理者和小组成员可见
pub async fn get_group(
    service: &GroupService,
    request: &HttpRequest,
    group_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match authorized_user(request, Operation::ReadGroups) {
        Ok(user) => user,
        Err(e) => return Ok(error_response(request, &e)),
    };
    let storage = match service.get_storage(request) {
        Ok(storage) => storage,
        Err(e) => return Ok(error_response(request, &e)),
    };

    let group = match storage.get_group_by_id(group_id).await {
        Ok(Some(group)) => group,
        Ok(None) => return Ok(group_not_found(request)),
        Err(e) => return Ok(error_response(request, &e)),
    };

    let with_students = if can_manage_group(&user, &group) {
        true
    } else {
        match storage.list_group_student_ids(group_id).await {
            Ok(ids) => ids.contains(&user.id),
            Err(e) => return Ok(error_response(request, &e)),
        }
    };

    match group_response(&storage, group, with_students).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Query successful",
        ))),
        Err(e) => Ok(error_response(request, &e)),
    }
}
