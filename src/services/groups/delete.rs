use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{GroupService, group_not_found, load_managed_group};
use crate::middlewares::Operation;
use crate::models::ApiResponse;
use crate::services::{authorized_user, error_response};

/// 删除小组，成员关系一并删除
pub async fn delete_group(
    service: &GroupService,
    request: &HttpRequest,
    group_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match authorized_user(request, Operation::DeleteGroup) {
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

    match storage.delete_group(group_id).await {
        Ok(true) => {
            info!("Group {} deleted by user {}", group_id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Group deleted")))
        }
        Ok(false) => Ok(group_not_found(request)),
        Err(e) => Ok(error_response(request, &e)),
    }
}
