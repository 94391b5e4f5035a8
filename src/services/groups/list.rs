use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::GroupService;
use crate::middlewares::Operation;
use crate::models::ApiResponse;
use crate::models::groups::{
    requests::{GroupListParams, GroupListQuery},
    responses::GroupListResponse,
};
use crate::services::{authorized_user, error_response};

pub async fn list_groups(
    service: &GroupService,
    request: &HttpRequest,
    params: GroupListParams,
) -> ActixResult<HttpResponse> {
    if let Err(e) = authorized_user(request, Operation::ReadGroups) {
        return Ok(error_response(request, &e));
    }
    let storage = match service.get_storage(request) {
        Ok(storage) => storage,
        Err(e) => return Ok(error_response(request, &e)),
    };

    match storage
        .list_groups_with_pagination(GroupListQuery::from(params))
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            GroupListResponse {
                items: page.items,
                pagination: page.pagination,
            },
            "Query successful",
        ))),
        Err(e) => Ok(error_response(request, &e)),
    }
}
