use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::CenterService;
use crate::middlewares::Operation;
use crate::models::ApiResponse;
use crate::models::centers::{
    requests::{CenterListParams, CenterListQuery},
    responses::CenterListResponse,
};
use crate::services::{authorized_user, error_response};

pub async fn list_centers(
    service: &CenterService,
    request: &HttpRequest,
    params: CenterListParams,
) -> ActixResult<HttpResponse> {
    if let Err(e) = authorized_user(request, Operation::ListCenters) {
        return Ok(error_response(request, &e));
    }
    let storage = match service.get_storage(request) {
        Ok(storage) => storage,
        Err(e) => return Ok(error_response(request, &e)),
    };

    match storage
        .list_centers_with_pagination(CenterListQuery::from(params))
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            CenterListResponse {
                items: page.items,
                pagination: page.pagination,
            },
            "Query successful",
        ))),
        Err(e) => Ok(error_response(request, &e)),
    }
}
