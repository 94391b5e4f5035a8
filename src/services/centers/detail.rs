use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CenterService, center_response, load_managed_center};
use crate::middlewares::Operation;
use crate::models::ApiResponse;
use crate::services::{authorized_user, error_response};

pub async fn get_center(
    service: &CenterService,
    request: &HttpRequest,
    center_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match authorized_user(request, Operation::ReadCenter) {
        Ok(user) => user,
        Err(e) => return Ok(error_response(request, &e)),
    };
    let storage = match service.get_storage(request) {
        Ok(storage) => storage,
        Err(e) => return Ok(error_response(request, &e)),
    };

    let center = match load_managed_center(&storage, request, &user, center_id).await {
        Ok(center) => center,
        Err(resp) => return Ok(resp),
    };

    match center_response(&storage, center).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Query successful",
        ))),
        Err(e) => Ok(error_response(request, &e)),
    }
}
