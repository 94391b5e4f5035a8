use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{CenterService, center_not_found, center_response, load_managed_center};
use crate::middlewares::Operation;
use crate::models::ApiResponse;
use crate::models::centers::{entities::CenterChanges, requests::UpdateCenterRequest};
use crate::services::{authorized_user, error_response, validation_response};

fn into_changes(body: UpdateCenterRequest) -> CenterChanges {
    let trim = |v: Option<String>| v.map(|s| s.trim().to_string());
    CenterChanges {
        name: trim(body.name),
        description: trim(body.description),
        address: trim(body.address),
        phone: trim(body.phone),
        email: trim(body.email).map(|e| e.to_lowercase()),
        website: trim(body.website),
        is_active: body.is_active,
    }
}

pub async fn update_center(
    service: &CenterService,
    request: &HttpRequest,
    center_id: i64,
    body: UpdateCenterRequest,
) -> ActixResult<HttpResponse> {
    let user = match authorized_user(request, Operation::UpdateCenter) {
        Ok(user) => user,
        Err(e) => return Ok(error_response(request, &e)),
    };
    if let Err(issues) = body.validate() {
        return Ok(validation_response(issues));
    }
    let storage = match service.get_storage(request) {
        Ok(storage) => storage,
        Err(e) => return Ok(error_response(request, &e)),
    };
    if let Err(resp) = load_managed_center(&storage, request, &user, center_id).await {
        return Ok(resp);
    }

    let center = match storage.update_center(center_id, into_changes(body)).await {
        Ok(Some(center)) => center,
        Ok(None) => return Ok(center_not_found(request)),
        Err(e) => return Ok(error_response(request, &e)),
    };
    info!("Center {} updated by user {}", center_id, user.id);

    match center_response(&storage, center).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Center updated"))),
        Err(e) => Ok(error_response(request, &e)),
    }
}
