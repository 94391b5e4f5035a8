use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::models::ApiResponse;
use crate::models::submissions::requests::{AllSubmissionsParams, SubmissionListParams};
use crate::services::error_response;

/// GET /submissions/{task_id}
pub async fn list_task_submissions(
    service: &SubmissionService,
    request: &HttpRequest,
    task_id: i64,
    params: SubmissionListParams,
) -> ActixResult<HttpResponse> {
    let (caller, workflow) = match service.resolve(request) {
        Ok(pair) => pair,
        Err(e) => return Ok(error_response(request, &e)),
    };

    let (page, size) = params.pagination.normalized();
    match workflow.list_for_task(caller, task_id, page, size).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list, "Query successful"))),
        Err(e) => Ok(error_response(request, &e)),
    }
}

/// GET /submissions?status=graded|pending
pub async fn list_all_submissions(
    service: &SubmissionService,
    request: &HttpRequest,
    params: AllSubmissionsParams,
) -> ActixResult<HttpResponse> {
    let (caller, workflow) = match service.resolve(request) {
        Ok(pair) => pair,
        Err(e) => return Ok(error_response(request, &e)),
    };

    let (page, size) = params.pagination.normalized();
    match workflow.list_all(caller, page, size, params.status).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list, "Query successful"))),
        Err(e) => Ok(error_response(request, &e)),
    }
}
