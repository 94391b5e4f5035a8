use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::models::ApiResponse;
use crate::models::submissions::responses::ProgressResponse;
use crate::services::error_response;

/// GET /submissions/progress
pub async fn get_progress(
    service: &SubmissionService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let (caller, workflow) = match service.resolve(request) {
        Ok(pair) => pair,
        Err(e) => return Ok(error_response(request, &e)),
    };

    match workflow.progress(caller).await {
        Ok(progress) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ProgressResponse { progress },
            "Query successful",
        ))),
        Err(e) => Ok(error_response(request, &e)),
    }
}

/// GET /submissions/student/my-submissions
pub async fn list_my_submissions(
    service: &SubmissionService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let (caller, workflow) = match service.resolve(request) {
        Ok(pair) => pair,
        Err(e) => return Ok(error_response(request, &e)),
    };

    match workflow.my_submissions(caller).await {
        Ok(list) => Ok(HttpResponse::Ok().json(ApiResponse::success(list, "Query successful"))),
        Err(e) => Ok(error_response(request, &e)),
    }
}
