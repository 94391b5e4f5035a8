use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::errors::EduHubError;
use crate::models::submissions::responses::SubmissionEnvelope;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, error_response_with_code};

/// GET /submissions/single/{id}
pub async fn get_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    let (caller, workflow) = match service.resolve(request) {
        Ok(pair) => pair,
        Err(e) => return Ok(error_response(request, &e)),
    };

    match workflow.get_single(caller, submission_id).await {
        Ok(submission) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                SubmissionEnvelope::from(submission),
                "Query successful",
            )))
        }
        Err(e @ EduHubError::NotFound(_)) => Ok(error_response_with_code(
            request,
            &e,
            ErrorCode::SubmissionNotFound,
        )),
        Err(e) => Ok(error_response(request, &e)),
    }
}
