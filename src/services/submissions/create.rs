use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::SubmissionService;
use crate::errors::EduHubError;
use crate::models::submissions::responses::SubmissionEnvelope;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, error_response_with_code, rejection_response};
use crate::utils::multipart::read_single_file;

const FILE_FIELD: &str = "file";

/// POST /submissions/{task_id}
pub async fn submit_assignment(
    service: &SubmissionService,
    request: &HttpRequest,
    task_id: i64,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    let (caller, workflow) = match service.resolve(request) {
        Ok(pair) => pair,
        Err(e) => return Ok(error_response(request, &e)),
    };

    let file = match read_single_file(payload, FILE_FIELD, workflow.policy().max_size).await {
        Ok(file) => file,
        Err(rejection) => return Ok(rejection_response(&rejection)),
    };
    let upload = match workflow.screen_upload(file) {
        Ok(upload) => upload,
        Err(rejection) => return Ok(rejection_response(&rejection)),
    };

    match workflow.submit(caller, task_id, upload).await {
        Ok(submission) => Ok(HttpResponse::Created().json(ApiResponse::success(
            SubmissionEnvelope::from(submission),
            "Assignment submitted successfully",
        ))),
        Err(e @ EduHubError::NotFound(_)) => Ok(error_response_with_code(
            request,
            &e,
            ErrorCode::TaskNotFound,
        )),
        Err(e) => Ok(error_response(request, &e)),
    }
}
