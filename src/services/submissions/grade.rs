use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{GradeInput, SubmissionService};
use crate::models::ApiResponse;
use crate::models::submissions::requests::GradeSubmissionRequest;
use crate::models::submissions::responses::SubmissionEnvelope;
use crate::services::{error_response, validation_response};

/// PUT /submissions/{id}/grade
pub async fn grade_submission(
    service: &SubmissionService,
    request: &HttpRequest,
    submission_id: i64,
    body: GradeSubmissionRequest,
) -> ActixResult<HttpResponse> {
    let (caller, workflow) = match service.resolve(request) {
        Ok(pair) => pair,
        Err(e) => return Ok(error_response(request, &e)),
    };

    let input = match GradeInput::try_from(body) {
        Ok(input) => input,
        Err(issues) => return Ok(validation_response(issues)),
    };

    match workflow.grade(caller, submission_id, input).await {
        Ok(submission) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            SubmissionEnvelope::from(submission),
            "Submission graded successfully",
        ))),
        Err(e) => Ok(error_response(request, &e)),
    }
}
