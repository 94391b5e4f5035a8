use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{TaskService, load_owned_task};
use crate::middlewares::Operation;
use crate::models::submissions::entities::{SubmissionTally, average_score};
use crate::models::tasks::responses::TaskStatsResponse;
use crate::models::ApiResponse;
use crate::services::{authorized_user, error_response};

fn build_stats(task_id: i64, tally: &SubmissionTally) -> TaskStatsResponse {
    let graded = tally.graded();
    TaskStatsResponse {
        task_id,
        total_submissions: tally.submitted,
        graded_submissions: graded,
        pending_submissions: (tally.submitted - graded).max(0),
        average_score: average_score(&tally.graded_scores),
    }
}

/// GET /tasks/{id}/stats
pub async fn get_task_stats(
    service: &TaskService,
    request: &HttpRequest,
    task_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match authorized_user(request, Operation::ViewTaskStats) {
        Ok(user) => user,
        Err(e) => return Ok(error_response(request, &e)),
    };
    let storage = match service.get_storage(request) {
        Ok(storage) => storage,
        Err(e) => return Ok(error_response(request, &e)),
    };

    if let Err(resp) = load_owned_task(&storage, request, &user, task_id).await {
        return Ok(resp);
    }

    match storage.tally_submissions_for_task(task_id).await {
        Ok(tally) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            build_stats(task_id, &tally),
            "Query successful",
        ))),
        Err(e) => Ok(error_response(request, &e)),
    }
}
