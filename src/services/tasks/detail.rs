use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{TaskService, submission_state};
use crate::errors::EduHubError;
use crate::middlewares::Operation;
use crate::models::tasks::responses::TaskResponse;
use crate::models::users::entities::{UserRole, UserSummary};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{authorized_user, error_response, error_response_with_code};

pub async fn get_task(
    service: &TaskService,
    request: &HttpRequest,
    task_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match authorized_user(request, Operation::ReadTasks) {
        Ok(user) => user,
        Err(e) => return Ok(error_response(request, &e)),
    };
    let storage = match service.get_storage(request) {
        Ok(storage) => storage,
        Err(e) => return Ok(error_response(request, &e)),
    };

    let task = match storage.get_task_by_id(task_id).await {
        Ok(Some(task)) => task,
        Ok(None) => {
            return Ok(error_response_with_code(
                request,
                &EduHubError::not_found("Task not found"),
                ErrorCode::TaskNotFound,
            ));
        }
        Err(e) => return Ok(error_response(request, &e)),
    };

    let creator = match storage.get_user_by_id(task.created_by).await {
        Ok(creator) => creator.as_ref().map(UserSummary::from),
        Err(e) => return Ok(error_response(request, &e)),
    };

    let my_submission = if user.role == UserRole::Student {
        match storage.find_submission(task.id, user.id).await {
            Ok(submission) => Some(submission_state(submission.as_ref(), true)),
            Err(e) => return Ok(error_response(request, &e)),
        }
    } else {
        None
    };

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        TaskResponse {
            task,
            creator,
            my_submission,
        },
        "Query successful",
    )))
}
