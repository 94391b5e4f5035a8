use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{TaskService, load_owned_task};
use crate::middlewares::Operation;
use crate::models::tasks::{
    entities::TaskChanges, requests::UpdateTaskRequest, responses::TaskResponse,
};
use crate::models::users::entities::UserSummary;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{authorized_user, error_response, validation_response};
use crate::utils::validate::{
    FieldIssues, validate_deadline, validate_task_description, validate_task_title,
};

/// 校验并规整变更字段
fn prepare_changes(
    body: UpdateTaskRequest,
    now: chrono::DateTime<chrono::Utc>,
) -> Result<TaskChanges, Vec<crate::models::FieldIssue>> {
    let changes = TaskChanges {
        title: body.title.map(|t| t.trim().to_string()),
        description: body.description.map(|d| d.trim().to_string()),
        deadline: body.deadline,
    };

    let mut issues = FieldIssues::new();
    if let Some(title) = &changes.title {
        issues.check("title", validate_task_title(title));
    }
    if let Some(description) = &changes.description {
        issues.check("description", validate_task_description(description));
    }
    if let Some(deadline) = changes.deadline {
        issues.check("deadline", validate_deadline(deadline, now));
    }
    issues.into_result()?;
    Ok(changes)
}

pub async fn update_task(
    service: &TaskService,
    request: &HttpRequest,
    task_id: i64,
    body: UpdateTaskRequest,
) -> ActixResult<HttpResponse> {
    let user = match authorized_user(request, Operation::UpdateTask) {
        Ok(user) => user,
        Err(e) => return Ok(error_response(request, &e)),
    };

    let changes = match prepare_changes(body, chrono::Utc::now()) {
        Ok(changes) => changes,
        Err(issues) => return Ok(validation_response(issues)),
    };

    let storage = match service.get_storage(request) {
        Ok(storage) => storage,
        Err(e) => return Ok(error_response(request, &e)),
    };
    if let Err(resp) = load_owned_task(&storage, request, &user, task_id).await {
        return Ok(resp);
    }

    match storage.update_task(task_id, changes).await {
        Ok(Some(task)) => {
            info!("Task {} updated by teacher {}", task_id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                TaskResponse {
                    task,
                    creator: Some(UserSummary::from(&user)),
                    my_submission: None,
                },
                "Task updated",
            )))
        }
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
            ErrorCode::TaskNotFound,
            "Task not found",
        ))),
        Err(e) => Ok(error_response(request, &e)),
    }
}
