use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::TaskService;
use crate::middlewares::Operation;
use crate::models::tasks::{
    entities::NewTask, requests::CreateTaskRequest, responses::TaskResponse,
};
use crate::models::users::entities::UserSummary;
use crate::models::ApiResponse;
use crate::services::{authorized_user, error_response, validation_response};
use crate::utils::validate::{
    FieldIssues, validate_deadline, validate_task_description, validate_task_title,
};

pub async fn create_task(
    service: &TaskService,
    request: &HttpRequest,
    body: CreateTaskRequest,
) -> ActixResult<HttpResponse> {
    let user = match authorized_user(request, Operation::CreateTask) {
        Ok(user) => user,
        Err(e) => return Ok(error_response(request, &e)),
    };

    let title = body.title.trim().to_string();
    let description = body.description.trim().to_string();

    let mut issues = FieldIssues::new();
    issues
        .check("title", validate_task_title(&title))
        .check("description", validate_task_description(&description))
        .check("deadline", validate_deadline(body.deadline, chrono::Utc::now()));
    if let Err(issues) = issues.into_result() {
        return Ok(validation_response(issues));
    }

    let storage = match service.get_storage(request) {
        Ok(storage) => storage,
        Err(e) => return Ok(error_response(request, &e)),
    };

    let new_task = NewTask {
        title,
        description,
        deadline: body.deadline,
        created_by: user.id,
    };
    match storage.create_task(new_task).await {
        Ok(task) => {
            info!("Task {} created by teacher {}", task.id, user.id);
            let response = TaskResponse {
                task,
                creator: Some(UserSummary::from(&user)),
                my_submission: None,
            };
            Ok(HttpResponse::Created().json(ApiResponse::success(response, "Task created")))
        }
        Err(e) => Ok(error_response(request, &e)),
    }
}
