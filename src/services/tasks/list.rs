use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;

use super::{TaskService, submission_state};
use crate::middlewares::Operation;
use crate::models::tasks::{
    requests::{TaskListParams, TaskListQuery},
    responses::{TaskListResponse, TaskResponse},
};
use crate::models::users::entities::{UserRole, UserSummary};
use crate::models::ApiResponse;
use crate::services::{authorized_user, error_response};

pub async fn list_tasks(
    service: &TaskService,
    request: &HttpRequest,
    params: TaskListParams,
) -> ActixResult<HttpResponse> {
    let user = match authorized_user(request, Operation::ReadTasks) {
        Ok(user) => user,
        Err(e) => return Ok(error_response(request, &e)),
    };
    let storage = match service.get_storage(request) {
        Ok(storage) => storage,
        Err(e) => return Ok(error_response(request, &e)),
    };

    let page = match storage
        .list_tasks_with_pagination(TaskListQuery::from(params))
        .await
    {
        Ok(page) => page,
        Err(e) => return Ok(error_response(request, &e)),
    };

    let mut creator_ids: Vec<i64> = page.items.iter().map(|t| t.created_by).collect();
    creator_ids.sort_unstable();
    creator_ids.dedup();
    let creators: HashMap<i64, UserSummary> = match storage.get_users_by_ids(&creator_ids).await {
        Ok(users) => users.iter().map(|u| (u.id, UserSummary::from(u))).collect(),
        Err(e) => return Ok(error_response(request, &e)),
    };

    // 学生附带自己的提交状态
    let my_submissions = if user.role == UserRole::Student {
        match storage.list_submissions_by_student(user.id).await {
            Ok(submissions) => Some(
                submissions
                    .into_iter()
                    .map(|s| (s.task_id, s))
                    .collect::<HashMap<_, _>>(),
            ),
            Err(e) => return Ok(error_response(request, &e)),
        }
    } else {
        None
    };

    let items = page
        .items
        .into_iter()
        .map(|task| TaskResponse {
            creator: creators.get(&task.created_by).cloned(),
            my_submission: my_submissions
                .as_ref()
                .map(|subs| submission_state(subs.get(&task.id), false)),
            task,
        })
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        TaskListResponse {
            items,
            pagination: page.pagination,
        },
        "Query successful",
    )))
}
