use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{TaskService, load_owned_task, remove_objects};
use crate::middlewares::Operation;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{authorized_user, error_response};

/// 删除任务，级联删除提交，再尽力清理网关中的对象
pub async fn delete_task(
    service: &TaskService,
    request: &HttpRequest,
    task_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match authorized_user(request, Operation::DeleteTask) {
        Ok(user) => user,
        Err(e) => return Ok(error_response(request, &e)),
    };
    let (storage, gateway) = match service
        .get_storage(request)
        .and_then(|s| service.get_gateway(request).map(|g| (s, g)))
    {
        Ok(pair) => pair,
        Err(e) => return Ok(error_response(request, &e)),
    };

    let task = match load_owned_task(&storage, request, &user, task_id).await {
        Ok(task) => task,
        Err(resp) => return Ok(resp),
    };

    let mut orphaned = match storage.delete_task(task_id).await {
        Ok(Some(ids)) => ids,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::TaskNotFound,
                "Task not found",
            )));
        }
        Err(e) => return Ok(error_response(request, &e)),
    };
    if let Some(attachment) = task.attachment {
        orphaned.push(attachment.storage_file_id);
    }

    info!(
        "Task {} deleted by teacher {} ({} stored objects to remove)",
        task_id,
        user.id,
        orphaned.len()
    );
    remove_objects(&gateway, &orphaned).await;

    Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Task deleted")))
}
