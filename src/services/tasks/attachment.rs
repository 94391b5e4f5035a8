use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::{TaskService, load_owned_task, remove_objects};
use crate::config::AppConfig;
use crate::errors::EduHubError;
use crate::gateway::UploadRequest;
use crate::middlewares::Operation;
use crate::models::tasks::{entities::TaskAttachment, responses::TaskResponse};
use crate::models::users::entities::UserSummary;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{authorized_user, error_response, rejection_response};
use crate::utils::multipart::read_single_file;
use crate::utils::upload_filter::{UploadPolicy, UploadRejection, validate_upload};

const FILE_FIELD: &str = "file";

/// POST /tasks/{id}/attachment，替换已有附件
pub async fn upload_attachment(
    service: &TaskService,
    request: &HttpRequest,
    task_id: i64,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    let user = match authorized_user(request, Operation::UploadTaskAttachment) {
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

    let config = AppConfig::get();
    let policy = UploadPolicy::from(&config.upload);
    let file = match read_single_file(payload, FILE_FIELD, policy.max_size).await {
        Ok(file) => file,
        Err(rejection) => return Ok(rejection_response(&rejection)),
    };
    let Some(file) = file else {
        return Ok(rejection_response(&UploadRejection::Missing));
    };
    if let Err(rejection) = validate_upload(Some(&file), &policy) {
        return Ok(rejection_response(&rejection));
    }

    let upload = UploadRequest {
        bytes: file.bytes,
        folder: config.storage_gateway.task_folder.clone(),
        original_name: file.original_name,
        mime_type: file.mime_type,
    };
    let stored =
        match tokio::time::timeout(config.request_deadline(), gateway.upload(upload)).await {
            Ok(Ok(stored)) => stored,
            Ok(Err(e)) => {
                warn!("Attachment upload failed for task {}: {}", task_id, e);
                return Ok(error_response(request, &EduHubError::from(e)));
            }
            Err(_) => {
                return Ok(error_response(
                    request,
                    &EduHubError::upstream_unavailable("File storage did not respond in time"),
                ));
            }
        };

    let attachment = TaskAttachment {
        storage_file_id: stored.storage_id.clone(),
        url: stored.url,
        name: stored.name,
        size: stored.size,
        mime_type: stored.mime_type,
    };
    let updated = match storage.set_task_attachment(task_id, Some(attachment)).await {
        Ok(Some(task)) => task,
        Ok(None) => {
            remove_objects(&gateway, &[stored.storage_id]).await;
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::TaskNotFound,
                "Task not found",
            )));
        }
        Err(e) => {
            remove_objects(&gateway, &[stored.storage_id]).await;
            return Ok(error_response(request, &e));
        }
    };

    // 替换后清理旧附件
    if let Some(previous) = task.attachment {
        remove_objects(&gateway, &[previous.storage_file_id]).await;
    }

    info!("Attachment uploaded for task {} by teacher {}", task_id, user.id);
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        TaskResponse {
            task: updated,
            creator: Some(UserSummary::from(&user)),
            my_submission: None,
        },
        "Attachment uploaded",
    )))
}
