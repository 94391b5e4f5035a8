pub mod attachment;
pub mod create;
pub mod delete;
pub mod detail;
pub mod list;
pub mod stats;
pub mod update;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::{EduHubError, Result};
use crate::gateway::StorageGateway;
use crate::models::ErrorCode;
use crate::models::submissions::entities::Submission;
use crate::models::tasks::{
    entities::Task,
    requests::{CreateTaskRequest, TaskListParams, UpdateTaskRequest},
    responses::MySubmissionState,
};
use crate::models::users::entities::User;
use crate::storage::Storage;

use super::{error_response, error_response_with_code};

pub struct TaskService {
    storage: Option<Arc<dyn Storage>>,
}

impl TaskService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::shared::<dyn Storage>(request, "Storage"),
        }
    }

    pub(crate) fn get_gateway(&self, request: &HttpRequest) -> Result<Arc<dyn StorageGateway>> {
        super::shared::<dyn StorageGateway>(request, "StorageGateway")
    }

    pub async fn create_task(
        &self,
        request: &HttpRequest,
        body: CreateTaskRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_task(self, request, body).await
    }

    pub async fn list_tasks(
        &self,
        request: &HttpRequest,
        params: TaskListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_tasks(self, request, params).await
    }

    pub async fn get_task(&self, request: &HttpRequest, task_id: i64) -> ActixResult<HttpResponse> {
        detail::get_task(self, request, task_id).await
    }

    pub async fn update_task(
        &self,
        request: &HttpRequest,
        task_id: i64,
        body: UpdateTaskRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_task(self, request, task_id, body).await
    }

    pub async fn delete_task(&self, request: &HttpRequest, task_id: i64) -> ActixResult<HttpResponse> {
        delete::delete_task(self, request, task_id).await
    }

    pub async fn upload_attachment(
        &self,
        request: &HttpRequest,
        task_id: i64,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        attachment::upload_attachment(self, request, task_id, payload).await
    }

    pub async fn get_stats(&self, request: &HttpRequest, task_id: i64) -> ActixResult<HttpResponse> {
        stats::get_task_stats(self, request, task_id).await
    }
}

/// 读取任务并检查调用者是否为创建者
pub(crate) async fn load_owned_task(
    storage: &Arc<dyn Storage>,
    request: &HttpRequest,
    user: &User,
    task_id: i64,
) -> std::result::Result<Task, HttpResponse> {
    let task = match storage.get_task_by_id(task_id).await {
        Ok(Some(task)) => task,
        Ok(None) => {
            return Err(error_response_with_code(
                request,
                &EduHubError::not_found("Task not found"),
                ErrorCode::TaskNotFound,
            ));
        }
        Err(e) => return Err(error_response(request, &e)),
    };

    if !task.is_owned_by(user.id) {
        return Err(error_response_with_code(
            request,
            &EduHubError::authorization("Only the creator of the task can modify it"),
            ErrorCode::TaskPermissionDenied,
        ));
    }
    Ok(task)
}

/// 学生在某任务上的提交状态
pub(crate) fn submission_state(
    submission: Option<&Submission>,
    with_feedback: bool,
) -> MySubmissionState {
    match submission {
        Some(s) => MySubmissionState {
            has_submitted: true,
            submission_id: Some(s.id),
            is_graded: s.is_graded,
            score: s.score,
            feedback: (with_feedback && s.is_graded).then(|| s.feedback.clone()),
        },
        None => MySubmissionState::default(),
    }
}

/// 尽力删除网关中的对象，失败只记录日志
pub(crate) async fn remove_objects(gateway: &Arc<dyn StorageGateway>, storage_ids: &[String]) {
    for storage_id in storage_ids {
        if let Err(e) = gateway.delete(storage_id).await {
            if e.is_not_found() {
                continue;
            }
            tracing::warn!("Failed to delete stored object {}: {}", storage_id, e);
        }
    }
}
