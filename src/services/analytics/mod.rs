//! 教师教学分析：最近任务的提交情况、月度任务数

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::middlewares::Operation;
use crate::models::ApiResponse;
use crate::models::analytics::responses::{
    MonthlyActivityResponse, RecentTask, RecentTasksResponse, TaskActivity,
    TaskActivityResponse, monthly_task_counts,
};
use crate::storage::Storage;

use super::{authorized_user, error_response};

// 最近任务条数
const RECENT_TASKS: usize = 5;
// 月度统计覆盖的月份数（含当月）
const ACTIVITY_MONTHS: u32 = 6;

pub struct AnalyticsService {
    storage: Option<Arc<dyn Storage>>,
}

impl AnalyticsService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::shared::<dyn Storage>(request, "Storage"),
        }
    }

    /// 最近任务及各自的提交数
    pub async fn task_activity(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let user = match authorized_user(request, Operation::ViewTeachingAnalytics) {
            Ok(user) => user,
            Err(e) => return Ok(error_response(request, &e)),
        };
        let storage = match self.get_storage(request) {
            Ok(storage) => storage,
            Err(e) => return Ok(error_response(request, &e)),
        };

        let tasks = match storage.list_tasks_by_creator(user.id).await {
            Ok(tasks) => tasks,
            Err(e) => return Ok(error_response(request, &e)),
        };

        let mut activity = Vec::with_capacity(RECENT_TASKS);
        for task in tasks.into_iter().take(RECENT_TASKS) {
            let tally = match storage.tally_submissions_for_task(task.id).await {
                Ok(tally) => tally,
                Err(e) => return Ok(error_response(request, &e)),
            };
            activity.push(TaskActivity {
                id: task.id,
                title: task.title,
                deadline: task.deadline,
                created_at: task.created_at,
                submission_count: tally.submitted,
            });
        }

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            TaskActivityResponse { tasks: activity },
            "Query successful",
        )))
    }

    /// 近几个月每月创建的任务数
    pub async fn monthly_activity(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let user = match authorized_user(request, Operation::ViewTeachingAnalytics) {
            Ok(user) => user,
            Err(e) => return Ok(error_response(request, &e)),
        };
        let storage = match self.get_storage(request) {
            Ok(storage) => storage,
            Err(e) => return Ok(error_response(request, &e)),
        };

        match storage.list_tasks_by_creator(user.id).await {
            Ok(tasks) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                MonthlyActivityResponse {
                    months: monthly_task_counts(&tasks, chrono::Utc::now(), ACTIVITY_MONTHS),
                },
                "Query successful",
            ))),
            Err(e) => Ok(error_response(request, &e)),
        }
    }

    pub async fn recent_tasks(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let user = match authorized_user(request, Operation::ViewTeachingAnalytics) {
            Ok(user) => user,
            Err(e) => return Ok(error_response(request, &e)),
        };
        let storage = match self.get_storage(request) {
            Ok(storage) => storage,
            Err(e) => return Ok(error_response(request, &e)),
        };

        match storage.list_tasks_by_creator(user.id).await {
            Ok(tasks) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                RecentTasksResponse {
                    tasks: tasks.iter().take(RECENT_TASKS).map(RecentTask::from).collect(),
                },
                "Query successful",
            ))),
            Err(e) => Ok(error_response(request, &e)),
        }
    }
}
