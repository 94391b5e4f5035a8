use serde::Serialize;
use ts_rs::TS;

use super::entities::Task;
use crate::models::PaginationInfo;
use crate::models::users::entities::UserSummary;

/// 学生视角下自己在该任务上的提交状态
#[derive(Debug, Clone, Default, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub struct MySubmissionState {
    pub has_submitted: bool,
    pub submission_id: Option<i64>,
    pub is_graded: bool,
    pub score: Option<f64>,
    pub feedback: Option<String>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub struct TaskResponse {
    #[serde(flatten)]
    #[ts(flatten)]
    pub task: Task,
    pub creator: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_submission: Option<MySubmissionState>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub struct TaskListResponse {
    pub items: Vec<TaskResponse>,
    pub pagination: PaginationInfo,
}

/// 任务提交统计
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub struct TaskStatsResponse {
    pub task_id: i64,
    pub total_submissions: i64,
    pub graded_submissions: i64,
    pub pending_submissions: i64,
    pub average_score: f64,
}
