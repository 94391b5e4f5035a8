use crate::models::common::pagination::PaginationQuery;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use ts_rs::TS;

/// 创建任务请求
#[derive(Debug, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: String,
    pub deadline: DateTime<Utc>, // ISO 8601 格式，如 "2026-01-24T12:00:00Z"
}

/// 更新任务请求
#[derive(Debug, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
}

/// 任务列表查询参数（HTTP 请求）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub struct TaskListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
}

// 用于存储层的内部查询参数
#[derive(Debug, Clone)]
pub struct TaskListQuery {
    pub page: i64,
    pub size: i64,
    pub search: Option<String>,
}

impl From<TaskListParams> for TaskListQuery {
    fn from(params: TaskListParams) -> Self {
        let (page, size) = params.pagination.normalized();
        Self {
            page,
            size,
            search: params
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_task_parses_iso_deadline() {
        let req: CreateTaskRequest = serde_json::from_str(
            r#"{"title":"Essay","description":"Write about Rust","deadline":"2030-01-24T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(req.deadline.to_rfc3339(), "2030-01-24T12:00:00+00:00");
    }

    #[test]
    fn test_create_task_rejects_unknown_fields() {
        let res = serde_json::from_str::<CreateTaskRequest>(
            r#"{"title":"Essay","description":"Write about Rust","deadline":"2030-01-24T12:00:00Z","max_score":100}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_blank_search_is_dropped() {
        let query = TaskListQuery::from(TaskListParams {
            pagination: PaginationQuery::default(),
            search: Some("   ".into()),
        });
        assert!(query.search.is_none());
    }
}
