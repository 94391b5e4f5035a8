use chrono::{DateTime, Datelike, Months, Utc};
use serde::Serialize;
use ts_rs::TS;

use crate::models::tasks::entities::Task;

/// 最近任务及其提交数
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/analytics.ts")]
pub struct TaskActivity {
    pub id: i64,
    pub title: String,
    pub deadline: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub submission_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/analytics.ts")]
pub struct RecentTask {
    pub id: i64,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Task> for RecentTask {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            created_at: task.created_at,
        }
    }
}

/// 某月创建的任务数，`month` 形如 "2025-03"
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/analytics.ts")]
pub struct MonthlyActivity {
    pub month: String,
    pub tasks: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/analytics.ts")]
pub struct TaskActivityResponse {
    pub tasks: Vec<TaskActivity>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/analytics.ts")]
pub struct RecentTasksResponse {
    pub tasks: Vec<RecentTask>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/analytics.ts")]
pub struct MonthlyActivityResponse {
    pub months: Vec<MonthlyActivity>,
}

/// 统计 `now` 所在月及之前共 `months` 个月的任务数（旧月在前，无任务的月份为 0）
pub fn monthly_task_counts(tasks: &[Task], now: DateTime<Utc>, months: u32) -> Vec<MonthlyActivity> {
    (0..months)
        .rev()
        .filter_map(|back| now.checked_sub_months(Months::new(back)))
        .map(|point| {
            let count = tasks
                .iter()
                .filter(|t| {
                    t.created_at.year() == point.year() && t.created_at.month() == point.month()
                })
                .count() as i64;
            MonthlyActivity {
                month: format!("{:04}-{:02}", point.year(), point.month()),
                tasks: count,
            }
        })
        .collect()
}
