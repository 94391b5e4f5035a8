use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 任务附件（存放在对象存储网关中）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub struct TaskAttachment {
    pub storage_file_id: String,
    pub url: String,
    pub name: String,
    pub size: i64,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/task.ts")]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    // 截止时间，过后不再接受提交
    pub deadline: DateTime<Utc>,
    // 创建者（教师）ID
    pub created_by: i64,
    pub attachment: Option<TaskAttachment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// `now` 时刻是否仍可提交（截止时间当刻仍有效）
    pub fn accepts_submissions_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.deadline
    }

    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.created_by == user_id
    }
}

/// 新建任务（存储层输入）
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub deadline: DateTime<Utc>,
    pub created_by: i64,
}

/// 任务变更（存储层输入）
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn task_with_deadline(deadline: DateTime<Utc>) -> Task {
        Task {
            id: 1,
            title: "Essay".into(),
            description: "Write an essay".into(),
            deadline,
            created_by: 7,
            attachment: None,
            created_at: deadline - Duration::days(1),
            updated_at: deadline - Duration::days(1),
        }
    }

    #[test]
    fn test_deadline_boundary_is_inclusive() {
        let deadline = Utc::now();
        let task = task_with_deadline(deadline);
        assert!(task.accepts_submissions_at(deadline));
        assert!(task.accepts_submissions_at(deadline - Duration::seconds(1)));
        assert!(!task.accepts_submissions_at(deadline + Duration::seconds(1)));
    }

    #[test]
    fn test_ownership() {
        let task = task_with_deadline(Utc::now());
        assert!(task.is_owned_by(7));
        assert!(!task.is_owned_by(8));
    }
}
