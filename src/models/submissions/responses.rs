use chrono::{DateTime, Utc};
use serde::Serialize;
use ts_rs::TS;

use super::entities::{StudentProgress, Submission};
use crate::models::PaginationInfo;
use crate::models::tasks::entities::Task;
use crate::models::users::entities::UserSummary;

/// 提交关联的任务信息
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct SubmissionTaskInfo {
    pub id: i64,
    pub title: String,
    pub deadline: DateTime<Utc>,
    pub created_by: i64,
}

impl From<&Task> for SubmissionTaskInfo {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            deadline: task.deadline,
            created_by: task.created_by,
        }
    }
}

/// 提交响应（附带任务与学生摘要）
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct SubmissionResponse {
    #[serde(flatten)]
    #[ts(flatten)]
    pub submission: Submission,
    pub task: Option<SubmissionTaskInfo>,
    pub student: Option<UserSummary>,
}

/// 单条提交响应：`{ "submission": ... }`
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct SubmissionEnvelope {
    pub submission: SubmissionResponse,
}

impl From<SubmissionResponse> for SubmissionEnvelope {
    fn from(submission: SubmissionResponse) -> Self {
        Self { submission }
    }
}

/// 提交列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct SubmissionListResponse {
    pub submissions: Vec<SubmissionResponse>,
    pub pagination: PaginationInfo,
}

/// 学生自己的全部提交（无分页）
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct MySubmissionsResponse {
    pub submissions: Vec<SubmissionResponse>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct ProgressResponse {
    pub progress: StudentProgress,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::{Value, json};

    fn sample() -> SubmissionResponse {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        SubmissionResponse {
            submission: Submission {
                id: 7,
                task_id: 3,
                student_id: 11,
                file_url: "https://files.local/v1/storage/buckets/b/files/f1/view".to_string(),
                file_name: "submissions/3/f1-hw.pdf".to_string(),
                original_name: "hw.pdf".to_string(),
                storage_file_id: "f1".to_string(),
                file_size: 2048,
                mime_type: "application/pdf".to_string(),
                score: None,
                feedback: String::new(),
                is_graded: false,
                submitted_at: at,
                graded_at: None,
                graded_by: None,
            },
            task: None,
            student: None,
        }
    }

    #[test]
    fn test_single_submission_is_wrapped() {
        let value = serde_json::to_value(SubmissionEnvelope::from(sample())).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        // 提交字段平铺在 submission 对象内
        assert_eq!(value["submission"]["id"], json!(7));
        assert_eq!(value["submission"]["original_name"], json!("hw.pdf"));
        assert_eq!(value["submission"]["is_graded"], json!(false));
        assert_eq!(value["submission"]["task"], Value::Null);
    }

    #[test]
    fn test_task_list_shape() {
        let list = SubmissionListResponse {
            submissions: vec![sample()],
            pagination: PaginationInfo::new(1, 10, 1),
        };
        let value = serde_json::to_value(list).unwrap();
        assert_eq!(value["submissions"].as_array().map(Vec::len), Some(1));
        assert_eq!(value["submissions"][0]["task_id"], json!(3));
        assert!(value["pagination"].is_object());
        assert!(value.get("items").is_none());
    }

    #[test]
    fn test_my_submissions_shape() {
        let value = serde_json::to_value(MySubmissionsResponse {
            submissions: vec![sample(), sample()],
        })
        .unwrap();
        assert_eq!(value.as_object().map(|o| o.len()), Some(1));
        assert_eq!(value["submissions"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_progress_uses_camel_case_keys() {
        let value = serde_json::to_value(ProgressResponse {
            progress: StudentProgress::compute(4, 3, &[80.0, 90.0]),
        })
        .unwrap();
        assert_eq!(
            value,
            json!({
                "progress": {
                    "totalTasks": 4,
                    "submittedTasks": 3,
                    "gradedTasks": 2,
                    "pendingGrades": 1,
                    "completionPercentage": 75,
                    "averageScore": 85.0
                }
            })
        );
    }
}
