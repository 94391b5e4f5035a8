use serde::Deserialize;
use ts_rs::TS;

use super::entities::SubmissionStatus;
use crate::models::common::pagination::PaginationQuery;

/// 评分请求
#[derive(Debug, Clone, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct GradeSubmissionRequest {
    pub score: f64,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// 某任务下的提交列表参数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct SubmissionListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
}

/// 教师查看全部提交的参数
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct AllSubmissionsParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub status: Option<SubmissionStatus>,
}

// 用于存储层的内部查询参数
#[derive(Debug, Clone, Default)]
pub struct SubmissionListQuery {
    pub page: i64,
    pub size: i64,
    pub task_id: Option<i64>,
    pub student_id: Option<i64>,
    /// 仅包含该教师创建的任务下的提交
    pub task_owner: Option<i64>,
    pub status: Option<SubmissionStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_feedback_is_optional() {
        let req: GradeSubmissionRequest = serde_json::from_str(r#"{"score":88}"#).unwrap();
        assert_eq!(req.score, 88.0);
        assert!(req.feedback.is_none());
    }

    #[test]
    fn test_grade_rejects_unknown_fields() {
        let res = serde_json::from_str::<GradeSubmissionRequest>(
            r#"{"score":88,"feedback":"ok","is_graded":false}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_grade_requires_score() {
        assert!(serde_json::from_str::<GradeSubmissionRequest>(r#"{"feedback":"ok"}"#).is_err());
    }
}
