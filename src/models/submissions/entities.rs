use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// 提交记录
///
/// 不变式：`is_graded == score.is_some()`，且 `graded_at` / `graded_by` 与评分同时设置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct Submission {
    pub id: i64,
    pub task_id: i64,
    pub student_id: i64,
    pub file_url: String,
    // 存储网关中的对象名
    pub file_name: String,
    // 学生上传时的原始文件名
    pub original_name: String,
    pub storage_file_id: String,
    pub file_size: i64,
    pub mime_type: String,
    pub score: Option<f64>,
    pub feedback: String,
    pub is_graded: bool,
    pub submitted_at: DateTime<Utc>,
    pub graded_at: Option<DateTime<Utc>>,
    pub graded_by: Option<i64>,
}

impl Submission {
    pub fn status(&self) -> SubmissionStatus {
        if self.is_graded {
            SubmissionStatus::Graded
        } else {
            SubmissionStatus::Pending
        }
    }
}

/// 提交状态过滤
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub enum SubmissionStatus {
    Pending,
    Graded,
}

/// 新提交（存储层输入），上传完成后才会构造
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub task_id: i64,
    pub student_id: i64,
    pub file_url: String,
    pub file_name: String,
    pub original_name: String,
    pub storage_file_id: String,
    pub file_size: i64,
    pub mime_type: String,
    pub submitted_at: DateTime<Utc>,
}

/// 评分写入（整体覆盖）
#[derive(Debug, Clone)]
pub struct GradeUpdate {
    pub score: f64,
    pub feedback: String,
    pub graded_by: i64,
    pub graded_at: DateTime<Utc>,
}

/// 提交计数与已评分分数
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionTally {
    pub submitted: i64,
    pub graded_scores: Vec<f64>,
}

impl SubmissionTally {
    pub fn graded(&self) -> i64 {
        self.graded_scores.len() as i64
    }
}

/// 学生学习进度
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../frontend/src/types/generated/submission.ts")]
pub struct StudentProgress {
    pub total_tasks: i64,
    pub submitted_tasks: i64,
    pub graded_tasks: i64,
    pub pending_grades: i64,
    pub completion_percentage: i64,
    pub average_score: f64,
}

impl StudentProgress {
    pub fn compute(total_tasks: i64, submitted_tasks: i64, graded_scores: &[f64]) -> Self {
        let graded_tasks = graded_scores.len() as i64;
        let completion_percentage = if total_tasks > 0 {
            (submitted_tasks as f64 * 100.0 / total_tasks as f64).round() as i64
        } else {
            0
        };
        Self {
            total_tasks,
            submitted_tasks,
            graded_tasks,
            pending_grades: (submitted_tasks - graded_tasks).max(0),
            completion_percentage,
            average_score: average_score(graded_scores),
        }
    }
}

/// 平均分，保留两位小数；没有分数时为 0
pub fn average_score(scores: &[f64]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    (mean * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_rounds_to_two_decimals() {
        assert_eq!(average_score(&[]), 0.0);
        assert_eq!(average_score(&[88.0]), 88.0);
        assert_eq!(average_score(&[90.0, 85.0, 70.0]), 81.67);
    }

    #[test]
    fn test_progress_with_no_tasks() {
        let p = StudentProgress::compute(0, 0, &[]);
        assert_eq!(p.completion_percentage, 0);
        assert_eq!(p.pending_grades, 0);
        assert_eq!(p.average_score, 0.0);
    }

    #[test]
    fn test_progress_arithmetic() {
        let p = StudentProgress::compute(3, 2, &[75.0]);
        assert_eq!(p.submitted_tasks, 2);
        assert_eq!(p.graded_tasks, 1);
        assert_eq!(p.pending_grades, 1);
        // 2/3 = 66.67% -> 67
        assert_eq!(p.completion_percentage, 67);
        assert_eq!(p.average_score, 75.0);
    }
}
