//! 提交存储操作

use super::{SeaOrmStorage, is_unique_violation};
use crate::entity::submissions::{ActiveModel, Column, Entity as Submissions};
use crate::entity::tasks::{Column as TaskColumn, Entity as Tasks};
use crate::errors::{EduHubError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    submissions::{
        entities::{GradeUpdate, NewSubmission, Submission, SubmissionStatus, SubmissionTally},
        requests::SubmissionListQuery,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, QueryTrait, Set,
};

impl SeaOrmStorage {
    /// 创建提交
    ///
    /// 并发重复提交由唯一索引拦截，转换为 AlreadySubmitted。
    pub async fn create_submission_impl(&self, req: NewSubmission) -> Result<Submission> {
        let model = ActiveModel {
            task_id: Set(req.task_id),
            student_id: Set(req.student_id),
            file_url: Set(req.file_url),
            file_name: Set(req.file_name),
            original_name: Set(req.original_name),
            storage_file_id: Set(req.storage_file_id),
            file_size: Set(req.file_size),
            mime_type: Set(req.mime_type),
            score: Set(None),
            feedback: Set(String::new()),
            is_graded: Set(false),
            submitted_at: Set(req.submitted_at.timestamp()),
            graded_at: Set(None),
            graded_by: Set(None),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                EduHubError::already_submitted("You have already submitted this task")
            } else {
                EduHubError::database_operation(format!("创建提交失败: {e}"))
            }
        })?;

        Ok(result.into_submission())
    }

    /// 通过 ID 获取提交
    pub async fn get_submission_by_id_impl(
        &self,
        submission_id: i64,
    ) -> Result<Option<Submission>> {
        let result = Submissions::find_by_id(submission_id)
            .one(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 查找学生在某任务下的提交
    pub async fn find_submission_impl(
        &self,
        task_id: i64,
        student_id: i64,
    ) -> Result<Option<Submission>> {
        let result = Submissions::find()
            .filter(Column::TaskId.eq(task_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询提交失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 列出提交（分页）
    pub async fn list_submissions_with_pagination_impl(
        &self,
        query: SubmissionListQuery,
    ) -> Result<PaginatedResponse<Submission>> {
        let page = query.page.max(1) as u64;
        let size = query.size.clamp(1, 100) as u64;

        let mut select = Submissions::find();

        if let Some(task_id) = query.task_id {
            select = select.filter(Column::TaskId.eq(task_id));
        }

        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }

        // 仅限该教师创建的任务
        if let Some(owner_id) = query.task_owner {
            let owned = Tasks::find()
                .select_only()
                .column(TaskColumn::Id)
                .filter(TaskColumn::CreatedBy.eq(owner_id))
                .into_query();
            select = select.filter(Column::TaskId.in_subquery(owned));
        }

        match query.status {
            Some(SubmissionStatus::Graded) => {
                select = select.filter(Column::IsGraded.eq(true));
            }
            Some(SubmissionStatus::Pending) => {
                select = select.filter(Column::IsGraded.eq(false));
            }
            None => {}
        }

        select = select
            .order_by_desc(Column::SubmittedAt)
            .order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询提交总数失败: {e}")))?;

        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询提交列表失败: {e}")))?
            .into_iter()
            .map(|m| m.into_submission())
            .collect();

        Ok(PaginatedResponse {
            items,
            pagination: PaginationInfo::new(page as i64, size as i64, total as i64),
        })
    }

    /// 学生的全部提交
    pub async fn list_submissions_by_student_impl(
        &self,
        student_id: i64,
    ) -> Result<Vec<Submission>> {
        let results = Submissions::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::SubmittedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询学生提交失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_submission()).collect())
    }

    /// 写入评分（整体覆盖，单条记录）
    pub async fn grade_submission_impl(
        &self,
        submission_id: i64,
        grade: GradeUpdate,
    ) -> Result<Option<Submission>> {
        let Some(existing) = Submissions::find_by_id(submission_id)
            .one(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询提交失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        model.score = Set(Some(grade.score));
        model.feedback = Set(grade.feedback);
        model.is_graded = Set(true);
        model.graded_at = Set(Some(grade.graded_at.timestamp()));
        model.graded_by = Set(Some(grade.graded_by));

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("更新评分失败: {e}")))?;

        Ok(Some(updated.into_submission()))
    }

    /// 提交计数与已评分分数
    pub async fn tally_submissions_impl(
        &self,
        task_id: Option<i64>,
        student_id: Option<i64>,
    ) -> Result<SubmissionTally> {
        let mut select = Submissions::find();
        if let Some(task_id) = task_id {
            select = select.filter(Column::TaskId.eq(task_id));
        }
        if let Some(student_id) = student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }

        let submitted = select
            .clone()
            .count(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("统计提交失败: {e}")))?;

        let graded_scores: Vec<Option<f64>> = select
            .filter(Column::IsGraded.eq(true))
            .select_only()
            .column(Column::Score)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询评分失败: {e}")))?;

        Ok(SubmissionTally {
            submitted: submitted as i64,
            graded_scores: graded_scores.into_iter().flatten().collect(),
        })
    }
}
