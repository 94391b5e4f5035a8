//! 任务存储操作

use super::SeaOrmStorage;
use crate::entity::submissions::{Column as SubmissionColumn, Entity as Submissions};
use crate::entity::tasks::{ActiveModel, Column, Entity as Tasks};
use crate::errors::{EduHubError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    tasks::{
        entities::{NewTask, Task, TaskAttachment, TaskChanges},
        requests::TaskListQuery,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建任务
    pub async fn create_task_impl(&self, req: NewTask) -> Result<Task> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            title: Set(req.title),
            description: Set(req.description),
            deadline: Set(req.deadline.timestamp()),
            created_by: Set(req.created_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("创建任务失败: {e}")))?;

        Ok(result.into_task())
    }

    /// 通过 ID 获取任务
    pub async fn get_task_by_id_impl(&self, id: i64) -> Result<Option<Task>> {
        let result = Tasks::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询任务失败: {e}")))?;

        Ok(result.map(|m| m.into_task()))
    }

    /// 批量获取任务
    pub async fn get_tasks_by_ids_impl(&self, ids: &[i64]) -> Result<Vec<Task>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let results = Tasks::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("批量查询任务失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_task()).collect())
    }

    /// 列出任务（分页）
    pub async fn list_tasks_with_pagination_impl(
        &self,
        query: TaskListQuery,
    ) -> Result<PaginatedResponse<Task>> {
        let page = query.page.max(1) as u64;
        let size = query.size.clamp(1, 100) as u64;

        let mut select = Tasks::find();

        // 搜索条件（标题或描述）
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Title.contains(&escaped))
                    .add(Column::Description.contains(&escaped)),
            );
        }

        select = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询任务总数失败: {e}")))?;

        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询任务列表失败: {e}")))?
            .into_iter()
            .map(|m| m.into_task())
            .collect();

        Ok(PaginatedResponse {
            items,
            pagination: PaginationInfo::new(page as i64, size as i64, total as i64),
        })
    }

    /// 更新任务
    pub async fn update_task_impl(&self, id: i64, changes: TaskChanges) -> Result<Option<Task>> {
        let Some(existing) = Tasks::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询任务失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        if let Some(title) = changes.title {
            model.title = Set(title);
        }
        if let Some(description) = changes.description {
            model.description = Set(description);
        }
        if let Some(deadline) = changes.deadline {
            model.deadline = Set(deadline.timestamp());
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("更新任务失败: {e}")))?;

        Ok(Some(updated.into_task()))
    }

    /// 设置或清除任务附件
    pub async fn set_task_attachment_impl(
        &self,
        id: i64,
        attachment: Option<TaskAttachment>,
    ) -> Result<Option<Task>> {
        let Some(existing) = Tasks::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询任务失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        match attachment {
            Some(a) => {
                model.attachment_storage_id = Set(Some(a.storage_file_id));
                model.attachment_url = Set(Some(a.url));
                model.attachment_name = Set(Some(a.name));
                model.attachment_size = Set(Some(a.size));
                model.attachment_mime_type = Set(Some(a.mime_type));
            }
            None => {
                model.attachment_storage_id = Set(None);
                model.attachment_url = Set(None);
                model.attachment_name = Set(None);
                model.attachment_size = Set(None);
                model.attachment_mime_type = Set(None);
            }
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("更新任务附件失败: {e}")))?;

        Ok(Some(updated.into_task()))
    }

    /// 删除任务及其全部提交
    pub async fn delete_task_impl(&self, id: i64) -> Result<Option<Vec<String>>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| EduHubError::database_operation(format!("开启事务失败: {e}")))?;

        let storage_ids: Vec<String> = Submissions::find()
            .filter(SubmissionColumn::TaskId.eq(id))
            .select_only()
            .column(SubmissionColumn::StorageFileId)
            .into_tuple()
            .all(&txn)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询任务提交失败: {e}")))?;

        Submissions::delete_many()
            .filter(SubmissionColumn::TaskId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| EduHubError::database_operation(format!("删除任务提交失败: {e}")))?;

        let result = Tasks::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| EduHubError::database_operation(format!("删除任务失败: {e}")))?;

        if result.rows_affected == 0 {
            txn.rollback()
                .await
                .map_err(|e| EduHubError::database_operation(format!("回滚事务失败: {e}")))?;
            return Ok(None);
        }

        txn.commit()
            .await
            .map_err(|e| EduHubError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(Some(storage_ids))
    }

    /// 全局任务数
    pub async fn count_tasks_impl(&self) -> Result<u64> {
        Tasks::find()
            .count(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("统计任务失败: {e}")))
    }

    /// 教师创建的全部任务（最新在前）
    pub async fn list_tasks_by_creator_impl(&self, creator_id: i64) -> Result<Vec<Task>> {
        let results = Tasks::find()
            .filter(Column::CreatedBy.eq(creator_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询教师任务失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_task()).collect())
    }
}
