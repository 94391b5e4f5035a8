//! 学习小组与成员存储操作

use super::{SeaOrmStorage, is_unique_violation};
use crate::entity::group_students::{
    ActiveModel as MemberActiveModel, Column as MemberColumn, Entity as GroupStudents,
};
use crate::entity::groups::{ActiveModel, Column, Entity as Groups};
use crate::errors::{EduHubError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    groups::{
        entities::{Group, GroupChanges, NewGroup},
        requests::GroupListQuery,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use tracing::debug;

// 并发修改人数时的重试次数
const SEAT_RETRIES: usize = 3;

enum SeatOutcome<T> {
    Done(T),
    Retry,
}

impl SeaOrmStorage {
    pub async fn create_group_impl(&self, req: NewGroup) -> Result<Group> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            name: Set(req.name),
            description: Set(req.description),
            center_id: Set(req.center_id),
            teacher_id: Set(req.teacher_id),
            subject: Set(req.subject),
            max_students: Set(req.max_students),
            current_students: Set(0),
            schedule: Set(req.schedule),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("创建小组失败: {e}")))?;

        Ok(result.into_group())
    }

    pub async fn get_group_by_id_impl(&self, id: i64) -> Result<Option<Group>> {
        let result = Groups::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询小组失败: {e}")))?;

        Ok(result.map(|m| m.into_group()))
    }

    /// 列出小组（分页，可按中心、教师过滤，按名称或科目搜索）
    pub async fn list_groups_with_pagination_impl(
        &self,
        query: GroupListQuery,
    ) -> Result<PaginatedResponse<Group>> {
        let page = query.page.max(1) as u64;
        let size = query.size.clamp(1, 100) as u64;

        let mut select = Groups::find();
        if let Some(center_id) = query.center_id {
            select = select.filter(Column::CenterId.eq(center_id));
        }
        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }
        if let Some(ref search) = query.search {
            let escaped = escape_like_pattern(search);
            select = select.filter(
                Condition::any()
                    .add(Column::Name.contains(&escaped))
                    .add(Column::Subject.contains(&escaped)),
            );
        }

        let paginator = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询小组总数失败: {e}")))?;
        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询小组列表失败: {e}")))?
            .into_iter()
            .map(|m| m.into_group())
            .collect();

        Ok(PaginatedResponse {
            items,
            pagination: PaginationInfo::new(page as i64, size as i64, total as i64),
        })
    }

    /// 中心下的全部小组
    pub async fn list_groups_by_center_impl(&self, center_id: i64) -> Result<Vec<Group>> {
        let results = Groups::find()
            .filter(Column::CenterId.eq(center_id))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询中心小组失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_group()).collect())
    }

    pub async fn update_group_impl(
        &self,
        id: i64,
        changes: GroupChanges,
    ) -> Result<Option<Group>> {
        let Some(existing) = Groups::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询小组失败: {e}")))?
        else {
            return Ok(None);
        };

        if let Some(max) = changes.max_students
            && max < existing.current_students
        {
            return Err(EduHubError::validation(
                "Capacity cannot be lower than the current number of students",
            ));
        }

        let mut model: ActiveModel = existing.into();
        if let Some(name) = changes.name {
            model.name = Set(name);
        }
        if let Some(description) = changes.description {
            model.description = Set(Some(description));
        }
        if let Some(subject) = changes.subject {
            model.subject = Set(Some(subject));
        }
        if let Some(max) = changes.max_students {
            model.max_students = Set(max);
        }
        if let Some(schedule) = changes.schedule {
            model.schedule = Set(Some(schedule));
        }
        if let Some(is_active) = changes.is_active {
            model.is_active = Set(is_active);
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("更新小组失败: {e}")))?;

        Ok(Some(updated.into_group()))
    }

    /// 删除小组（成员记录级联删除）
    pub async fn delete_group_impl(&self, id: i64) -> Result<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| EduHubError::database_operation(format!("开启事务失败: {e}")))?;

        GroupStudents::delete_many()
            .filter(MemberColumn::GroupId.eq(id))
            .exec(&txn)
            .await
            .map_err(|e| EduHubError::database_operation(format!("删除小组成员失败: {e}")))?;

        let result = Groups::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(|e| EduHubError::database_operation(format!("删除小组失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| EduHubError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 加入小组
    ///
    /// 人数更新以读到的 `current_students` 为条件，保证并发加入也不会超过容量。
    pub async fn add_group_student_impl(&self, group_id: i64, student_id: i64) -> Result<Group> {
        for attempt in 1..=SEAT_RETRIES {
            let txn = self
                .db
                .begin()
                .await
                .map_err(|e| EduHubError::database_operation(format!("开启事务失败: {e}")))?;

            match Self::try_take_seat(&txn, group_id, student_id).await {
                Ok(SeatOutcome::Done(group)) => {
                    txn.commit().await.map_err(|e| {
                        EduHubError::database_operation(format!("提交事务失败: {e}"))
                    })?;
                    return Ok(group);
                }
                Ok(SeatOutcome::Retry) => {
                    debug!("Seat count for group {} changed, retry {}", group_id, attempt);
                    Self::rollback(txn).await?;
                }
                Err(e) => {
                    Self::rollback(txn).await?;
                    return Err(e);
                }
            }
        }

        Err(EduHubError::conflict(
            "Group membership is changing too quickly, please retry",
        ))
    }

    async fn try_take_seat(
        txn: &DatabaseTransaction,
        group_id: i64,
        student_id: i64,
    ) -> Result<SeatOutcome<Group>> {
        let Some(group) = Groups::find_by_id(group_id)
            .one(txn)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询小组失败: {e}")))?
        else {
            return Err(EduHubError::not_found("Group not found"));
        };

        if Self::is_member(txn, group_id, student_id).await? {
            return Err(EduHubError::conflict("Student is already in this group"));
        }
        if group.current_students >= group.max_students {
            return Err(EduHubError::capacity_exceeded("Group is full"));
        }

        if !Self::shift_seats(txn, group_id, group.current_students, 1).await? {
            return Ok(SeatOutcome::Retry);
        }

        let member = MemberActiveModel {
            group_id: Set(group_id),
            student_id: Set(student_id),
            joined_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };
        member.insert(txn).await.map_err(|e| {
            if is_unique_violation(&e) {
                EduHubError::conflict("Student is already in this group")
            } else {
                EduHubError::database_operation(format!("加入小组失败: {e}"))
            }
        })?;

        Self::reload_group(txn, group_id).await.map(SeatOutcome::Done)
    }

    /// 移出小组；不是成员时返回 None
    pub async fn remove_group_student_impl(
        &self,
        group_id: i64,
        student_id: i64,
    ) -> Result<Option<Group>> {
        for attempt in 1..=SEAT_RETRIES {
            let txn = self
                .db
                .begin()
                .await
                .map_err(|e| EduHubError::database_operation(format!("开启事务失败: {e}")))?;

            match Self::try_release_seat(&txn, group_id, student_id).await {
                Ok(SeatOutcome::Done(group)) => {
                    txn.commit().await.map_err(|e| {
                        EduHubError::database_operation(format!("提交事务失败: {e}"))
                    })?;
                    return Ok(group);
                }
                Ok(SeatOutcome::Retry) => {
                    debug!("Seat count for group {} changed, retry {}", group_id, attempt);
                    Self::rollback(txn).await?;
                }
                Err(e) => {
                    Self::rollback(txn).await?;
                    return Err(e);
                }
            }
        }

        Err(EduHubError::conflict(
            "Group membership is changing too quickly, please retry",
        ))
    }

    async fn try_release_seat(
        txn: &DatabaseTransaction,
        group_id: i64,
        student_id: i64,
    ) -> Result<SeatOutcome<Option<Group>>> {
        let Some(group) = Groups::find_by_id(group_id)
            .one(txn)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询小组失败: {e}")))?
        else {
            return Ok(SeatOutcome::Done(None));
        };

        let removed = GroupStudents::delete_many()
            .filter(MemberColumn::GroupId.eq(group_id))
            .filter(MemberColumn::StudentId.eq(student_id))
            .exec(txn)
            .await
            .map_err(|e| EduHubError::database_operation(format!("移出小组失败: {e}")))?;
        if removed.rows_affected == 0 {
            return Ok(SeatOutcome::Done(None));
        }

        if !Self::shift_seats(txn, group_id, group.current_students, -1).await? {
            return Ok(SeatOutcome::Retry);
        }

        Self::reload_group(txn, group_id)
            .await
            .map(|group| SeatOutcome::Done(Some(group)))
    }

    /// 小组成员 ID（按加入时间）
    pub async fn list_group_student_ids_impl(&self, group_id: i64) -> Result<Vec<i64>> {
        GroupStudents::find()
            .filter(MemberColumn::GroupId.eq(group_id))
            .order_by_asc(MemberColumn::JoinedAt)
            .order_by_asc(MemberColumn::Id)
            .select_only()
            .column(MemberColumn::StudentId)
            .into_tuple::<i64>()
            .all(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询小组成员失败: {e}")))
    }

    async fn is_member(txn: &DatabaseTransaction, group_id: i64, student_id: i64) -> Result<bool> {
        let count = GroupStudents::find()
            .filter(MemberColumn::GroupId.eq(group_id))
            .filter(MemberColumn::StudentId.eq(student_id))
            .count(txn)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询小组成员失败: {e}")))?;
        Ok(count > 0)
    }

    /// 以 `expected` 为条件调整人数，返回是否成功
    async fn shift_seats(
        txn: &DatabaseTransaction,
        group_id: i64,
        expected: i32,
        delta: i32,
    ) -> Result<bool> {
        let result = Groups::update_many()
            .col_expr(
                Column::CurrentStudents,
                sea_orm::sea_query::Expr::value(expected + delta),
            )
            .col_expr(
                Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::Id.eq(group_id))
            .filter(Column::CurrentStudents.eq(expected))
            .exec(txn)
            .await
            .map_err(|e| EduHubError::database_operation(format!("更新小组人数失败: {e}")))?;
        Ok(result.rows_affected == 1)
    }

    async fn reload_group(txn: &DatabaseTransaction, group_id: i64) -> Result<Group> {
        Groups::find_by_id(group_id)
            .one(txn)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询小组失败: {e}")))?
            .map(|m| m.into_group())
            .ok_or_else(|| EduHubError::not_found("Group not found"))
    }

    async fn rollback(txn: DatabaseTransaction) -> Result<()> {
        txn.rollback()
            .await
            .map_err(|e| EduHubError::database_operation(format!("回滚事务失败: {e}")))
    }
}
