use super::{SeaOrmStorage, is_unique_violation};
use crate::entity::users::{ActiveModel, Column, Entity as Users};
use crate::errors::{EduHubError, Result};
use crate::models::users::entities::{NewUser, User, UserRole};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 创建用户
    pub async fn create_user_impl(&self, req: NewUser) -> Result<User> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            full_name: Set(req.full_name),
            email: Set(req.email),
            password_hash: Set(req.password_hash),
            role: Set(req.role.to_string()),
            status: Set(req.status.to_string()),
            center_id: Set(None),
            last_login: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                EduHubError::conflict("Email is already registered")
            } else {
                EduHubError::database_operation(format!("创建用户失败: {e}"))
            }
        })?;

        Ok(result.into_user())
    }

    /// 通过 ID 获取用户
    pub async fn get_user_by_id_impl(&self, id: i64) -> Result<Option<User>> {
        let result = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 通过邮箱获取用户
    pub async fn get_user_by_email_impl(&self, email: &str) -> Result<Option<User>> {
        let result = Users::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询用户失败: {e}")))?;

        Ok(result.map(|m| m.into_user()))
    }

    /// 批量获取用户
    pub async fn get_users_by_ids_impl(&self, ids: &[i64]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let results = Users::find()
            .filter(Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("批量查询用户失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_user()).collect())
    }

    /// 更新最后登录时间
    pub async fn update_last_login_impl(&self, id: i64) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();
        let result = Users::update_many()
            .col_expr(Column::LastLogin, sea_orm::sea_query::Expr::value(now))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("更新登录时间失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 更新角色
    pub async fn update_user_role_impl(
        &self,
        id: i64,
        role: UserRole,
        center_id: Option<i64>,
    ) -> Result<Option<User>> {
        let Some(existing) = Users::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询用户失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        model.role = Set(role.to_string());
        if center_id.is_some() {
            model.center_id = Set(center_id);
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model
            .update(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("更新用户角色失败: {e}")))?;

        Ok(Some(updated.into_user()))
    }

    /// 统计角色人数
    pub async fn count_users_by_role_impl(&self, role: UserRole) -> Result<u64> {
        Users::find()
            .filter(Column::Role.eq(role.to_string()))
            .count(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("统计用户失败: {e}")))
    }

    /// 中心内指定角色的成员（按姓名排序）
    pub async fn list_center_members_impl(
        &self,
        center_id: i64,
        role: UserRole,
    ) -> Result<Vec<User>> {
        let results = Users::find()
            .filter(Column::CenterId.eq(center_id))
            .filter(Column::Role.eq(role.to_string()))
            .order_by_asc(Column::FullName)
            .all(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询中心成员失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_user()).collect())
    }
}
