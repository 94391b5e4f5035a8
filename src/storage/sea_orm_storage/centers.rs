//! 教育中心存储操作

use super::{SeaOrmStorage, is_unique_violation};
use crate::entity::centers::{ActiveModel, Column, Entity as Centers};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{EduHubError, Result};
use crate::models::{
    PaginatedResponse, PaginationInfo,
    centers::{
        entities::{Center, CenterChanges, NewCenter},
        requests::CenterListQuery,
    },
    users::entities::UserRole,
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

impl SeaOrmStorage {
    /// 创建中心，并在同一事务中把管理员提升为中心管理员
    pub async fn create_center_impl(&self, req: NewCenter) -> Result<Center> {
        let now = chrono::Utc::now().timestamp();
        let admin_id = req.admin_id;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| EduHubError::database_operation(format!("开启事务失败: {e}")))?;

        let model = ActiveModel {
            name: Set(req.name),
            description: Set(req.description),
            address: Set(req.address),
            phone: Set(req.phone),
            email: Set(req.email),
            website: Set(req.website),
            admin_id: Set(admin_id),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let center = match model.insert(&txn).await {
            Ok(center) => center,
            Err(e) => {
                txn.rollback().await.map_err(|e| {
                    EduHubError::database_operation(format!("回滚事务失败: {e}"))
                })?;
                return Err(if is_unique_violation(&e) {
                    EduHubError::conflict("A center with this name or email already exists")
                } else {
                    EduHubError::database_operation(format!("创建教育中心失败: {e}"))
                });
            }
        };

        let promoted = Users::update_many()
            .col_expr(
                UserColumn::Role,
                sea_orm::sea_query::Expr::value(UserRole::CenterAdmin.to_string()),
            )
            .col_expr(UserColumn::CenterId, sea_orm::sea_query::Expr::value(center.id))
            .col_expr(UserColumn::UpdatedAt, sea_orm::sea_query::Expr::value(now))
            .filter(UserColumn::Id.eq(admin_id))
            .exec(&txn)
            .await
            .map_err(|e| EduHubError::database_operation(format!("设置中心管理员失败: {e}")))?;

        if promoted.rows_affected == 0 {
            txn.rollback()
                .await
                .map_err(|e| EduHubError::database_operation(format!("回滚事务失败: {e}")))?;
            return Err(EduHubError::not_found("Center admin not found"));
        }

        txn.commit()
            .await
            .map_err(|e| EduHubError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(center.into_center())
    }

    pub async fn get_center_by_id_impl(&self, id: i64) -> Result<Option<Center>> {
        let result = Centers::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询教育中心失败: {e}")))?;

        Ok(result.map(|m| m.into_center()))
    }

    /// 列出中心（分页，按名称或地址搜索）
    pub async fn list_centers_with_pagination_impl(
        &self,
        query: CenterListQuery,
    ) -> Result<PaginatedResponse<Center>> {
        let page = query.page.max(1) as u64;
        let size = query.size.clamp(1, 100) as u64;

        let mut select = Centers::find();
        if let Some(ref search) = query.search {
            let escaped = escape_like_pattern(search);
            select = select.filter(
                Condition::any()
                    .add(Column::Name.contains(&escaped))
                    .add(Column::Address.contains(&escaped)),
            );
        }

        let paginator = select
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询中心总数失败: {e}")))?;
        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询中心列表失败: {e}")))?
            .into_iter()
            .map(|m| m.into_center())
            .collect();

        Ok(PaginatedResponse {
            items,
            pagination: PaginationInfo::new(page as i64, size as i64, total as i64),
        })
    }

    pub async fn update_center_impl(
        &self,
        id: i64,
        changes: CenterChanges,
    ) -> Result<Option<Center>> {
        let Some(existing) = Centers::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| EduHubError::database_operation(format!("查询教育中心失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        if let Some(name) = changes.name {
            model.name = Set(name);
        }
        if let Some(description) = changes.description {
            model.description = Set(Some(description));
        }
        if let Some(address) = changes.address {
            model.address = Set(Some(address));
        }
        if let Some(phone) = changes.phone {
            model.phone = Set(Some(phone));
        }
        if let Some(email) = changes.email {
            model.email = Set(Some(email));
        }
        if let Some(website) = changes.website {
            model.website = Set(Some(website));
        }
        if let Some(is_active) = changes.is_active {
            model.is_active = Set(is_active);
        }
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let updated = model.update(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                EduHubError::conflict("A center with this name or email already exists")
            } else {
                EduHubError::database_operation(format!("更新教育中心失败: {e}"))
            }
        })?;

        Ok(Some(updated.into_center()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::{NewUser, UserStatus};
    use crate::storage::sea_orm_storage::tests::memory_storage;

    async fn teacher(storage: &SeaOrmStorage, email: &str) -> i64 {
        storage
            .create_user_impl(NewUser {
                full_name: "Lead Teacher".into(),
                email: email.into(),
                password_hash: "x".into(),
                role: UserRole::Teacher,
                status: UserStatus::Active,
            })
            .await
            .unwrap()
            .id
    }

    fn new_center(name: &str, admin_id: i64) -> NewCenter {
        NewCenter {
            name: name.into(),
            description: None,
            address: Some("12 Harbour Road".into()),
            phone: None,
            email: Some(format!("{}@centers.example.com", name.to_lowercase().replace(' ', "-"))),
            website: None,
            admin_id,
        }
    }

    #[tokio::test]
    async fn test_create_center_promotes_admin() {
        let storage = memory_storage().await;
        let admin_id = teacher(&storage, "lead@example.com").await;

        let center = storage
            .create_center_impl(new_center("North Campus", admin_id))
            .await
            .unwrap();
        assert!(center.is_active);

        let admin = storage.get_user_by_id_impl(admin_id).await.unwrap().unwrap();
        assert_eq!(admin.role, UserRole::CenterAdmin);
        assert_eq!(admin.center_id, Some(center.id));
    }

    #[tokio::test]
    async fn test_duplicate_center_name_is_conflict_and_rolls_back() {
        let storage = memory_storage().await;
        let first = teacher(&storage, "first@example.com").await;
        let second = teacher(&storage, "second@example.com").await;
        storage
            .create_center_impl(new_center("North Campus", first))
            .await
            .unwrap();

        let mut dup = new_center("North Campus", second);
        dup.email = None;
        let err = storage.create_center_impl(dup).await.unwrap_err();
        assert!(matches!(err, EduHubError::Conflict(_)));

        // 失败的创建不会提升管理员
        let untouched = storage.get_user_by_id_impl(second).await.unwrap().unwrap();
        assert_eq!(untouched.role, UserRole::Teacher);
        assert_eq!(untouched.center_id, None);
    }

    #[tokio::test]
    async fn test_list_centers_search() {
        let storage = memory_storage().await;
        let a = teacher(&storage, "a@example.com").await;
        let b = teacher(&storage, "b@example.com").await;
        storage.create_center_impl(new_center("North Campus", a)).await.unwrap();
        storage.create_center_impl(new_center("South Campus", b)).await.unwrap();

        let page = storage
            .list_centers_with_pagination_impl(CenterListQuery {
                page: 1,
                size: 10,
                search: Some("North".into()),
            })
            .await
            .unwrap();
        assert_eq!(page.pagination.total, 1);
        assert_eq!(page.items[0].name, "North Campus");
    }
}
