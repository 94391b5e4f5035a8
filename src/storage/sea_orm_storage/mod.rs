//! SeaORM 存储实现
//!
//! 统一的数据库存储层，支持 SQLite、PostgreSQL 和 MySQL。

mod centers;
mod groups;
mod submissions;
mod tasks;
mod users;

use crate::config::AppConfig;
use crate::errors::{EduHubError, Result};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use std::time::Duration;
use tracing::{info, warn};

/// SeaORM 存储实现
#[derive(Clone)]
pub struct SeaOrmStorage {
    pub(crate) db: DatabaseConnection,
}

impl SeaOrmStorage {
    /// 创建新的 SeaORM 存储实例
    pub async fn new_async() -> Result<Self> {
        let config = AppConfig::get();
        let db_url = Self::build_database_url(&config.database.url)?;

        // 根据数据库类型选择连接方式
        let db = if db_url.starts_with("sqlite://") {
            Self::connect_sqlite(&db_url, config).await?
        } else {
            Self::connect_generic(&db_url, config).await?
        };

        Self::from_connection(db).await
    }

    /// 基于已有连接创建（运行迁移）
    pub async fn from_connection(db: DatabaseConnection) -> Result<Self> {
        Migrator::up(&db, None)
            .await
            .map_err(|e| EduHubError::database_operation(format!("数据库迁移失败: {e}")))?;

        info!("SeaORM storage initialized");

        Ok(Self { db })
    }

    /// SQLite 专用连接（WAL + pragma 优化）
    async fn connect_sqlite(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        use sea_orm::SqlxSqliteConnector;
        use sea_orm::sqlx::sqlite::{
            SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
        };
        use std::str::FromStr;

        let opt = SqliteConnectOptions::from_str(url)
            .map_err(|e| EduHubError::database_config(format!("SQLite URL 解析失败: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(5))
            .pragma("cache_size", "-64000")
            .pragma("temp_store", "memory");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database.pool_size)
            .min_connections(1)
            .test_before_acquire(true)
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(300))
            .connect_with(opt)
            .await
            .map_err(|e| EduHubError::database_connection(format!("SQLite 连接失败: {e}")))?;

        Ok(SqlxSqliteConnector::from_sqlx_sqlite_pool(pool))
    }

    /// 通用连接（PostgreSQL、MySQL 等）
    async fn connect_generic(url: &str, config: &AppConfig) -> Result<DatabaseConnection> {
        let mut opt = ConnectOptions::new(url);
        opt.max_connections(config.database.pool_size)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(config.database.timeout))
            .acquire_timeout(Duration::from_secs(config.database.timeout))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        Database::connect(opt)
            .await
            .map_err(|e| EduHubError::database_connection(format!("无法连接到数据库: {e}")))
    }

    /// 从 URL 自动推断数据库类型并构建连接 URL
    fn build_database_url(url: &str) -> Result<String> {
        if url.starts_with("sqlite:") {
            Ok(url.to_string())
        } else if url.ends_with(".db") || url.ends_with(".sqlite") {
            Ok(format!("sqlite://{url}?mode=rwc"))
        } else if url.starts_with("postgres://")
            || url.starts_with("postgresql://")
            || url.starts_with("mysql://")
            || url.starts_with("mariadb://")
        {
            Ok(url.to_string())
        } else {
            Err(EduHubError::database_config(format!(
                "无法从 URL 推断数据库类型: {url}. 支持: sqlite://, postgres://, mysql://, 或 .db/.sqlite 文件路径"
            )))
        }
    }

    /// 关闭连接池
    pub async fn close(&self) {
        if let Err(e) = self.db.clone().close().await {
            warn!("Failed to close database pool: {e}");
        } else {
            info!("Database pool closed");
        }
    }
}

/// 是否为唯一约束冲突
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

// Storage trait 实现
use crate::models::{
    PaginatedResponse,
    centers::{
        entities::{Center, CenterChanges, NewCenter},
        requests::CenterListQuery,
    },
    groups::{
        entities::{Group, GroupChanges, NewGroup},
        requests::GroupListQuery,
    },
    submissions::{
        entities::{GradeUpdate, NewSubmission, Submission, SubmissionTally},
        requests::SubmissionListQuery,
    },
    tasks::{
        entities::{NewTask, Task, TaskAttachment, TaskChanges},
        requests::TaskListQuery,
    },
    users::entities::{NewUser, User, UserRole},
};
use crate::storage::Storage;
use async_trait::async_trait;

#[async_trait]
impl Storage for SeaOrmStorage {
    // 用户模块
    async fn create_user(&self, user: NewUser) -> Result<User> {
        self.create_user_impl(user).await
    }

    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.get_user_by_id_impl(id).await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.get_user_by_email_impl(email).await
    }

    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        self.get_users_by_ids_impl(ids).await
    }

    async fn update_last_login(&self, id: i64) -> Result<bool> {
        self.update_last_login_impl(id).await
    }

    async fn update_user_role(
        &self,
        id: i64,
        role: UserRole,
        center_id: Option<i64>,
    ) -> Result<Option<User>> {
        self.update_user_role_impl(id, role, center_id).await
    }

    async fn count_users_by_role(&self, role: UserRole) -> Result<u64> {
        self.count_users_by_role_impl(role).await
    }

    async fn list_center_members(&self, center_id: i64, role: UserRole) -> Result<Vec<User>> {
        self.list_center_members_impl(center_id, role).await
    }

    // 教育中心模块
    async fn create_center(&self, center: NewCenter) -> Result<Center> {
        self.create_center_impl(center).await
    }

    async fn get_center_by_id(&self, id: i64) -> Result<Option<Center>> {
        self.get_center_by_id_impl(id).await
    }

    async fn list_centers_with_pagination(
        &self,
        query: CenterListQuery,
    ) -> Result<PaginatedResponse<Center>> {
        self.list_centers_with_pagination_impl(query).await
    }

    async fn update_center(&self, id: i64, changes: CenterChanges) -> Result<Option<Center>> {
        self.update_center_impl(id, changes).await
    }

    // 学习小组模块
    async fn create_group(&self, group: NewGroup) -> Result<Group> {
        self.create_group_impl(group).await
    }

    async fn get_group_by_id(&self, id: i64) -> Result<Option<Group>> {
        self.get_group_by_id_impl(id).await
    }

    async fn list_groups_with_pagination(
        &self,
        query: GroupListQuery,
    ) -> Result<PaginatedResponse<Group>> {
        self.list_groups_with_pagination_impl(query).await
    }

    async fn list_groups_by_center(&self, center_id: i64) -> Result<Vec<Group>> {
        self.list_groups_by_center_impl(center_id).await
    }

    async fn update_group(&self, id: i64, changes: GroupChanges) -> Result<Option<Group>> {
        self.update_group_impl(id, changes).await
    }

    async fn delete_group(&self, id: i64) -> Result<bool> {
        self.delete_group_impl(id).await
    }

    async fn add_group_student(&self, group_id: i64, student_id: i64) -> Result<Group> {
        self.add_group_student_impl(group_id, student_id).await
    }

    async fn remove_group_student(
        &self,
        group_id: i64,
        student_id: i64,
    ) -> Result<Option<Group>> {
        self.remove_group_student_impl(group_id, student_id).await
    }

    async fn list_group_student_ids(&self, group_id: i64) -> Result<Vec<i64>> {
        self.list_group_student_ids_impl(group_id).await
    }

    // 任务模块
    async fn create_task(&self, task: NewTask) -> Result<Task> {
        self.create_task_impl(task).await
    }

    async fn get_task_by_id(&self, id: i64) -> Result<Option<Task>> {
        self.get_task_by_id_impl(id).await
    }

    async fn get_tasks_by_ids(&self, ids: &[i64]) -> Result<Vec<Task>> {
        self.get_tasks_by_ids_impl(ids).await
    }

    async fn list_tasks_with_pagination(
        &self,
        query: TaskListQuery,
    ) -> Result<PaginatedResponse<Task>> {
        self.list_tasks_with_pagination_impl(query).await
    }

    async fn update_task(&self, id: i64, changes: TaskChanges) -> Result<Option<Task>> {
        self.update_task_impl(id, changes).await
    }

    async fn set_task_attachment(
        &self,
        id: i64,
        attachment: Option<TaskAttachment>,
    ) -> Result<Option<Task>> {
        self.set_task_attachment_impl(id, attachment).await
    }

    async fn delete_task(&self, id: i64) -> Result<Option<Vec<String>>> {
        self.delete_task_impl(id).await
    }

    async fn count_tasks(&self) -> Result<u64> {
        self.count_tasks_impl().await
    }

    async fn list_tasks_by_creator(&self, creator_id: i64) -> Result<Vec<Task>> {
        self.list_tasks_by_creator_impl(creator_id).await
    }

    // 提交模块
    async fn create_submission(&self, submission: NewSubmission) -> Result<Submission> {
        self.create_submission_impl(submission).await
    }

    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
        self.get_submission_by_id_impl(id).await
    }

    async fn find_submission(&self, task_id: i64, student_id: i64) -> Result<Option<Submission>> {
        self.find_submission_impl(task_id, student_id).await
    }

    async fn list_submissions_with_pagination(
        &self,
        query: SubmissionListQuery,
    ) -> Result<PaginatedResponse<Submission>> {
        self.list_submissions_with_pagination_impl(query).await
    }

    async fn list_submissions_by_student(&self, student_id: i64) -> Result<Vec<Submission>> {
        self.list_submissions_by_student_impl(student_id).await
    }

    async fn grade_submission(&self, id: i64, grade: GradeUpdate) -> Result<Option<Submission>> {
        self.grade_submission_impl(id, grade).await
    }

    async fn tally_submissions_for_task(&self, task_id: i64) -> Result<SubmissionTally> {
        self.tally_submissions_impl(Some(task_id), None).await
    }

    async fn tally_submissions_for_student(&self, student_id: i64) -> Result<SubmissionTally> {
        self.tally_submissions_impl(None, Some(student_id)).await
    }

    async fn shutdown(&self) {
        self.close().await;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 内存 SQLite（单连接，已迁移）
    pub(crate) async fn memory_storage() -> SeaOrmStorage {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);
        let db = Database::connect(opt).await.unwrap();
        SeaOrmStorage::from_connection(db).await.unwrap()
    }

    #[test]
    fn test_build_database_url() {
        assert_eq!(
            SeaOrmStorage::build_database_url("eduhub.db").unwrap(),
            "sqlite://eduhub.db?mode=rwc"
        );
        assert_eq!(
            SeaOrmStorage::build_database_url("postgres://u:p@localhost/edu").unwrap(),
            "postgres://u:p@localhost/edu"
        );
        assert!(SeaOrmStorage::build_database_url("redis://localhost").is_err());
    }
}
