use std::sync::Arc;

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

use crate::errors::Result;

pub mod sea_orm_storage;

/// 文档存储抽象
///
/// 每个提交相关操作只写一条提交记录，唯一性由存储层的 (task_id, student_id) 唯一索引保证。
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    /// 用户管理方法
    // 创建用户（邮箱重复返回 Conflict）
    async fn create_user(&self, user: NewUser) -> Result<User>;
    // 通过ID获取用户信息
    async fn get_user_by_id(&self, id: i64) -> Result<Option<User>>;
    // 通过邮箱获取用户信息
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    // 批量获取用户
    async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>>;
    // 更新用户最后登录时间
    async fn update_last_login(&self, id: i64) -> Result<bool>;
    // 更新用户角色（管理员操作）
    async fn update_user_role(
        &self,
        id: i64,
        role: UserRole,
        center_id: Option<i64>,
    ) -> Result<Option<User>>;
    // 统计某角色用户数
    async fn count_users_by_role(&self, role: UserRole) -> Result<u64>;
    // 中心内指定角色的用户
    async fn list_center_members(&self, center_id: i64, role: UserRole) -> Result<Vec<User>>;

    /// 教育中心方法
    // 创建中心并把管理员提升为 center_admin（同一事务）
    async fn create_center(&self, center: NewCenter) -> Result<Center>;
    async fn get_center_by_id(&self, id: i64) -> Result<Option<Center>>;
    async fn list_centers_with_pagination(
        &self,
        query: CenterListQuery,
    ) -> Result<PaginatedResponse<Center>>;
    async fn update_center(&self, id: i64, changes: CenterChanges) -> Result<Option<Center>>;

    /// 学习小组方法
    async fn create_group(&self, group: NewGroup) -> Result<Group>;
    async fn get_group_by_id(&self, id: i64) -> Result<Option<Group>>;
    async fn list_groups_with_pagination(
        &self,
        query: GroupListQuery,
    ) -> Result<PaginatedResponse<Group>>;
    async fn list_groups_by_center(&self, center_id: i64) -> Result<Vec<Group>>;
    // 容量低于当前人数返回 Validation
    async fn update_group(&self, id: i64, changes: GroupChanges) -> Result<Option<Group>>;
    async fn delete_group(&self, id: i64) -> Result<bool>;
    // 满员返回 CapacityExceeded，已是成员返回 Conflict
    async fn add_group_student(&self, group_id: i64, student_id: i64) -> Result<Group>;
    // 不是成员时返回 None
    async fn remove_group_student(&self, group_id: i64, student_id: i64)
    -> Result<Option<Group>>;
    async fn list_group_student_ids(&self, group_id: i64) -> Result<Vec<i64>>;

    /// 任务管理方法
    async fn create_task(&self, task: NewTask) -> Result<Task>;
    async fn get_task_by_id(&self, id: i64) -> Result<Option<Task>>;
    async fn get_tasks_by_ids(&self, ids: &[i64]) -> Result<Vec<Task>>;
    async fn list_tasks_with_pagination(
        &self,
        query: TaskListQuery,
    ) -> Result<PaginatedResponse<Task>>;
    async fn update_task(&self, id: i64, changes: TaskChanges) -> Result<Option<Task>>;
    async fn set_task_attachment(
        &self,
        id: i64,
        attachment: Option<TaskAttachment>,
    ) -> Result<Option<Task>>;
    // 删除任务并级联删除其提交，返回被删除提交的存储对象 ID
    async fn delete_task(&self, id: i64) -> Result<Option<Vec<String>>>;
    // 全局任务数
    async fn count_tasks(&self) -> Result<u64>;
    // 教师创建的任务（最新在前）
    async fn list_tasks_by_creator(&self, creator_id: i64) -> Result<Vec<Task>>;

    /// 提交管理方法
    // 创建提交（唯一索引冲突返回 AlreadySubmitted）
    async fn create_submission(&self, submission: NewSubmission) -> Result<Submission>;
    async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>>;
    async fn find_submission(&self, task_id: i64, student_id: i64) -> Result<Option<Submission>>;
    async fn list_submissions_with_pagination(
        &self,
        query: SubmissionListQuery,
    ) -> Result<PaginatedResponse<Submission>>;
    // 学生的全部提交（最新在前）
    async fn list_submissions_by_student(&self, student_id: i64) -> Result<Vec<Submission>>;
    // 整体覆盖评分字段
    async fn grade_submission(&self, id: i64, grade: GradeUpdate) -> Result<Option<Submission>>;
    // 某任务的提交统计
    async fn tally_submissions_for_task(&self, task_id: i64) -> Result<SubmissionTally>;
    // 某学生的提交统计
    async fn tally_submissions_for_student(&self, student_id: i64) -> Result<SubmissionTally>;

    /// 释放连接池
    async fn shutdown(&self);
}

pub async fn create_storage() -> Result<Arc<dyn Storage>> {
    let storage = sea_orm_storage::SeaOrmStorage::new_async().await?;
    Ok(Arc::new(storage))
}
