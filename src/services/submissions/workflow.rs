//! 提交工作流引擎
//!
//! 负责学生提交与教师评分的完整生命周期：
//!
//! - 提交：角色门 → 任务存在 → 截止时间 → 唯一性 → 上传到存储网关 → 写入提交记录。
//!   先上传后写库，上传失败或超时都不会留下提交记录。
//! - 评分：角色门 → 提交存在 → 任务所有权 → 禁止自评 → 整体覆盖评分字段。
//!
//! 引擎不读取全局配置，上传策略和超时都由构造函数注入。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::errors::{EduHubError, Result};
use crate::gateway::{StorageGateway, UploadRequest};
use crate::middlewares::capability::{Operation, authorize};
use crate::models::FieldIssue;
use crate::models::submissions::{
    entities::{GradeUpdate, NewSubmission, StudentProgress, Submission, SubmissionStatus},
    requests::{GradeSubmissionRequest, SubmissionListQuery},
    responses::{
        MySubmissionsResponse, SubmissionListResponse, SubmissionResponse, SubmissionTaskInfo,
    },
};
use crate::models::tasks::entities::Task;
use crate::models::users::entities::{User, UserRole, UserSummary};
use crate::storage::Storage;
use crate::utils::upload_filter::{IncomingFile, UploadPolicy, UploadRejection, validate_upload};
use crate::utils::validate::{FieldIssues, validate_feedback, validate_score};

/// 发起操作的用户
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub id: i64,
    pub role: UserRole,
}

impl From<&User> for Caller {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            role: user.role,
        }
    }
}

/// 已通过上传过滤的文件，只能由 [`SubmissionWorkflow::screen_upload`] 构造
#[derive(Debug)]
pub struct ScreenedUpload(IncomingFile);

impl ScreenedUpload {
    pub fn file(&self) -> &IncomingFile {
        &self.0
    }
}

/// 已校验的评分输入
#[derive(Debug, Clone, PartialEq)]
pub struct GradeInput {
    score: f64,
    feedback: String,
}

impl GradeInput {
    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn feedback(&self) -> &str {
        &self.feedback
    }
}

impl TryFrom<GradeSubmissionRequest> for GradeInput {
    type Error = Vec<FieldIssue>;

    fn try_from(req: GradeSubmissionRequest) -> std::result::Result<Self, Self::Error> {
        let mut issues = FieldIssues::new();
        issues
            .check("score", validate_score(req.score))
            .check("feedback", validate_feedback(req.feedback.as_deref()));
        issues.into_result()?;

        Ok(Self {
            score: req.score,
            feedback: req
                .feedback
                .map(|f| f.trim().to_string())
                .unwrap_or_default(),
        })
    }
}

pub struct SubmissionWorkflow {
    storage: Arc<dyn Storage>,
    gateway: Arc<dyn StorageGateway>,
    policy: UploadPolicy,
    upload_timeout: Duration,
    folder: String,
}

impl SubmissionWorkflow {
    pub fn new(
        storage: Arc<dyn Storage>,
        gateway: Arc<dyn StorageGateway>,
        policy: UploadPolicy,
        upload_timeout: Duration,
        folder: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            gateway,
            policy,
            upload_timeout,
            folder: folder.into(),
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// 纯校验，不做任何 I/O
    pub fn screen_upload(
        &self,
        file: Option<IncomingFile>,
    ) -> std::result::Result<ScreenedUpload, UploadRejection> {
        validate_upload(file.as_ref(), &self.policy)?;
        file.map(ScreenedUpload).ok_or(UploadRejection::Missing)
    }

    /// 学生提交作业
    pub async fn submit(
        &self,
        caller: Caller,
        task_id: i64,
        upload: ScreenedUpload,
    ) -> Result<SubmissionResponse> {
        authorize(Operation::SubmitAssignment, caller.role)?;

        let task = self.load_task(task_id).await?;

        if !task.accepts_submissions_at(Utc::now()) {
            info!(
                "Submission rejected: task {} deadline passed (student {})",
                task_id, caller.id
            );
            return Err(EduHubError::deadline_expired(
                "The deadline for this task has passed",
            ));
        }

        if self
            .storage
            .find_submission(task_id, caller.id)
            .await?
            .is_some()
        {
            return Err(EduHubError::already_submitted(
                "You have already submitted this task",
            ));
        }

        let file = upload.0;
        let original_name = file.original_name.clone();
        let request = UploadRequest {
            bytes: file.bytes,
            folder: self.folder.clone(),
            original_name: file.original_name,
            mime_type: file.mime_type,
        };

        let stored = match tokio::time::timeout(self.upload_timeout, self.gateway.upload(request))
            .await
        {
            Ok(Ok(stored)) => stored,
            Ok(Err(err)) => {
                warn!(
                    "Upload failed for task {} (student {}): {}",
                    task_id, caller.id, err
                );
                return Err(err.into());
            }
            Err(_) => {
                warn!(
                    "Upload timed out after {:?} for task {} (student {})",
                    self.upload_timeout, task_id, caller.id
                );
                return Err(EduHubError::upstream_unavailable(
                    "File storage did not respond in time",
                ));
            }
        };

        let new_submission = NewSubmission {
            task_id,
            student_id: caller.id,
            file_url: stored.url,
            file_name: stored.name,
            original_name,
            storage_file_id: stored.storage_id.clone(),
            file_size: stored.size,
            mime_type: stored.mime_type,
            submitted_at: Utc::now(),
        };

        let submission = match self.storage.create_submission(new_submission).await {
            Ok(submission) => submission,
            Err(err) => {
                // 写库失败时清理已上传的对象
                if let Err(cleanup) = self.gateway.delete(&stored.storage_id).await {
                    warn!(
                        "Failed to remove orphaned object {}: {}",
                        stored.storage_id, cleanup
                    );
                } else {
                    warn!("Removed orphaned object {}", stored.storage_id);
                }
                return Err(err);
            }
        };

        info!(
            "Submission {} created for task {} by student {}",
            submission.id, task_id, caller.id
        );

        // 记录已落库，摘要查询失败不影响结果
        let student = match self.storage.get_user_by_id(caller.id).await {
            Ok(student) => student.as_ref().map(UserSummary::from),
            Err(e) => {
                warn!("Failed to load student summary for submission {}: {}", submission.id, e);
                None
            }
        };
        Ok(SubmissionResponse {
            submission,
            task: Some(SubmissionTaskInfo::from(&task)),
            student,
        })
    }

    /// 教师评分（重复评分整体覆盖）
    pub async fn grade(
        &self,
        caller: Caller,
        submission_id: i64,
        input: GradeInput,
    ) -> Result<SubmissionResponse> {
        authorize(Operation::GradeSubmission, caller.role)?;

        let submission = self.load_submission(submission_id).await?;
        let task = self.load_task(submission.task_id).await?;

        if !task.is_owned_by(caller.id) {
            return Err(EduHubError::authorization(
                "Only the creator of the task can grade its submissions",
            ));
        }
        if submission.student_id == caller.id {
            return Err(EduHubError::self_grading(
                "You cannot grade your own submission",
            ));
        }

        let update = GradeUpdate {
            score: input.score,
            feedback: input.feedback,
            graded_by: caller.id,
            graded_at: Utc::now(),
        };
        let graded = self
            .storage
            .grade_submission(submission_id, update)
            .await?
            .ok_or_else(|| EduHubError::not_found("Submission not found"))?;

        info!(
            "Submission {} graded by {} with score {}",
            submission_id, caller.id, input.score
        );

        let student = self.storage.get_user_by_id(graded.student_id).await?;
        Ok(SubmissionResponse {
            submission: graded,
            task: Some(SubmissionTaskInfo::from(&task)),
            student: student.as_ref().map(UserSummary::from),
        })
    }

    /// 某任务的提交：学生只能看到自己的，教师必须是任务创建者
    pub async fn list_for_task(
        &self,
        caller: Caller,
        task_id: i64,
        page: i64,
        size: i64,
    ) -> Result<SubmissionListResponse> {
        authorize(Operation::ListTaskSubmissions, caller.role)?;

        let task = self.load_task(task_id).await?;

        let mut query = SubmissionListQuery {
            page,
            size,
            task_id: Some(task_id),
            ..Default::default()
        };
        match caller.role {
            UserRole::Student => query.student_id = Some(caller.id),
            _ if task.is_owned_by(caller.id) => {}
            _ => {
                return Err(EduHubError::authorization(
                    "You can only view submissions of your own tasks",
                ));
            }
        }

        let page = self.storage.list_submissions_with_pagination(query).await?;
        let submissions = self.enrich(page.items).await?;
        Ok(SubmissionListResponse {
            submissions,
            pagination: page.pagination,
        })
    }

    /// 单个提交：提交者本人或任务创建者
    pub async fn get_single(&self, caller: Caller, submission_id: i64) -> Result<SubmissionResponse> {
        authorize(Operation::ReadSubmission, caller.role)?;

        let submission = self.load_submission(submission_id).await?;
        let task = self.load_task(submission.task_id).await?;

        let allowed = match caller.role {
            UserRole::Student => submission.student_id == caller.id,
            UserRole::Teacher => task.is_owned_by(caller.id),
            _ => false,
        };
        if !allowed {
            return Err(EduHubError::authorization(
                "You do not have access to this submission",
            ));
        }

        let student = self.storage.get_user_by_id(submission.student_id).await?;
        Ok(SubmissionResponse {
            submission,
            task: Some(SubmissionTaskInfo::from(&task)),
            student: student.as_ref().map(UserSummary::from),
        })
    }

    /// 学生学习进度
    pub async fn progress(&self, caller: Caller) -> Result<StudentProgress> {
        authorize(Operation::ViewProgress, caller.role)?;

        let total_tasks = self.storage.count_tasks().await? as i64;
        let tally = self.storage.tally_submissions_for_student(caller.id).await?;
        Ok(StudentProgress::compute(
            total_tasks,
            tally.submitted,
            &tally.graded_scores,
        ))
    }

    /// 学生自己的全部提交
    pub async fn my_submissions(&self, caller: Caller) -> Result<MySubmissionsResponse> {
        authorize(Operation::ListMySubmissions, caller.role)?;

        let submissions = self.storage.list_submissions_by_student(caller.id).await?;
        Ok(MySubmissionsResponse {
            submissions: self.enrich(submissions).await?,
        })
    }

    /// 教师名下所有任务的提交
    pub async fn list_all(
        &self,
        caller: Caller,
        page: i64,
        size: i64,
        status: Option<SubmissionStatus>,
    ) -> Result<SubmissionListResponse> {
        authorize(Operation::ListAllSubmissions, caller.role)?;

        let query = SubmissionListQuery {
            page,
            size,
            task_owner: Some(caller.id),
            status,
            ..Default::default()
        };
        let page = self.storage.list_submissions_with_pagination(query).await?;
        let submissions = self.enrich(page.items).await?;
        Ok(SubmissionListResponse {
            submissions,
            pagination: page.pagination,
        })
    }

    async fn load_task(&self, task_id: i64) -> Result<Task> {
        self.storage
            .get_task_by_id(task_id)
            .await?
            .ok_or_else(|| EduHubError::not_found("Task not found"))
    }

    async fn load_submission(&self, submission_id: i64) -> Result<Submission> {
        self.storage
            .get_submission_by_id(submission_id)
            .await?
            .ok_or_else(|| EduHubError::not_found("Submission not found"))
    }

    // 批量补充任务与学生摘要
    async fn enrich(&self, submissions: Vec<Submission>) -> Result<Vec<SubmissionResponse>> {
        if submissions.is_empty() {
            return Ok(Vec::new());
        }

        let task_ids: Vec<i64> = submissions
            .iter()
            .map(|s| s.task_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let student_ids: Vec<i64> = submissions
            .iter()
            .map(|s| s.student_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let tasks: HashMap<i64, SubmissionTaskInfo> = self
            .storage
            .get_tasks_by_ids(&task_ids)
            .await?
            .iter()
            .map(|t| (t.id, SubmissionTaskInfo::from(t)))
            .collect();
        let students: HashMap<i64, UserSummary> = self
            .storage
            .get_users_by_ids(&student_ids)
            .await?
            .iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect();

        Ok(submissions
            .into_iter()
            .map(|submission| SubmissionResponse {
                task: tasks.get(&submission.task_id).cloned(),
                student: students.get(&submission.student_id).cloned(),
                submission,
            })
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::gateway::{GatewayError, StoredObject};
    use crate::models::centers::{
        entities::{Center, CenterChanges, NewCenter},
        requests::CenterListQuery,
    };
    use crate::models::groups::{
        entities::{Group, GroupChanges, NewGroup},
        requests::GroupListQuery,
    };
    use crate::models::{PaginatedResponse, PaginationInfo};
    use crate::models::submissions::entities::SubmissionTally;
    use crate::models::tasks::{
        entities::{NewTask, TaskAttachment, TaskChanges},
        requests::TaskListQuery,
    };
    use crate::models::users::entities::{NewUser, UserStatus};
    use chrono::Duration as ChronoDuration;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PDF_BYTES: &[u8] = b"%PDF-1.4 homework";

    /// 内存存储，保持 (task_id, student_id) 唯一
    #[derive(Default)]
    pub(crate) struct MemoryStorage {
        users: Mutex<Vec<User>>,
        tasks: Mutex<Vec<Task>>,
        submissions: Mutex<Vec<Submission>>,
        centers: Mutex<Vec<Center>>,
        groups: Mutex<Vec<Group>>,
        // (group_id, student_id)
        members: Mutex<Vec<(i64, i64)>>,
    }

    fn page<T: ts_rs::TS>(items: Vec<T>, page: i64, size: i64) -> PaginatedResponse<T> {
        let total = items.len() as i64;
        let items = items
            .into_iter()
            .skip(((page - 1) * size) as usize)
            .take(size as usize)
            .collect();
        PaginatedResponse {
            items,
            pagination: PaginationInfo::new(page, size, total),
        }
    }

    impl MemoryStorage {
        pub(crate) fn add_user(&self, full_name: &str, role: UserRole) -> User {
            let mut users = self.users.lock().unwrap();
            let now = Utc::now();
            let user = User {
                id: users.len() as i64 + 1,
                full_name: full_name.to_string(),
                email: format!("{}@example.com", full_name.to_lowercase()),
                password_hash: String::new(),
                role,
                status: UserStatus::Active,
                center_id: None,
                last_login: None,
                created_at: now,
                updated_at: now,
            };
            users.push(user.clone());
            user
        }

        pub(crate) fn add_task(&self, owner: i64, deadline: chrono::DateTime<Utc>) -> Task {
            let mut tasks = self.tasks.lock().unwrap();
            let now = Utc::now();
            let task = Task {
                id: tasks.len() as i64 + 1,
                title: "Essay".to_string(),
                description: "Write a short essay".to_string(),
                deadline,
                created_by: owner,
                attachment: None,
                created_at: now,
                updated_at: now,
            };
            tasks.push(task.clone());
            task
        }

        pub(crate) fn submissions_for(&self, task_id: i64, student_id: i64) -> Vec<Submission> {
            self.submissions
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.task_id == task_id && s.student_id == student_id)
                .cloned()
                .collect()
        }

        fn page_of(&self, mut items: Vec<Submission>, page: i64, size: i64) -> PaginatedResponse<Submission> {
            items.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at).then(b.id.cmp(&a.id)));
            let total = items.len() as i64;
            let items = items
                .into_iter()
                .skip(((page - 1) * size) as usize)
                .take(size as usize)
                .collect();
            PaginatedResponse {
                items,
                pagination: PaginationInfo::new(page, size, total),
            }
        }
    }

    #[async_trait::async_trait]
    impl Storage for MemoryStorage {
        async fn create_user(&self, user: NewUser) -> Result<User> {
            let created = self.add_user(&user.full_name, user.role);
            Ok(created)
        }

        async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
            Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
        }

        async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.email == email)
                .cloned())
        }

        async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .filter(|u| ids.contains(&u.id))
                .cloned()
                .collect())
        }

        async fn update_last_login(&self, _id: i64) -> Result<bool> {
            Ok(true)
        }

        async fn update_user_role(
            &self,
            id: i64,
            role: UserRole,
            center_id: Option<i64>,
        ) -> Result<Option<User>> {
            let mut users = self.users.lock().unwrap();
            Ok(users.iter_mut().find(|u| u.id == id).map(|u| {
                u.role = role;
                u.center_id = center_id;
                u.clone()
            }))
        }

        async fn count_users_by_role(&self, role: UserRole) -> Result<u64> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .filter(|u| u.role == role)
                .count() as u64)
        }

        async fn list_center_members(&self, center_id: i64, role: UserRole) -> Result<Vec<User>> {
            let mut members: Vec<User> = self
                .users
                .lock()
                .unwrap()
                .iter()
                .filter(|u| u.center_id == Some(center_id) && u.role == role)
                .cloned()
                .collect();
            members.sort_by(|a, b| a.full_name.cmp(&b.full_name));
            Ok(members)
        }

        async fn create_center(&self, new: NewCenter) -> Result<Center> {
            let mut centers = self.centers.lock().unwrap();
            if centers.iter().any(|c| c.name == new.name) {
                return Err(EduHubError::conflict("A center with this name already exists"));
            }
            let mut users = self.users.lock().unwrap();
            let Some(admin) = users.iter_mut().find(|u| u.id == new.admin_id) else {
                return Err(EduHubError::not_found("Center admin not found"));
            };
            let now = Utc::now();
            let center = Center {
                id: centers.len() as i64 + 1,
                name: new.name,
                description: new.description,
                address: new.address,
                phone: new.phone,
                email: new.email,
                website: new.website,
                admin_id: new.admin_id,
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            admin.role = UserRole::CenterAdmin;
            admin.center_id = Some(center.id);
            centers.push(center.clone());
            Ok(center)
        }

        async fn get_center_by_id(&self, id: i64) -> Result<Option<Center>> {
            Ok(self.centers.lock().unwrap().iter().find(|c| c.id == id).cloned())
        }

        async fn list_centers_with_pagination(
            &self,
            query: CenterListQuery,
        ) -> Result<PaginatedResponse<Center>> {
            let mut items: Vec<Center> = self
                .centers
                .lock()
                .unwrap()
                .iter()
                .filter(|c| query.search.as_deref().is_none_or(|q| c.name.contains(q)))
                .cloned()
                .collect();
            items.reverse();
            Ok(page(items, query.page, query.size))
        }

        async fn update_center(&self, id: i64, changes: CenterChanges) -> Result<Option<Center>> {
            let mut centers = self.centers.lock().unwrap();
            Ok(centers.iter_mut().find(|c| c.id == id).map(|c| {
                if let Some(name) = changes.name {
                    c.name = name;
                }
                if changes.description.is_some() {
                    c.description = changes.description;
                }
                if changes.address.is_some() {
                    c.address = changes.address;
                }
                if changes.phone.is_some() {
                    c.phone = changes.phone;
                }
                if changes.email.is_some() {
                    c.email = changes.email;
                }
                if changes.website.is_some() {
                    c.website = changes.website;
                }
                if let Some(is_active) = changes.is_active {
                    c.is_active = is_active;
                }
                c.clone()
            }))
        }

        async fn create_group(&self, new: NewGroup) -> Result<Group> {
            let mut groups = self.groups.lock().unwrap();
            let now = Utc::now();
            let group = Group {
                id: groups.len() as i64 + 1,
                name: new.name,
                description: new.description,
                center_id: new.center_id,
                teacher_id: new.teacher_id,
                subject: new.subject,
                max_students: new.max_students,
                current_students: 0,
                schedule: new.schedule,
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            groups.push(group.clone());
            Ok(group)
        }

        async fn get_group_by_id(&self, id: i64) -> Result<Option<Group>> {
            Ok(self.groups.lock().unwrap().iter().find(|g| g.id == id).cloned())
        }

        async fn list_groups_with_pagination(
            &self,
            query: GroupListQuery,
        ) -> Result<PaginatedResponse<Group>> {
            let mut items: Vec<Group> = self
                .groups
                .lock()
                .unwrap()
                .iter()
                .filter(|g| query.center_id.is_none_or(|id| g.center_id == Some(id)))
                .filter(|g| query.teacher_id.is_none_or(|id| g.teacher_id == id))
                .filter(|g| query.search.as_deref().is_none_or(|q| g.name.contains(q)))
                .cloned()
                .collect();
            items.reverse();
            Ok(page(items, query.page, query.size))
        }

        async fn list_groups_by_center(&self, center_id: i64) -> Result<Vec<Group>> {
            Ok(self
                .groups
                .lock()
                .unwrap()
                .iter()
                .filter(|g| g.center_id == Some(center_id))
                .cloned()
                .collect())
        }

        async fn update_group(&self, id: i64, changes: GroupChanges) -> Result<Option<Group>> {
            let mut groups = self.groups.lock().unwrap();
            let Some(group) = groups.iter_mut().find(|g| g.id == id) else {
                return Ok(None);
            };
            if let Some(max) = changes.max_students {
                if max < group.current_students {
                    return Err(EduHubError::validation(
                        "Capacity cannot be lower than the current number of students",
                    ));
                }
                group.max_students = max;
            }
            if let Some(name) = changes.name {
                group.name = name;
            }
            if changes.description.is_some() {
                group.description = changes.description;
            }
            if changes.subject.is_some() {
                group.subject = changes.subject;
            }
            if changes.schedule.is_some() {
                group.schedule = changes.schedule;
            }
            if let Some(is_active) = changes.is_active {
                group.is_active = is_active;
            }
            Ok(Some(group.clone()))
        }

        async fn delete_group(&self, id: i64) -> Result<bool> {
            self.members.lock().unwrap().retain(|(g, _)| *g != id);
            let mut groups = self.groups.lock().unwrap();
            let before = groups.len();
            groups.retain(|g| g.id != id);
            Ok(groups.len() < before)
        }

        async fn add_group_student(&self, group_id: i64, student_id: i64) -> Result<Group> {
            let mut groups = self.groups.lock().unwrap();
            let mut members = self.members.lock().unwrap();
            let Some(group) = groups.iter_mut().find(|g| g.id == group_id) else {
                return Err(EduHubError::not_found("Group not found"));
            };
            if members.contains(&(group_id, student_id)) {
                return Err(EduHubError::conflict("Student is already in this group"));
            }
            if group.current_students >= group.max_students {
                return Err(EduHubError::capacity_exceeded("Group is full"));
            }
            members.push((group_id, student_id));
            group.current_students += 1;
            Ok(group.clone())
        }

        async fn remove_group_student(
            &self,
            group_id: i64,
            student_id: i64,
        ) -> Result<Option<Group>> {
            let mut groups = self.groups.lock().unwrap();
            let mut members = self.members.lock().unwrap();
            let Some(group) = groups.iter_mut().find(|g| g.id == group_id) else {
                return Ok(None);
            };
            let before = members.len();
            members.retain(|m| *m != (group_id, student_id));
            if members.len() == before {
                return Ok(None);
            }
            group.current_students -= 1;
            Ok(Some(group.clone()))
        }

        async fn list_group_student_ids(&self, group_id: i64) -> Result<Vec<i64>> {
            Ok(self
                .members
                .lock()
                .unwrap()
                .iter()
                .filter(|(g, _)| *g == group_id)
                .map(|(_, s)| *s)
                .collect())
        }

        async fn create_task(&self, task: NewTask) -> Result<Task> {
            Ok(self.add_task(task.created_by, task.deadline))
        }

        async fn get_task_by_id(&self, id: i64) -> Result<Option<Task>> {
            Ok(self.tasks.lock().unwrap().iter().find(|t| t.id == id).cloned())
        }

        async fn get_tasks_by_ids(&self, ids: &[i64]) -> Result<Vec<Task>> {
            Ok(self
                .tasks
                .lock()
                .unwrap()
                .iter()
                .filter(|t| ids.contains(&t.id))
                .cloned()
                .collect())
        }

        async fn list_tasks_with_pagination(
            &self,
            query: TaskListQuery,
        ) -> Result<PaginatedResponse<Task>> {
            let tasks = self.tasks.lock().unwrap().clone();
            let total = tasks.len() as i64;
            Ok(PaginatedResponse {
                items: tasks,
                pagination: PaginationInfo::new(query.page, query.size, total),
            })
        }

        async fn update_task(&self, id: i64, changes: TaskChanges) -> Result<Option<Task>> {
            let mut tasks = self.tasks.lock().unwrap();
            Ok(tasks.iter_mut().find(|t| t.id == id).map(|t| {
                if let Some(deadline) = changes.deadline {
                    t.deadline = deadline;
                }
                t.clone()
            }))
        }

        async fn set_task_attachment(
            &self,
            id: i64,
            attachment: Option<TaskAttachment>,
        ) -> Result<Option<Task>> {
            let mut tasks = self.tasks.lock().unwrap();
            Ok(tasks.iter_mut().find(|t| t.id == id).map(|t| {
                t.attachment = attachment;
                t.clone()
            }))
        }

        async fn delete_task(&self, id: i64) -> Result<Option<Vec<String>>> {
            let mut tasks = self.tasks.lock().unwrap();
            let before = tasks.len();
            tasks.retain(|t| t.id != id);
            if tasks.len() == before {
                return Ok(None);
            }
            let mut submissions = self.submissions.lock().unwrap();
            let removed = submissions
                .iter()
                .filter(|s| s.task_id == id)
                .map(|s| s.storage_file_id.clone())
                .collect();
            submissions.retain(|s| s.task_id != id);
            Ok(Some(removed))
        }

        async fn count_tasks(&self) -> Result<u64> {
            Ok(self.tasks.lock().unwrap().len() as u64)
        }

        async fn list_tasks_by_creator(&self, creator_id: i64) -> Result<Vec<Task>> {
            let mut tasks: Vec<Task> = self
                .tasks
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.created_by == creator_id)
                .cloned()
                .collect();
            tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(tasks)
        }

        async fn create_submission(&self, new: NewSubmission) -> Result<Submission> {
            let mut submissions = self.submissions.lock().unwrap();
            if submissions
                .iter()
                .any(|s| s.task_id == new.task_id && s.student_id == new.student_id)
            {
                return Err(EduHubError::already_submitted(
                    "You have already submitted this task",
                ));
            }
            let submission = Submission {
                id: submissions.len() as i64 + 1,
                task_id: new.task_id,
                student_id: new.student_id,
                file_url: new.file_url,
                file_name: new.file_name,
                original_name: new.original_name,
                storage_file_id: new.storage_file_id,
                file_size: new.file_size,
                mime_type: new.mime_type,
                score: None,
                feedback: String::new(),
                is_graded: false,
                submitted_at: new.submitted_at,
                graded_at: None,
                graded_by: None,
            };
            submissions.push(submission.clone());
            Ok(submission)
        }

        async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
            Ok(self
                .submissions
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.id == id)
                .cloned())
        }

        async fn find_submission(
            &self,
            task_id: i64,
            student_id: i64,
        ) -> Result<Option<Submission>> {
            Ok(self.submissions_for(task_id, student_id).into_iter().next())
        }

        async fn list_submissions_with_pagination(
            &self,
            query: SubmissionListQuery,
        ) -> Result<PaginatedResponse<Submission>> {
            let owned: Vec<i64> = match query.task_owner {
                Some(owner) => self
                    .tasks
                    .lock()
                    .unwrap()
                    .iter()
                    .filter(|t| t.created_by == owner)
                    .map(|t| t.id)
                    .collect(),
                None => Vec::new(),
            };
            let items = self
                .submissions
                .lock()
                .unwrap()
                .iter()
                .filter(|s| query.task_id.is_none_or(|id| s.task_id == id))
                .filter(|s| query.student_id.is_none_or(|id| s.student_id == id))
                .filter(|s| query.task_owner.is_none() || owned.contains(&s.task_id))
                .filter(|s| query.status.is_none_or(|status| s.status() == status))
                .cloned()
                .collect();
            Ok(self.page_of(items, query.page, query.size))
        }

        async fn list_submissions_by_student(&self, student_id: i64) -> Result<Vec<Submission>> {
            let items = self
                .submissions
                .lock()
                .unwrap()
                .iter()
                .filter(|s| s.student_id == student_id)
                .cloned()
                .collect();
            Ok(self.page_of(items, 1, i64::MAX / 2).items)
        }

        async fn grade_submission(&self, id: i64, grade: GradeUpdate) -> Result<Option<Submission>> {
            let mut submissions = self.submissions.lock().unwrap();
            Ok(submissions.iter_mut().find(|s| s.id == id).map(|s| {
                s.score = Some(grade.score);
                s.feedback = grade.feedback;
                s.is_graded = true;
                s.graded_by = Some(grade.graded_by);
                s.graded_at = Some(grade.graded_at);
                s.clone()
            }))
        }

        async fn tally_submissions_for_task(&self, task_id: i64) -> Result<SubmissionTally> {
            let submissions = self.submissions.lock().unwrap();
            let matching: Vec<&Submission> =
                submissions.iter().filter(|s| s.task_id == task_id).collect();
            Ok(SubmissionTally {
                submitted: matching.len() as i64,
                graded_scores: matching.iter().filter_map(|s| s.score).collect(),
            })
        }

        async fn tally_submissions_for_student(&self, student_id: i64) -> Result<SubmissionTally> {
            let submissions = self.submissions.lock().unwrap();
            let matching: Vec<&Submission> = submissions
                .iter()
                .filter(|s| s.student_id == student_id)
                .collect();
            Ok(SubmissionTally {
                submitted: matching.len() as i64,
                graded_scores: matching.iter().filter_map(|s| s.score).collect(),
            })
        }

        async fn shutdown(&self) {}
    }

    #[derive(Clone, Copy)]
    pub(crate) enum GatewayBehavior {
        Succeed,
        Fail,
        Hang,
    }

    /// 记录调用的网关替身
    pub(crate) struct RecordingGateway {
        behavior: GatewayBehavior,
        pub(crate) uploads: AtomicUsize,
        pub(crate) deleted: Mutex<Vec<String>>,
    }

    impl RecordingGateway {
        pub(crate) fn new(behavior: GatewayBehavior) -> Self {
            Self {
                behavior,
                uploads: AtomicUsize::new(0),
                deleted: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn upload_count(&self) -> usize {
            self.uploads.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl StorageGateway for RecordingGateway {
        async fn upload(&self, request: UploadRequest) -> std::result::Result<StoredObject, GatewayError> {
            let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
            match self.behavior {
                GatewayBehavior::Succeed => Ok(StoredObject {
                    storage_id: format!("obj-{n}"),
                    url: self.view_url(&format!("obj-{n}")),
                    name: format!("{}/{}", request.folder, request.original_name),
                    size: request.bytes.len() as i64,
                    mime_type: request.mime_type,
                }),
                GatewayBehavior::Fail => Err(GatewayError::QuotaExceeded("bucket full".into())),
                GatewayBehavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Err(GatewayError::Timeout)
                }
            }
        }

        async fn info(&self, storage_id: &str) -> std::result::Result<StoredObject, GatewayError> {
            Err(GatewayError::Rejected {
                status: 404,
                message: format!("{storage_id} not found"),
            })
        }

        async fn download(&self, _storage_id: &str) -> std::result::Result<Vec<u8>, GatewayError> {
            Ok(PDF_BYTES.to_vec())
        }

        async fn delete(&self, storage_id: &str) -> std::result::Result<(), GatewayError> {
            self.deleted.lock().unwrap().push(storage_id.to_string());
            Ok(())
        }

        fn view_url(&self, storage_id: &str) -> String {
            format!("https://files.test/{storage_id}/view")
        }
    }

    pub(crate) fn test_policy() -> UploadPolicy {
        UploadPolicy {
            max_size: 10 * 1024 * 1024,
            allowed_types: vec!["application/pdf".into(), "image/png".into()],
        }
    }

    struct Fixture {
        storage: Arc<MemoryStorage>,
        gateway: Arc<RecordingGateway>,
        workflow: SubmissionWorkflow,
        teacher: Caller,
        student_a: Caller,
        student_b: Caller,
    }

    fn fixture(behavior: GatewayBehavior) -> Fixture {
        let storage = Arc::new(MemoryStorage::default());
        let gateway = Arc::new(RecordingGateway::new(behavior));
        let teacher = Caller::from(&storage.add_user("Teacher", UserRole::Teacher));
        let student_a = Caller::from(&storage.add_user("Alice", UserRole::Student));
        let student_b = Caller::from(&storage.add_user("Bob", UserRole::Student));
        let workflow = SubmissionWorkflow::new(
            storage.clone(),
            gateway.clone(),
            test_policy(),
            Duration::from_millis(200),
            "submissions",
        );
        Fixture {
            storage,
            gateway,
            workflow,
            teacher,
            student_a,
            student_b,
        }
    }

    fn pdf(name: &str, size: usize) -> IncomingFile {
        let mut bytes = PDF_BYTES.to_vec();
        bytes.resize(size.max(bytes.len()), b' ');
        IncomingFile {
            original_name: name.to_string(),
            mime_type: "application/pdf".to_string(),
            bytes,
        }
    }

    fn screened(f: &Fixture, name: &str) -> ScreenedUpload {
        f.workflow.screen_upload(Some(pdf(name, 1024))).unwrap()
    }

    fn grade_input(score: f64, feedback: Option<&str>) -> GradeInput {
        GradeInput::try_from(GradeSubmissionRequest {
            score,
            feedback: feedback.map(str::to_string),
        })
        .unwrap()
    }

    fn open_task(f: &Fixture) -> Task {
        f.storage
            .add_task(f.teacher.id, Utc::now() + ChronoDuration::hours(1))
    }

    #[tokio::test]
    async fn test_second_submission_is_rejected() {
        let f = fixture(GatewayBehavior::Succeed);
        let task = open_task(&f);

        f.workflow
            .submit(f.student_a, task.id, screened(&f, "hw.pdf"))
            .await
            .unwrap();
        let err = f
            .workflow
            .submit(f.student_a, task.id, screened(&f, "hw2.pdf"))
            .await
            .unwrap_err();

        assert!(matches!(err, EduHubError::AlreadySubmitted(_)));
        assert_eq!(f.storage.submissions_for(task.id, f.student_a.id).len(), 1);
        // 唯一性检查在上传之前
        assert_eq!(f.gateway.upload_count(), 1);
    }

    #[tokio::test]
    async fn test_race_on_persist_maps_to_already_submitted_and_cleans_blob() {
        let f = fixture(GatewayBehavior::Succeed);
        let task = open_task(&f);

        // 模拟并发写入：提交在预检之后、写库之前出现
        f.storage
            .create_submission(NewSubmission {
                task_id: task.id,
                student_id: f.student_a.id,
                file_url: "u".into(),
                file_name: "n".into(),
                original_name: "o".into(),
                storage_file_id: "existing".into(),
                file_size: 1,
                mime_type: "application/pdf".into(),
                submitted_at: Utc::now(),
            })
            .await
            .unwrap();
        let racing = SubmissionWorkflow::new(
            Arc::new(FaultyStorage {
                inner: f.storage.clone(),
                hide_existing: true,
                ..Default::default()
            }),
            f.gateway.clone(),
            test_policy(),
            Duration::from_millis(200),
            "submissions",
        );

        let err = racing
            .submit(f.student_a, task.id, screened(&f, "hw.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, EduHubError::AlreadySubmitted(_)));
        assert_eq!(f.storage.submissions_for(task.id, f.student_a.id).len(), 1);
        assert_eq!(*f.gateway.deleted.lock().unwrap(), vec!["obj-1".to_string()]);
    }

    #[tokio::test]
    async fn test_submit_survives_failed_student_lookup() {
        let f = fixture(GatewayBehavior::Succeed);
        let task = open_task(&f);
        let flaky = SubmissionWorkflow::new(
            Arc::new(FaultyStorage {
                inner: f.storage.clone(),
                fail_user_lookup: true,
                ..Default::default()
            }),
            f.gateway.clone(),
            test_policy(),
            Duration::from_millis(200),
            "submissions",
        );

        let response = flaky
            .submit(f.student_a, task.id, screened(&f, "hw.pdf"))
            .await
            .unwrap();

        assert!(response.student.is_none());
        assert_eq!(response.task.map(|t| t.id), Some(task.id));
        assert_eq!(f.storage.submissions_for(task.id, f.student_a.id).len(), 1);
        // 已落库的上传不会被清理
        assert!(f.gateway.deleted.lock().unwrap().is_empty());
    }

    /// 在内存存储外注入故障
    #[derive(Default)]
    struct FaultyStorage {
        inner: Arc<MemoryStorage>,
        // 预检时看不到已有提交（模拟并发写入）
        hide_existing: bool,
        fail_user_lookup: bool,
    }

    #[async_trait::async_trait]
    impl Storage for FaultyStorage {
        async fn create_user(&self, user: NewUser) -> Result<User> {
            self.inner.create_user(user).await
        }
        async fn get_user_by_id(&self, id: i64) -> Result<Option<User>> {
            if self.fail_user_lookup {
                return Err(EduHubError::database_operation("查询用户失败: connection reset"));
            }
            self.inner.get_user_by_id(id).await
        }
        async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
            self.inner.get_user_by_email(email).await
        }
        async fn get_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
            self.inner.get_users_by_ids(ids).await
        }
        async fn update_last_login(&self, id: i64) -> Result<bool> {
            self.inner.update_last_login(id).await
        }
        async fn update_user_role(
            &self,
            id: i64,
            role: UserRole,
            center_id: Option<i64>,
        ) -> Result<Option<User>> {
            self.inner.update_user_role(id, role, center_id).await
        }
        async fn count_users_by_role(&self, role: UserRole) -> Result<u64> {
            self.inner.count_users_by_role(role).await
        }
        async fn list_center_members(&self, center_id: i64, role: UserRole) -> Result<Vec<User>> {
            self.inner.list_center_members(center_id, role).await
        }
        async fn create_center(&self, center: NewCenter) -> Result<Center> {
            self.inner.create_center(center).await
        }
        async fn get_center_by_id(&self, id: i64) -> Result<Option<Center>> {
            self.inner.get_center_by_id(id).await
        }
        async fn list_centers_with_pagination(
            &self,
            query: CenterListQuery,
        ) -> Result<PaginatedResponse<Center>> {
            self.inner.list_centers_with_pagination(query).await
        }
        async fn update_center(&self, id: i64, changes: CenterChanges) -> Result<Option<Center>> {
            self.inner.update_center(id, changes).await
        }
        async fn create_group(&self, group: NewGroup) -> Result<Group> {
            self.inner.create_group(group).await
        }
        async fn get_group_by_id(&self, id: i64) -> Result<Option<Group>> {
            self.inner.get_group_by_id(id).await
        }
        async fn list_groups_with_pagination(
            &self,
            query: GroupListQuery,
        ) -> Result<PaginatedResponse<Group>> {
            self.inner.list_groups_with_pagination(query).await
        }
        async fn list_groups_by_center(&self, center_id: i64) -> Result<Vec<Group>> {
            self.inner.list_groups_by_center(center_id).await
        }
        async fn update_group(&self, id: i64, changes: GroupChanges) -> Result<Option<Group>> {
            self.inner.update_group(id, changes).await
        }
        async fn delete_group(&self, id: i64) -> Result<bool> {
            self.inner.delete_group(id).await
        }
        async fn add_group_student(&self, group_id: i64, student_id: i64) -> Result<Group> {
            self.inner.add_group_student(group_id, student_id).await
        }
        async fn remove_group_student(
            &self,
            group_id: i64,
            student_id: i64,
        ) -> Result<Option<Group>> {
            self.inner.remove_group_student(group_id, student_id).await
        }
        async fn list_group_student_ids(&self, group_id: i64) -> Result<Vec<i64>> {
            self.inner.list_group_student_ids(group_id).await
        }
        async fn create_task(&self, task: NewTask) -> Result<Task> {
            self.inner.create_task(task).await
        }
        async fn get_task_by_id(&self, id: i64) -> Result<Option<Task>> {
            self.inner.get_task_by_id(id).await
        }
        async fn get_tasks_by_ids(&self, ids: &[i64]) -> Result<Vec<Task>> {
            self.inner.get_tasks_by_ids(ids).await
        }
        async fn list_tasks_with_pagination(
            &self,
            query: TaskListQuery,
        ) -> Result<PaginatedResponse<Task>> {
            self.inner.list_tasks_with_pagination(query).await
        }
        async fn update_task(&self, id: i64, changes: TaskChanges) -> Result<Option<Task>> {
            self.inner.update_task(id, changes).await
        }
        async fn set_task_attachment(
            &self,
            id: i64,
            attachment: Option<TaskAttachment>,
        ) -> Result<Option<Task>> {
            self.inner.set_task_attachment(id, attachment).await
        }
        async fn delete_task(&self, id: i64) -> Result<Option<Vec<String>>> {
            self.inner.delete_task(id).await
        }
        async fn count_tasks(&self) -> Result<u64> {
            self.inner.count_tasks().await
        }
        async fn list_tasks_by_creator(&self, creator_id: i64) -> Result<Vec<Task>> {
            self.inner.list_tasks_by_creator(creator_id).await
        }
        async fn create_submission(&self, submission: NewSubmission) -> Result<Submission> {
            self.inner.create_submission(submission).await
        }
        async fn get_submission_by_id(&self, id: i64) -> Result<Option<Submission>> {
            self.inner.get_submission_by_id(id).await
        }
        async fn find_submission(&self, task_id: i64, student_id: i64) -> Result<Option<Submission>> {
            if self.hide_existing {
                return Ok(None);
            }
            self.inner.find_submission(task_id, student_id).await
        }
        async fn list_submissions_with_pagination(
            &self,
            query: SubmissionListQuery,
        ) -> Result<PaginatedResponse<Submission>> {
            self.inner.list_submissions_with_pagination(query).await
        }
        async fn list_submissions_by_student(&self, student_id: i64) -> Result<Vec<Submission>> {
            self.inner.list_submissions_by_student(student_id).await
        }
        async fn grade_submission(&self, id: i64, grade: GradeUpdate) -> Result<Option<Submission>> {
            self.inner.grade_submission(id, grade).await
        }
        async fn tally_submissions_for_task(&self, task_id: i64) -> Result<SubmissionTally> {
            self.inner.tally_submissions_for_task(task_id).await
        }
        async fn tally_submissions_for_student(&self, student_id: i64) -> Result<SubmissionTally> {
            self.inner.tally_submissions_for_student(student_id).await
        }
        async fn shutdown(&self) {}
    }

    #[tokio::test]
    async fn test_is_graded_tracks_score() {
        let f = fixture(GatewayBehavior::Succeed);
        let task = open_task(&f);

        let submitted = f
            .workflow
            .submit(f.student_a, task.id, screened(&f, "hw.pdf"))
            .await
            .unwrap()
            .submission;
        assert!(!submitted.is_graded);
        assert!(submitted.score.is_none());

        let graded = f
            .workflow
            .grade(f.teacher, submitted.id, grade_input(70.0, None))
            .await
            .unwrap()
            .submission;
        assert!(graded.is_graded);
        assert_eq!(graded.score, Some(70.0));
        assert_eq!(graded.feedback, "");
        assert_eq!(graded.graded_by, Some(f.teacher.id));
        assert!(graded.graded_at.is_some());
    }

    #[tokio::test]
    async fn test_regrade_overwrites() {
        let f = fixture(GatewayBehavior::Succeed);
        let task = open_task(&f);
        let id = f
            .workflow
            .submit(f.student_a, task.id, screened(&f, "hw.pdf"))
            .await
            .unwrap()
            .submission
            .id;

        f.workflow
            .grade(f.teacher, id, grade_input(50.0, Some("Needs work")))
            .await
            .unwrap();
        let regraded = f
            .workflow
            .grade(f.teacher, id, grade_input(90.0, None))
            .await
            .unwrap()
            .submission;

        assert_eq!(regraded.score, Some(90.0));
        assert_eq!(regraded.feedback, "");
    }

    #[tokio::test]
    async fn test_invalid_grade_leaves_submission_unchanged() {
        let f = fixture(GatewayBehavior::Succeed);
        let task = open_task(&f);
        let submitted = f
            .workflow
            .submit(f.student_a, task.id, screened(&f, "hw.pdf"))
            .await
            .unwrap()
            .submission;

        for score in [-1.0, 100.5, f64::NAN] {
            let issues = GradeInput::try_from(GradeSubmissionRequest {
                score,
                feedback: Some("fine".into()),
            })
            .unwrap_err();
            assert_eq!(issues[0].field, "score");
        }
        let long = GradeInput::try_from(GradeSubmissionRequest {
            score: 80.0,
            feedback: Some("x".repeat(501)),
        })
        .unwrap_err();
        assert_eq!(long[0].field, "feedback");

        let after = f
            .storage
            .get_submission_by_id(submitted.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after, submitted);
    }

    #[tokio::test]
    async fn test_deadline_checked_before_upload() {
        let f = fixture(GatewayBehavior::Succeed);
        let task = f
            .storage
            .add_task(f.teacher.id, Utc::now() - ChronoDuration::hours(1));

        let err = f
            .workflow
            .submit(f.student_a, task.id, screened(&f, "hw.pdf"))
            .await
            .unwrap_err();

        assert!(matches!(err, EduHubError::DeadlineExpired(_)));
        assert!(f.storage.submissions_for(task.id, f.student_a.id).is_empty());
        assert_eq!(f.gateway.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_task_is_not_found() {
        let f = fixture(GatewayBehavior::Succeed);
        let err = f
            .workflow
            .submit(f.student_a, 999, screened(&f, "hw.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, EduHubError::NotFound(_)));
        assert_eq!(f.gateway.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_progress_arithmetic() {
        let f = fixture(GatewayBehavior::Succeed);
        let t1 = open_task(&f);
        let t2 = open_task(&f);
        let _t3 = open_task(&f);

        let s1 = f
            .workflow
            .submit(f.student_a, t1.id, screened(&f, "a.pdf"))
            .await
            .unwrap()
            .submission;
        f.workflow
            .submit(f.student_a, t2.id, screened(&f, "b.pdf"))
            .await
            .unwrap();
        f.workflow
            .grade(f.teacher, s1.id, grade_input(75.0, Some("ok")))
            .await
            .unwrap();

        let progress = f.workflow.progress(f.student_a).await.unwrap();
        assert_eq!(progress.total_tasks, 3);
        assert_eq!(progress.submitted_tasks, 2);
        assert_eq!(progress.graded_tasks, 1);
        assert_eq!(progress.pending_grades, 1);
        assert_eq!(progress.completion_percentage, 67);
        assert_eq!(progress.average_score, 75.0);

        let empty = f.workflow.progress(f.student_b).await.unwrap();
        assert_eq!(empty.submitted_tasks, 0);
        assert_eq!(empty.completion_percentage, 0);
        assert_eq!(empty.average_score, 0.0);
    }

    #[tokio::test]
    async fn test_role_gating_on_grade() {
        let f = fixture(GatewayBehavior::Succeed);
        let task = open_task(&f);
        let id = f
            .workflow
            .submit(f.student_a, task.id, screened(&f, "hw.pdf"))
            .await
            .unwrap()
            .submission
            .id;

        let err = f
            .workflow
            .grade(f.student_b, id, grade_input(100.0, None))
            .await
            .unwrap_err();
        assert!(matches!(err, EduHubError::Authorization(_)));

        // 非任务创建者的教师
        let other = Caller::from(&f.storage.add_user("Other", UserRole::Teacher));
        let err = f
            .workflow
            .grade(other, id, grade_input(100.0, None))
            .await
            .unwrap_err();
        assert!(matches!(err, EduHubError::Authorization(_)));

        let untouched = f.storage.get_submission_by_id(id).await.unwrap().unwrap();
        assert!(!untouched.is_graded);
    }

    #[tokio::test]
    async fn test_self_grading_forbidden() {
        let f = fixture(GatewayBehavior::Succeed);
        let task = open_task(&f);
        // 数据层面出现教师本人的提交
        let own = f
            .storage
            .create_submission(NewSubmission {
                task_id: task.id,
                student_id: f.teacher.id,
                file_url: "u".into(),
                file_name: "n".into(),
                original_name: "o.pdf".into(),
                storage_file_id: "s".into(),
                file_size: 1,
                mime_type: "application/pdf".into(),
                submitted_at: Utc::now(),
            })
            .await
            .unwrap();

        let err = f
            .workflow
            .grade(f.teacher, own.id, grade_input(100.0, None))
            .await
            .unwrap_err();
        assert!(matches!(err, EduHubError::SelfGrading(_)));
    }

    #[tokio::test]
    async fn test_teacher_cannot_submit() {
        let f = fixture(GatewayBehavior::Succeed);
        let task = open_task(&f);
        let err = f
            .workflow
            .submit(f.teacher, task.id, screened(&f, "hw.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, EduHubError::Authorization(_)));
        assert_eq!(f.gateway.upload_count(), 0);
    }

    #[tokio::test]
    async fn test_end_to_end_submit_grade_and_visibility() {
        let f = fixture(GatewayBehavior::Succeed);
        let task = open_task(&f);

        let upload = f
            .workflow
            .screen_upload(Some(pdf("hw.pdf", 2 * 1024 * 1024)))
            .unwrap();
        let created = f
            .workflow
            .submit(f.student_a, task.id, upload)
            .await
            .unwrap();
        assert!(!created.submission.is_graded);
        assert_eq!(created.submission.original_name, "hw.pdf");
        assert_eq!(created.submission.file_size, 2 * 1024 * 1024);
        assert_eq!(created.task.as_ref().map(|t| t.id), Some(task.id));
        assert_eq!(created.student.as_ref().map(|s| s.id), Some(f.student_a.id));

        let graded = f
            .workflow
            .grade(
                f.teacher,
                created.submission.id,
                grade_input(88.0, Some("Good work")),
            )
            .await
            .unwrap();
        assert!(graded.submission.is_graded);
        assert_eq!(graded.submission.score, Some(88.0));
        assert_eq!(graded.submission.feedback, "Good work");

        let err = f
            .workflow
            .get_single(f.student_b, created.submission.id)
            .await
            .unwrap_err();
        assert!(matches!(err, EduHubError::Authorization(_)));

        let err = f
            .workflow
            .submit(f.student_a, task.id, screened(&f, "hw.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, EduHubError::AlreadySubmitted(_)));
        assert_eq!(err.http_status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_end_to_end_past_deadline() {
        let f = fixture(GatewayBehavior::Succeed);
        let task = f
            .storage
            .add_task(f.teacher.id, Utc::now() - ChronoDuration::hours(1));

        let err = f
            .workflow
            .submit(f.student_a, task.id, screened(&f, "hw.pdf"))
            .await
            .unwrap_err();
        assert_eq!(err.http_status(), actix_web::http::StatusCode::BAD_REQUEST);
        assert!(matches!(err, EduHubError::DeadlineExpired(_)));
        assert!(f.storage.submissions_for(task.id, f.student_a.id).is_empty());
    }

    #[tokio::test]
    async fn test_upload_failure_persists_nothing() {
        let f = fixture(GatewayBehavior::Fail);
        let task = open_task(&f);

        let err = f
            .workflow
            .submit(f.student_a, task.id, screened(&f, "hw.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, EduHubError::UploadFailed(_)));
        assert!(!err.is_retryable());
        assert!(f.storage.submissions_for(task.id, f.student_a.id).is_empty());
    }

    #[tokio::test]
    async fn test_upload_timeout_persists_nothing() {
        let f = fixture(GatewayBehavior::Hang);
        let task = open_task(&f);

        let err = f
            .workflow
            .submit(f.student_a, task.id, screened(&f, "hw.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, EduHubError::UpstreamUnavailable(_)));
        assert!(err.is_retryable());
        assert!(f.storage.submissions_for(task.id, f.student_a.id).is_empty());
    }

    #[tokio::test]
    async fn test_list_for_task_is_role_scoped() {
        let f = fixture(GatewayBehavior::Succeed);
        let task = open_task(&f);
        f.workflow
            .submit(f.student_a, task.id, screened(&f, "a.pdf"))
            .await
            .unwrap();
        f.workflow
            .submit(f.student_b, task.id, screened(&f, "b.pdf"))
            .await
            .unwrap();

        let own = f
            .workflow
            .list_for_task(f.student_a, task.id, 1, 10)
            .await
            .unwrap();
        assert_eq!(own.submissions.len(), 1);
        assert_eq!(own.submissions[0].submission.student_id, f.student_a.id);

        let all = f
            .workflow
            .list_for_task(f.teacher, task.id, 1, 10)
            .await
            .unwrap();
        assert_eq!(all.submissions.len(), 2);
        assert_eq!(all.pagination.total, 2);

        let other = Caller::from(&f.storage.add_user("Other", UserRole::Teacher));
        let err = f
            .workflow
            .list_for_task(other, task.id, 1, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, EduHubError::Authorization(_)));
    }

    #[tokio::test]
    async fn test_list_all_filters_by_owner_and_status() {
        let f = fixture(GatewayBehavior::Succeed);
        let mine = open_task(&f);
        let other_teacher = f.storage.add_user("Other", UserRole::Teacher);
        let theirs = f
            .storage
            .add_task(other_teacher.id, Utc::now() + ChronoDuration::hours(1));

        let s = f
            .workflow
            .submit(f.student_a, mine.id, screened(&f, "a.pdf"))
            .await
            .unwrap()
            .submission;
        f.workflow
            .submit(f.student_b, mine.id, screened(&f, "b.pdf"))
            .await
            .unwrap();
        f.workflow
            .submit(f.student_a, theirs.id, screened(&f, "c.pdf"))
            .await
            .unwrap();
        f.workflow
            .grade(f.teacher, s.id, grade_input(60.0, None))
            .await
            .unwrap();

        let all = f.workflow.list_all(f.teacher, 1, 10, None).await.unwrap();
        assert_eq!(all.submissions.len(), 2);
        assert!(all.submissions.iter().all(|i| i.submission.task_id == mine.id));

        let graded = f
            .workflow
            .list_all(f.teacher, 1, 10, Some(SubmissionStatus::Graded))
            .await
            .unwrap();
        assert_eq!(graded.submissions.len(), 1);
        assert_eq!(graded.submissions[0].submission.id, s.id);
    }

    #[tokio::test]
    async fn test_my_submissions_are_enriched() {
        let f = fixture(GatewayBehavior::Succeed);
        let task = open_task(&f);
        f.workflow
            .submit(f.student_a, task.id, screened(&f, "a.pdf"))
            .await
            .unwrap();

        let mine = f.workflow.my_submissions(f.student_a).await.unwrap();
        assert_eq!(mine.submissions.len(), 1);
        assert_eq!(mine.submissions[0].task.as_ref().map(|t| t.title.as_str()), Some("Essay"));
        assert!(f.workflow.my_submissions(f.teacher).await.is_err());
    }

    #[test]
    fn test_screen_upload_rejections() {
        let f = fixture(GatewayBehavior::Succeed);
        assert_eq!(
            f.workflow.screen_upload(None).unwrap_err(),
            UploadRejection::Missing
        );
        let exe = IncomingFile {
            original_name: "virus.exe".into(),
            mime_type: "application/x-msdownload".into(),
            bytes: b"MZ\x90\x00".to_vec(),
        };
        assert!(matches!(
            f.workflow.screen_upload(Some(exe)).unwrap_err(),
            UploadRejection::TypeNotAllowed(_)
        ));
        let disguised = IncomingFile {
            original_name: "hw.pdf".into(),
            mime_type: "application/pdf".into(),
            bytes: b"MZ\x90\x00".to_vec(),
        };
        assert!(matches!(
            f.workflow.screen_upload(Some(disguised)).unwrap_err(),
            UploadRejection::ContentMismatch(_)
        ));
    }
}
