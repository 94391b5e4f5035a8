//! 基于操作的能力表
//!
//! 每个业务操作声明允许的角色集合，角色检查在任何数据访问之前完成；
//! 所有权检查（任务创建者 == 调用者）由业务层在读取数据后进行。

use crate::errors::EduHubError;
use crate::models::users::entities::UserRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    SubmitAssignment,
    GradeSubmission,
    ListTaskSubmissions,
    ReadSubmission,
    ListAllSubmissions,
    ViewProgress,
    ListMySubmissions,
    ReadTasks,
    CreateTask,
    UpdateTask,
    DeleteTask,
    UploadTaskAttachment,
    ViewTaskStats,
    ChangeUserRole,
    CreateCenter,
    ListCenters,
    ReadCenter,
    UpdateCenter,
    AddCenterTeacher,
    ViewCenterStats,
    CreateGroup,
    ReadGroups,
    UpdateGroup,
    DeleteGroup,
    ManageGroupStudents,
    ViewTeachingAnalytics,
}

const STUDENT: &[UserRole] = &[UserRole::Student];
const TEACHER: &[UserRole] = &[UserRole::Teacher];
const STUDENT_OR_TEACHER: &[UserRole] = &[UserRole::Student, UserRole::Teacher];
const SUPER_ADMIN: &[UserRole] = &[UserRole::SuperAdmin];
const CENTER_STAFF: &[UserRole] = &[UserRole::CenterAdmin, UserRole::SuperAdmin];
const GROUP_CREATORS: &[UserRole] = &[UserRole::Teacher, UserRole::CenterAdmin];
const GROUP_MANAGERS: &[UserRole] = &[
    UserRole::Teacher,
    UserRole::CenterAdmin,
    UserRole::SuperAdmin,
];
const ANY: &[UserRole] = &[
    UserRole::Student,
    UserRole::Teacher,
    UserRole::CenterAdmin,
    UserRole::SuperAdmin,
];

impl Operation {
    /// 允许执行该操作的角色
    pub fn allowed_roles(&self) -> &'static [UserRole] {
        match self {
            Operation::SubmitAssignment
            | Operation::ViewProgress
            | Operation::ListMySubmissions => STUDENT,
            Operation::GradeSubmission
            | Operation::ListAllSubmissions
            | Operation::CreateTask
            | Operation::UpdateTask
            | Operation::DeleteTask
            | Operation::UploadTaskAttachment
            | Operation::ViewTaskStats
            | Operation::ViewTeachingAnalytics => TEACHER,
            Operation::ListTaskSubmissions | Operation::ReadSubmission => STUDENT_OR_TEACHER,
            Operation::ReadTasks | Operation::ReadGroups => ANY,
            Operation::ChangeUserRole | Operation::CreateCenter | Operation::ListCenters => {
                SUPER_ADMIN
            }
            Operation::ReadCenter
            | Operation::UpdateCenter
            | Operation::AddCenterTeacher
            | Operation::ViewCenterStats => CENTER_STAFF,
            Operation::CreateGroup => GROUP_CREATORS,
            Operation::UpdateGroup | Operation::DeleteGroup | Operation::ManageGroupStudents => {
                GROUP_MANAGERS
            }
        }
    }

    pub fn permits(&self, role: UserRole) -> bool {
        self.allowed_roles().contains(&role)
    }
}

/// 角色门：不满足时返回 Forbidden，不产生任何副作用
pub fn authorize(operation: Operation, role: UserRole) -> Result<(), EduHubError> {
    if operation.permits(role) {
        Ok(())
    } else {
        Err(EduHubError::authorization(format!(
            "Role '{role}' is not allowed to perform {operation:?}"
        )))
    }
}
