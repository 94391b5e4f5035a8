pub mod analytics;
pub mod auth;
pub mod centers;
pub mod common;
pub mod groups;
pub mod submissions;
pub mod tasks;
pub mod users;

use serde::Serialize;

use crate::errors::EduHubError;

pub use common::pagination::{PaginatedResponse, PaginationInfo, PaginationQuery};
pub use common::response::{ApiResponse, FieldIssue};

/// 进程启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 业务错误码（响应体中的 `code` 字段）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用
    BadRequest = 1000,
    ValidationFailed = 1001,
    Unauthorized = 1002,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1005,
    InternalServerError = 1006,

    // 认证 / 用户
    AuthFailed = 2000,
    RegisterFailed = 2001,
    UserNotFound = 2002,
    UserEmailAlreadyExists = 2003,
    UserInactive = 2004,
    RoleTransitionInvalid = 2005,

    // 任务
    TaskNotFound = 3000,
    TaskPermissionDenied = 3001,

    // 提交 / 评分
    SubmissionNotFound = 4000,
    AlreadySubmitted = 4001,
    DeadlinePassed = 4002,
    SelfGradingForbidden = 4003,

    // 文件
    FileMissing = 5000,
    FileTypeNotAllowed = 5001,
    FileSizeExceeded = 5002,
    MultifileUploadNotAllowed = 5003,
    FileUploadFailed = 5004,
    StorageUnavailable = 5005,

    // 教育中心
    CenterNotFound = 6000,
    CenterPermissionDenied = 6001,

    // 学习小组
    GroupNotFound = 7000,
    GroupPermissionDenied = 7001,
    GroupFull = 7002,
    AlreadyGroupMember = 7003,
    NotGroupMember = 7004,
}

impl ErrorCode {
    /// 由领域错误推导默认错误码
    pub fn from_error(err: &EduHubError) -> Self {
        match err {
            EduHubError::Validation(_) | EduHubError::DateParse(_) => ErrorCode::ValidationFailed,
            EduHubError::NotFound(_) => ErrorCode::NotFound,
            EduHubError::Authentication(_) => ErrorCode::Unauthorized,
            EduHubError::Authorization(_) => ErrorCode::Forbidden,
            EduHubError::AlreadySubmitted(_) => ErrorCode::AlreadySubmitted,
            EduHubError::DeadlineExpired(_) => ErrorCode::DeadlinePassed,
            EduHubError::SelfGrading(_) => ErrorCode::SelfGradingForbidden,
            EduHubError::CapacityExceeded(_) => ErrorCode::GroupFull,
            EduHubError::Conflict(_) => ErrorCode::Conflict,
            EduHubError::UploadFailed(_) => ErrorCode::FileUploadFailed,
            EduHubError::UpstreamUnavailable(_) => ErrorCode::StorageUnavailable,
            _ => ErrorCode::InternalServerError,
        }
    }
}
