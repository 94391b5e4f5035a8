use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::errors::EduHubError;

// 用户角色
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub enum UserRole {
    Student,     // 学生
    Teacher,     // 教师
    CenterAdmin, // 教育中心管理员
    SuperAdmin,  // 超级管理员
}

impl UserRole {
    pub const STUDENT: &'static str = "student";
    pub const TEACHER: &'static str = "teacher";
    pub const CENTER_ADMIN: &'static str = "center_admin";
    pub const SUPER_ADMIN: &'static str = "super_admin";

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Student => Self::STUDENT,
            UserRole::Teacher => Self::TEACHER,
            UserRole::CenterAdmin => Self::CENTER_ADMIN,
            UserRole::SuperAdmin => Self::SUPER_ADMIN,
        }
    }

    /// 注册时允许自选的角色
    pub fn is_self_assignable(&self) -> bool {
        matches!(self, UserRole::Student | UserRole::Teacher)
    }

    pub fn all_roles() -> &'static [UserRole] {
        &[
            UserRole::Student,
            UserRole::Teacher,
            UserRole::CenterAdmin,
            UserRole::SuperAdmin,
        ]
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<UserRole>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的用户角色: '{s}'. 支持的角色: student, teacher, center_admin, super_admin"
            ))
        })
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            UserRole::STUDENT => Ok(UserRole::Student),
            UserRole::TEACHER => Ok(UserRole::Teacher),
            UserRole::CENTER_ADMIN => Ok(UserRole::CenterAdmin),
            UserRole::SUPER_ADMIN => Ok(UserRole::SuperAdmin),
            _ => Err(format!("Invalid user role: {s}")),
        }
    }
}

// 用户状态
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub enum UserStatus {
    Active,    // 活跃
    Inactive,  // 非活跃
    Suspended, // 暂停
}

impl<'de> Deserialize<'de> for UserStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<UserStatus>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的用户状态: '{s}'. 支持的状态: active, inactive, suspended"
            ))
        })
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserStatus::Active => write!(f, "active"),
            UserStatus::Inactive => write!(f, "inactive"),
            UserStatus::Suspended => write!(f, "suspended"),
        }
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(UserStatus::Active),
            "inactive" => Ok(UserStatus::Inactive),
            "suspended" => Ok(UserStatus::Suspended),
            _ => Err(format!("Invalid user status: {s}")),
        }
    }
}

// 用户实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    #[ts(skip)]
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub center_id: Option<i64>,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    /// 生成访问令牌
    pub fn generate_access_token(&self) -> Result<String, EduHubError> {
        crate::utils::jwt::JwtUtils::generate_access_token(self.id, self.role.as_str())
            .map_err(|e| EduHubError::internal(format!("Failed to sign access token: {e}")))
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

/// 新建用户（存储层输入）
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
}

/// 嵌入到提交/任务响应中的用户摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UserSummary {
    pub id: i64,
    pub full_name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            email: user.email.clone(),
        }
    }
}
