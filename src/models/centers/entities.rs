use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::users::entities::{User, UserRole};

/// 教育中心
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/center.ts")]
pub struct Center {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    // 统一小写存储
    pub email: Option<String>,
    pub website: Option<String>,
    pub admin_id: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 新建中心（存储层输入），同时把 `admin_id` 指向的用户提升为中心管理员
#[derive(Debug, Clone)]
pub struct NewCenter {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub admin_id: i64,
}

#[derive(Debug, Clone, Default)]
pub struct CenterChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub is_active: Option<bool>,
}

/// 超级管理员管理全部中心；中心管理员只管理自己所属的中心
pub fn can_manage_center(user: &User, center_id: i64) -> bool {
    match user.role {
        UserRole::SuperAdmin => true,
        UserRole::CenterAdmin => user.center_id == Some(center_id),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserStatus;

    fn user(role: UserRole, center_id: Option<i64>) -> User {
        let now = Utc::now();
        User {
            id: 1,
            full_name: "Dana".into(),
            email: "dana@example.com".into(),
            password_hash: String::new(),
            role,
            status: UserStatus::Active,
            center_id,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_center_admin_scope() {
        assert!(can_manage_center(&user(UserRole::SuperAdmin, None), 3));
        assert!(can_manage_center(&user(UserRole::CenterAdmin, Some(3)), 3));
        assert!(!can_manage_center(&user(UserRole::CenterAdmin, Some(4)), 3));
        assert!(!can_manage_center(&user(UserRole::CenterAdmin, None), 3));
        assert!(!can_manage_center(&user(UserRole::Teacher, Some(3)), 3));
    }
}
