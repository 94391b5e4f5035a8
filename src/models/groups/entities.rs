use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::users::entities::{User, UserRole};

/// 学习小组
///
/// `current_students` 始终等于成员数，且不超过 `max_students`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub center_id: Option<i64>,
    pub teacher_id: i64,
    pub subject: Option<String>,
    pub max_students: i32,
    pub current_students: i32,
    pub schedule: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Group {
    pub fn is_full(&self) -> bool {
        self.current_students >= self.max_students
    }

    pub fn seats_left(&self) -> i32 {
        (self.max_students - self.current_students).max(0)
    }
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub name: String,
    pub description: Option<String>,
    pub center_id: Option<i64>,
    pub teacher_id: i64,
    pub subject: Option<String>,
    pub max_students: i32,
    pub schedule: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GroupChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub subject: Option<String>,
    pub max_students: Option<i32>,
    pub schedule: Option<String>,
    pub is_active: Option<bool>,
}

/// 小组管理权：超级管理员、小组教师、小组所属中心的管理员
pub fn can_manage_group(user: &User, group: &Group) -> bool {
    match user.role {
        UserRole::SuperAdmin => true,
        UserRole::Teacher => group.teacher_id == user.id,
        UserRole::CenterAdmin => group.center_id.is_some() && group.center_id == user.center_id,
        UserRole::Student => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserStatus;

    fn user(id: i64, role: UserRole, center_id: Option<i64>) -> User {
        let now = Utc::now();
        User {
            id,
            full_name: format!("user{id}"),
            email: format!("user{id}@example.com"),
            password_hash: String::new(),
            role,
            status: UserStatus::Active,
            center_id,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn group(teacher_id: i64, center_id: Option<i64>) -> Group {
        let now = Utc::now();
        Group {
            id: 1,
            name: "Algebra A".into(),
            description: None,
            center_id,
            teacher_id,
            subject: Some("math".into()),
            max_students: 2,
            current_students: 2,
            schedule: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_capacity_helpers() {
        let mut g = group(1, None);
        assert!(g.is_full());
        assert_eq!(g.seats_left(), 0);
        g.current_students = 1;
        assert!(!g.is_full());
        assert_eq!(g.seats_left(), 1);
    }

    #[test]
    fn test_group_management_scope() {
        let g = group(5, Some(9));
        assert!(can_manage_group(&user(5, UserRole::Teacher, Some(9)), &g));
        assert!(!can_manage_group(&user(6, UserRole::Teacher, Some(9)), &g));
        assert!(can_manage_group(&user(7, UserRole::CenterAdmin, Some(9)), &g));
        assert!(!can_manage_group(&user(7, UserRole::CenterAdmin, Some(8)), &g));
        assert!(can_manage_group(&user(1, UserRole::SuperAdmin, None), &g));
        assert!(!can_manage_group(&user(5, UserRole::Student, Some(9)), &g));

        // 不属于任何中心的小组只有教师本人可管理
        let solo = group(5, None);
        assert!(!can_manage_group(&user(7, UserRole::CenterAdmin, None), &solo));
    }
}
