use serde::Deserialize;
use ts_rs::TS;

use crate::models::FieldIssue;
use crate::models::common::pagination::PaginationQuery;
use crate::utils::validate::{
    FieldIssues, GROUP_CAPACITY_DEFAULT, validate_email, validate_group_capacity,
    validate_org_description, validate_org_name,
};

#[derive(Debug, Clone, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
    pub center_id: Option<i64>,
    pub subject: Option<String>,
    #[serde(default = "default_capacity")]
    pub max_students: i32,
    pub schedule: Option<String>,
}

fn default_capacity() -> i32 {
    GROUP_CAPACITY_DEFAULT
}

impl CreateGroupRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldIssue>> {
        let mut issues = FieldIssues::new();
        issues
            .check("name", validate_org_name(&self.name))
            .check("description", validate_org_description(self.description.as_deref()))
            .check("max_students", validate_group_capacity(self.max_students));
        issues.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub subject: Option<String>,
    pub max_students: Option<i32>,
    pub schedule: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateGroupRequest {
    /// `current_students` 用于防止容量被调到现有人数以下
    pub fn validate(&self, current_students: i32) -> Result<(), Vec<FieldIssue>> {
        let mut issues = FieldIssues::new();
        if let Some(name) = self.name.as_deref() {
            issues.check("name", validate_org_name(name));
        }
        issues.check(
            "description",
            validate_org_description(self.description.as_deref()),
        );
        if let Some(max) = self.max_students {
            issues.check("max_students", validate_group_capacity(max));
            if max < current_students {
                issues.check(
                    "max_students",
                    Err("Capacity cannot be lower than the current number of students"),
                );
            }
        }
        issues.into_result()
    }
}

#[derive(Debug, Clone, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct AddGroupStudentRequest {
    pub student_email: String,
}

impl AddGroupStudentRequest {
    pub fn normalized_email(&self) -> Result<String, Vec<FieldIssue>> {
        let email = self.student_email.trim().to_lowercase();
        let mut issues = FieldIssues::new();
        issues.check("student_email", validate_email(&email));
        issues.into_result().map(|_| email)
    }
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct GroupListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
    pub center_id: Option<i64>,
    pub teacher_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct GroupListQuery {
    pub page: i64,
    pub size: i64,
    pub search: Option<String>,
    pub center_id: Option<i64>,
    pub teacher_id: Option<i64>,
}

impl From<GroupListParams> for GroupListQuery {
    fn from(params: GroupListParams) -> Self {
        let (page, size) = params.pagination.normalized();
        Self {
            page,
            size,
            search: params
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            center_id: params.center_id,
            teacher_id: params.teacher_id,
        }
    }
}
