use serde::Deserialize;
use ts_rs::TS;

use crate::models::FieldIssue;
use crate::models::common::pagination::PaginationQuery;
use crate::utils::validate::{
    FieldIssues, validate_email, validate_org_description, validate_org_name,
};

/// 创建教育中心请求
#[derive(Debug, Clone, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(export, export_to = "../frontend/src/types/generated/center.ts")]
pub struct CreateCenterRequest {
    pub name: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    // 将被提升为中心管理员的教师
    pub admin_email: String,
}

impl CreateCenterRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldIssue>> {
        let mut issues = FieldIssues::new();
        issues
            .check("name", validate_org_name(&self.name))
            .check("description", validate_org_description(self.description.as_deref()))
            .check("admin_email", validate_email(self.admin_email.trim()));
        if let Some(email) = self.email.as_deref() {
            issues.check("email", validate_email(email.trim()));
        }
        issues.into_result()
    }
}

/// 更新教育中心请求
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(export, export_to = "../frontend/src/types/generated/center.ts")]
pub struct UpdateCenterRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateCenterRequest {
    pub fn validate(&self) -> Result<(), Vec<FieldIssue>> {
        let mut issues = FieldIssues::new();
        if let Some(name) = self.name.as_deref() {
            issues.check("name", validate_org_name(name));
        }
        if let Some(email) = self.email.as_deref() {
            issues.check("email", validate_email(email.trim()));
        }
        issues.check(
            "description",
            validate_org_description(self.description.as_deref()),
        );
        issues.into_result()
    }
}

#[derive(Debug, Clone, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(export, export_to = "../frontend/src/types/generated/center.ts")]
pub struct AddCenterTeacherRequest {
    pub teacher_email: String,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/center.ts")]
pub struct CenterListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CenterListQuery {
    pub page: i64,
    pub size: i64,
    pub search: Option<String>,
}

impl From<CenterListParams> for CenterListQuery {
    fn from(params: CenterListParams) -> Self {
        let (page, size) = params.pagination.normalized();
        Self {
            page,
            size,
            search: params
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_center_requires_admin_email() {
        assert!(
            serde_json::from_str::<CreateCenterRequest>(r#"{"name":"North Campus"}"#).is_err()
        );
        let req: CreateCenterRequest = serde_json::from_str(
            r#"{"name":"North Campus","admin_email":"lead@example.com"}"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_center_reports_each_bad_field() {
        let req: CreateCenterRequest = serde_json::from_str(
            r#"{"name":"","email":"nope","admin_email":"also-nope"}"#,
        )
        .unwrap();
        let fields: Vec<String> = req
            .validate()
            .unwrap_err()
            .into_iter()
            .map(|issue| issue.field)
            .collect();
        assert_eq!(fields, vec!["name", "admin_email", "email"]);
    }

    #[test]
    fn test_update_center_allows_partial_body() {
        let req: UpdateCenterRequest = serde_json::from_str(r#"{"is_active":false}"#).unwrap();
        assert!(req.validate().is_ok());
        assert!(serde_json::from_str::<UpdateCenterRequest>(r#"{"admin_id":2}"#).is_err());
    }
}
