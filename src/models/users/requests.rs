use super::entities::UserRole;
use serde::Deserialize;
use ts_rs::TS;

/// 角色变更请求（仅超级管理员）
#[derive(Debug, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(export, export_to = "../frontend/src/types/generated/user.ts")]
pub struct UpdateUserRoleRequest {
    pub role: UserRole,
    pub center_id: Option<i64>,
}
