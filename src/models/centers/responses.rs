use serde::Serialize;
use ts_rs::TS;

use super::entities::Center;
use crate::models::PaginationInfo;
use crate::models::users::entities::UserSummary;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/center.ts")]
pub struct CenterResponse {
    #[serde(flatten)]
    #[ts(flatten)]
    pub center: Center,
    pub admin: Option<UserSummary>,
    pub teachers: Vec<UserSummary>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/center.ts")]
pub struct CenterListResponse {
    pub items: Vec<Center>,
    pub pagination: PaginationInfo,
}

/// 中心统计
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/center.ts")]
pub struct CenterStatsResponse {
    pub center_id: i64,
    pub total_teachers: i64,
    pub total_groups: i64,
    pub active_groups: i64,
    // 各小组当前人数之和
    pub total_students: i64,
}
