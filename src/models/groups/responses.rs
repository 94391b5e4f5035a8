use serde::Serialize;
use ts_rs::TS;

use super::entities::Group;
use crate::models::PaginationInfo;
use crate::models::users::entities::UserSummary;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct GroupResponse {
    #[serde(flatten)]
    #[ts(flatten)]
    pub group: Group,
    pub teacher: Option<UserSummary>,
    pub students: Vec<UserSummary>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/group.ts")]
pub struct GroupListResponse {
    pub items: Vec<Group>,
    pub pagination: PaginationInfo,
}
