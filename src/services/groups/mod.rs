pub mod create;
pub mod delete;
pub mod detail;
pub mod list;
pub mod students;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::HashMap;
use std::sync::Arc;

use crate::errors::{EduHubError, Result};
use crate::models::groups::{
    entities::{Group, can_manage_group},
    requests::{AddGroupStudentRequest, CreateGroupRequest, GroupListParams, UpdateGroupRequest},
    responses::GroupResponse,
};
use crate::models::users::entities::{User, UserSummary};
use crate::models::ErrorCode;
use crate::storage::Storage;

use super::{error_response, error_response_with_code};

pub struct GroupService {
    storage: Option<Arc<dyn Storage>>,
}

impl GroupService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::shared::<dyn Storage>(request, "Storage"),
        }
    }

    pub async fn create_group(
        &self,
        request: &HttpRequest,
        body: CreateGroupRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_group(self, request, body).await
    }

    pub async fn list_groups(
        &self,
        request: &HttpRequest,
        params: GroupListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_groups(self, request, params).await
    }

    pub async fn get_group(&self, request: &HttpRequest, group_id: i64) -> ActixResult<HttpResponse> {
        detail::get_group(self, request, group_id).await
    }

    pub async fn update_group(
        &self,
        request: &HttpRequest,
        group_id: i64,
        body: UpdateGroupRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_group(self, request, group_id, body).await
    }

    pub async fn delete_group(
        &self,
        request: &HttpRequest,
        group_id: i64,
    ) -> ActixResult<HttpResponse> {
        delete::delete_group(self, request, group_id).await
    }

    pub async fn add_student(
        &self,
        request: &HttpRequest,
        group_id: i64,
        body: AddGroupStudentRequest,
    ) -> ActixResult<HttpResponse> {
        students::add_group_student(self, request, group_id, body).await
    }

    pub async fn remove_student(
        &self,
        request: &HttpRequest,
        group_id: i64,
        student_id: i64,
    ) -> ActixResult<HttpResponse> {
        students::remove_group_student(self, request, group_id, student_id).await
    }
}

pub(crate) fn group_not_found(request: &HttpRequest) -> HttpResponse {
    error_response_with_code(
        request,
        &EduHubError::not_found("Group not found"),
        ErrorCode::GroupNotFound,
    )
}

/// 读取小组并检查调用者的管理权
pub(crate) async fn load_managed_group(
    storage: &Arc<dyn Storage>,
    request: &HttpRequest,
    user: &User,
    group_id: i64,
) -> std::result::Result<Group, HttpResponse> {
    let group = match storage.get_group_by_id(group_id).await {
        Ok(Some(group)) => group,
        Ok(None) => return Err(group_not_found(request)),
        Err(e) => return Err(error_response(request, &e)),
    };

    if !can_manage_group(user, &group) {
        return Err(error_response_with_code(
            request,
            &EduHubError::authorization("You are not allowed to manage this group"),
            ErrorCode::GroupPermissionDenied,
        ));
    }
    Ok(group)
}

/// 组装小组详情；`with_students` 为 false 时不列出成员
pub(crate) async fn group_response(
    storage: &Arc<dyn Storage>,
    group: Group,
    with_students: bool,
) -> Result<GroupResponse> {
    let teacher = storage
        .get_user_by_id(group.teacher_id)
        .await?
        .map(|u| UserSummary::from(&u));

    let students = if with_students {
        let ids = storage.list_group_student_ids(group.id).await?;
        let users: HashMap<i64, UserSummary> = storage
            .get_users_by_ids(&ids)
            .await?
            .iter()
            .map(|u| (u.id, UserSummary::from(u)))
            .collect();
        // 保持加入顺序
        ids.iter().filter_map(|id| users.get(id).cloned()).collect()
    } else {
        Vec::new()
    };

    Ok(GroupResponse {
        group,
        teacher,
        students,
    })
}
