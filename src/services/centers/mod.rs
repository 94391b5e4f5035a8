pub mod create;
pub mod detail;
pub mod list;
pub mod stats;
pub mod teachers;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::errors::{EduHubError, Result};
use crate::models::centers::{
    entities::{Center, can_manage_center},
    requests::{AddCenterTeacherRequest, CenterListParams, CreateCenterRequest, UpdateCenterRequest},
    responses::CenterResponse,
};
use crate::models::users::entities::{User, UserRole, UserSummary};
use crate::models::ErrorCode;
use crate::storage::Storage;

use super::{error_response, error_response_with_code};

pub struct CenterService {
    storage: Option<Arc<dyn Storage>>,
}

impl CenterService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::shared::<dyn Storage>(request, "Storage"),
        }
    }

    pub(crate) fn get_cache(&self, request: &HttpRequest) -> Result<Arc<dyn ObjectCache>> {
        super::shared::<dyn ObjectCache>(request, "ObjectCache")
    }

    pub async fn create_center(
        &self,
        request: &HttpRequest,
        body: CreateCenterRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_center(self, request, body).await
    }

    pub async fn list_centers(
        &self,
        request: &HttpRequest,
        params: CenterListParams,
    ) -> ActixResult<HttpResponse> {
        list::list_centers(self, request, params).await
    }

    pub async fn get_center(
        &self,
        request: &HttpRequest,
        center_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_center(self, request, center_id).await
    }

    pub async fn update_center(
        &self,
        request: &HttpRequest,
        center_id: i64,
        body: UpdateCenterRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_center(self, request, center_id, body).await
    }

    pub async fn add_teacher(
        &self,
        request: &HttpRequest,
        center_id: i64,
        body: AddCenterTeacherRequest,
    ) -> ActixResult<HttpResponse> {
        teachers::add_center_teacher(self, request, center_id, body).await
    }

    pub async fn get_stats(
        &self,
        request: &HttpRequest,
        center_id: i64,
    ) -> ActixResult<HttpResponse> {
        stats::get_center_stats(self, request, center_id).await
    }
}

/// 读取中心并检查调用者的管理权
pub(crate) async fn load_managed_center(
    storage: &Arc<dyn Storage>,
    request: &HttpRequest,
    user: &User,
    center_id: i64,
) -> std::result::Result<Center, HttpResponse> {
    // 先判权限，避免向其他中心的管理员暴露中心是否存在
    if !can_manage_center(user, center_id) {
        return Err(error_response_with_code(
            request,
            &EduHubError::authorization("You can only manage your own center"),
            ErrorCode::CenterPermissionDenied,
        ));
    }

    match storage.get_center_by_id(center_id).await {
        Ok(Some(center)) => Ok(center),
        Ok(None) => Err(center_not_found(request)),
        Err(e) => Err(error_response(request, &e)),
    }
}

pub(crate) fn center_not_found(request: &HttpRequest) -> HttpResponse {
    error_response_with_code(
        request,
        &EduHubError::not_found("Center not found"),
        ErrorCode::CenterNotFound,
    )
}

/// 组装中心详情：管理员摘要与教师列表
pub(crate) async fn center_response(
    storage: &Arc<dyn Storage>,
    center: Center,
) -> Result<CenterResponse> {
    let admin = storage
        .get_user_by_id(center.admin_id)
        .await?
        .map(|u| UserSummary::from(&u));
    let teachers = storage
        .list_center_members(center.id, UserRole::Teacher)
        .await?
        .iter()
        .map(UserSummary::from)
        .collect();
    Ok(CenterResponse {
        center,
        admin,
        teachers,
    })
}
