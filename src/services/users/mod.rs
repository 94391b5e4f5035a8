pub mod role;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::errors::Result;
use crate::models::users::requests::UpdateUserRoleRequest;
use crate::storage::Storage;

pub struct UserService {
    storage: Option<Arc<dyn Storage>>,
}

impl UserService {
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

    /// 管理员变更用户角色
    pub async fn update_role(
        &self,
        request: &HttpRequest,
        user_id: i64,
        body: UpdateUserRoleRequest,
    ) -> ActixResult<HttpResponse> {
        role::update_user_role(self, request, user_id, body).await
    }
}
