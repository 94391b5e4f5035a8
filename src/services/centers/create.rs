use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::CenterService;
use crate::cache::user_cache_key;
use crate::errors::EduHubError;
use crate::middlewares::Operation;
use crate::models::centers::{
    entities::NewCenter, requests::CreateCenterRequest, responses::CenterResponse,
};
use crate::models::users::entities::{UserRole, UserSummary};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{
    authorized_user, error_response, error_response_with_code, validation_response,
};

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// POST /centers：创建中心并任命管理员（须为教师）
pub async fn create_center(
    service: &CenterService,
    request: &HttpRequest,
    body: CreateCenterRequest,
) -> ActixResult<HttpResponse> {
    let admin = match authorized_user(request, Operation::CreateCenter) {
        Ok(admin) => admin,
        Err(e) => return Ok(error_response(request, &e)),
    };
    if let Err(issues) = body.validate() {
        return Ok(validation_response(issues));
    }
    let (storage, cache) = match service
        .get_storage(request)
        .and_then(|s| service.get_cache(request).map(|c| (s, c)))
    {
        Ok(pair) => pair,
        Err(e) => return Ok(error_response(request, &e)),
    };

    let admin_email = body.admin_email.trim().to_lowercase();
    let center_admin = match storage.get_user_by_email(&admin_email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(error_response_with_code(
                request,
                &EduHubError::not_found("Center admin not found"),
                ErrorCode::UserNotFound,
            ));
        }
        Err(e) => return Ok(error_response(request, &e)),
    };
    if center_admin.role != UserRole::Teacher {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::RoleTransitionInvalid,
            format!(
                "Only a teacher can become a center admin (current role: '{}')",
                center_admin.role
            ),
        )));
    }

    let new_center = NewCenter {
        name: body.name.trim().to_string(),
        description: trimmed(body.description),
        address: trimmed(body.address),
        phone: trimmed(body.phone),
        email: trimmed(body.email).map(|e| e.to_lowercase()),
        website: trimmed(body.website),
        admin_id: center_admin.id,
    };
    match storage.create_center(new_center).await {
        Ok(center) => {
            cache.remove(&user_cache_key(center_admin.id)).await;
            info!(
                "Center {} created by admin {} with center admin {}",
                center.id, admin.id, center_admin.id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                CenterResponse {
                    center,
                    admin: Some(UserSummary::from(&center_admin)),
                    teachers: Vec::new(),
                },
                "Center created",
            )))
        }
        Err(e) => Ok(error_response(request, &e)),
    }
}
