use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::{CenterService, load_managed_center};
use crate::middlewares::Operation;
use crate::models::ApiResponse;
use crate::models::centers::responses::CenterStatsResponse;
use crate::models::groups::entities::Group;
use crate::models::users::entities::UserRole;
use crate::services::{authorized_user, error_response};

fn build_stats(center_id: i64, total_teachers: usize, groups: &[Group]) -> CenterStatsResponse {
    CenterStatsResponse {
        center_id,
        total_teachers: total_teachers as i64,
        total_groups: groups.len() as i64,
        active_groups: groups.iter().filter(|g| g.is_active).count() as i64,
        total_students: groups.iter().map(|g| i64::from(g.current_students)).sum(),
    }
}

/// GET /centers/{id}/stats
pub async fn get_center_stats(
    service: &CenterService,
    request: &HttpRequest,
    center_id: i64,
) -> ActixResult<HttpResponse> {
    let user = match authorized_user(request, Operation::ViewCenterStats) {
        Ok(user) => user,
        Err(e) => return Ok(error_response(request, &e)),
    };
    let storage = match service.get_storage(request) {
        Ok(storage) => storage,
        Err(e) => return Ok(error_response(request, &e)),
    };
    if let Err(resp) = load_managed_center(&storage, request, &user, center_id).await {
        return Ok(resp);
    }

    let teachers = match storage.list_center_members(center_id, UserRole::Teacher).await {
        Ok(teachers) => teachers,
        Err(e) => return Ok(error_response(request, &e)),
    };
    match storage.list_groups_by_center(center_id).await {
        Ok(groups) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            build_stats(center_id, teachers.len(), &groups),
            "Query successful",
        ))),
        Err(e) => Ok(error_response(request, &e)),
    }
}
