use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::models::{ApiResponse, auth::responses::UserInfoResponse};
use crate::services::{current_user, error_response};

pub async fn handle_me(request: &HttpRequest) -> ActixResult<HttpResponse> {
    match current_user(request) {
        Ok(user) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            UserInfoResponse { user },
            "Query successful",
        ))),
        Err(e) => Ok(error_response(request, &e)),
    }
}
