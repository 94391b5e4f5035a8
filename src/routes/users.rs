use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, Operation};
use crate::models::users::requests::UpdateUserRoleRequest;
use crate::services::UserService;

// 懒加载的全局 UserService 实例
static USER_SERVICE: Lazy<UserService> = Lazy::new(UserService::new_lazy);

pub async fn update_user_role(
    req: HttpRequest,
    user_id: web::Path<i64>,
    body: web::Json<UpdateUserRoleRequest>,
) -> ActixResult<HttpResponse> {
    USER_SERVICE
        .update_role(&req, user_id.into_inner(), body.into_inner())
        .await
}

// 配置路由
pub fn configure_user_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/users")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/{id}/role")
                    .route(web::put().to(update_user_role))
                    .wrap(middlewares::RequireRole::for_operation(
                        Operation::ChangeUserRole,
                    )),
            ),
    );
}
