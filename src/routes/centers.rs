use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, Operation, RequireRole};
use crate::models::centers::requests::{
    AddCenterTeacherRequest, CenterListParams, CreateCenterRequest, UpdateCenterRequest,
};
use crate::services::CenterService;

// 懒加载的全局 CenterService 实例
static CENTER_SERVICE: Lazy<CenterService> = Lazy::new(CenterService::new_lazy);

pub async fn list_centers(
    req: HttpRequest,
    query: web::Query<CenterListParams>,
) -> ActixResult<HttpResponse> {
    CENTER_SERVICE.list_centers(&req, query.into_inner()).await
}

pub async fn create_center(
    req: HttpRequest,
    body: web::Json<CreateCenterRequest>,
) -> ActixResult<HttpResponse> {
    CENTER_SERVICE.create_center(&req, body.into_inner()).await
}

pub async fn get_center(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    CENTER_SERVICE.get_center(&req, path.into_inner()).await
}

pub async fn update_center(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateCenterRequest>,
) -> ActixResult<HttpResponse> {
    CENTER_SERVICE
        .update_center(&req, path.into_inner(), body.into_inner())
        .await
}

// 教师加入中心
pub async fn add_center_teacher(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<AddCenterTeacherRequest>,
) -> ActixResult<HttpResponse> {
    CENTER_SERVICE
        .add_teacher(&req, path.into_inner(), body.into_inner())
        .await
}

pub async fn get_center_stats(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    CENTER_SERVICE.get_stats(&req, path.into_inner()).await
}

// 配置路由
pub fn configure_centers_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/centers")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(
                        web::get()
                            .to(list_centers)
                            .wrap(RequireRole::for_operation(Operation::ListCenters)),
                    )
                    .route(
                        web::post()
                            .to(create_center)
                            .wrap(RequireRole::for_operation(Operation::CreateCenter)),
                    ),
            )
            .service(
                web::resource("/{id}")
                    // 中心归属在业务层检查
                    .route(
                        web::get()
                            .to(get_center)
                            .wrap(RequireRole::for_operation(Operation::ReadCenter)),
                    )
                    .route(
                        web::put()
                            .to(update_center)
                            .wrap(RequireRole::for_operation(Operation::UpdateCenter)),
                    ),
            )
            .service(
                web::resource("/{id}/teachers")
                    .route(web::post().to(add_center_teacher))
                    .wrap(RequireRole::for_operation(Operation::AddCenterTeacher)),
            )
            .service(
                web::resource("/{id}/stats")
                    .route(web::get().to(get_center_stats))
                    .wrap(RequireRole::for_operation(Operation::ViewCenterStats)),
            ),
    );
}
