use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, Operation, RequireRole};
use crate::models::groups::requests::{
    AddGroupStudentRequest, CreateGroupRequest, GroupListParams, UpdateGroupRequest,
};
use crate::services::GroupService;

// 懒加载的全局 GroupService 实例
static GROUP_SERVICE: Lazy<GroupService> = Lazy::new(GroupService::new_lazy);

pub async fn list_groups(
    req: HttpRequest,
    query: web::Query<GroupListParams>,
) -> ActixResult<HttpResponse> {
    GROUP_SERVICE.list_groups(&req, query.into_inner()).await
}

pub async fn create_group(
    req: HttpRequest,
    body: web::Json<CreateGroupRequest>,
) -> ActixResult<HttpResponse> {
    GROUP_SERVICE.create_group(&req, body.into_inner()).await
}

pub async fn get_group(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    GROUP_SERVICE.get_group(&req, path.into_inner()).await
}

pub async fn update_group(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateGroupRequest>,
) -> ActixResult<HttpResponse> {
    GROUP_SERVICE
        .update_group(&req, path.into_inner(), body.into_inner())
        .await
}

pub async fn delete_group(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    GROUP_SERVICE.delete_group(&req, path.into_inner()).await
}

// 添加学生
pub async fn add_group_student(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<AddGroupStudentRequest>,
) -> ActixResult<HttpResponse> {
    GROUP_SERVICE
        .add_student(&req, path.into_inner(), body.into_inner())
        .await
}

// 移出学生
pub async fn remove_group_student(
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> ActixResult<HttpResponse> {
    let (group_id, student_id) = path.into_inner();
    GROUP_SERVICE.remove_student(&req, group_id, student_id).await
}

// 配置路由
pub fn configure_groups_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/groups")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_groups))
                    .route(
                        web::post()
                            .to(create_group)
                            .wrap(RequireRole::for_operation(Operation::CreateGroup)),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_group))
                    // 小组管理权在业务层检查
                    .route(
                        web::put()
                            .to(update_group)
                            .wrap(RequireRole::for_operation(Operation::UpdateGroup)),
                    )
                    .route(
                        web::delete()
                            .to(delete_group)
                            .wrap(RequireRole::for_operation(Operation::DeleteGroup)),
                    ),
            )
            .service(
                web::resource("/{id}/students")
                    .route(web::post().to(add_group_student))
                    .wrap(RequireRole::for_operation(Operation::ManageGroupStudents)),
            )
            .service(
                web::resource("/{id}/students/{student_id}")
                    .route(web::delete().to(remove_group_student))
                    .wrap(RequireRole::for_operation(Operation::ManageGroupStudents)),
            ),
    );
}
