use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, Operation, RequireRole};
use crate::models::tasks::requests::{CreateTaskRequest, TaskListParams, UpdateTaskRequest};
use crate::services::TaskService;

// 懒加载的全局 TaskService 实例
static TASK_SERVICE: Lazy<TaskService> = Lazy::new(TaskService::new_lazy);

// 列出任务
pub async fn list_tasks(
    req: HttpRequest,
    query: web::Query<TaskListParams>,
) -> ActixResult<HttpResponse> {
    TASK_SERVICE.list_tasks(&req, query.into_inner()).await
}

// 创建任务
pub async fn create_task(
    req: HttpRequest,
    body: web::Json<CreateTaskRequest>,
) -> ActixResult<HttpResponse> {
    TASK_SERVICE.create_task(&req, body.into_inner()).await
}

// 获取任务详情
pub async fn get_task(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    TASK_SERVICE.get_task(&req, path.into_inner()).await
}

// 更新任务
pub async fn update_task(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateTaskRequest>,
) -> ActixResult<HttpResponse> {
    TASK_SERVICE
        .update_task(&req, path.into_inner(), body.into_inner())
        .await
}

// 删除任务
pub async fn delete_task(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    TASK_SERVICE.delete_task(&req, path.into_inner()).await
}

// 上传任务附件
pub async fn upload_attachment(
    req: HttpRequest,
    path: web::Path<i64>,
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    TASK_SERVICE
        .upload_attachment(&req, path.into_inner(), payload)
        .await
}

// 任务提交统计
pub async fn get_task_stats(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    TASK_SERVICE.get_stats(&req, path.into_inner()).await
}

// 配置路由
pub fn configure_tasks_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/tasks")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    // 所有登录用户可访问
                    .route(web::get().to(list_tasks))
                    .route(
                        web::post()
                            .to(create_task)
                            .wrap(RequireRole::for_operation(Operation::CreateTask)),
                    ),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_task))
                    // 创建者身份在业务层检查
                    .route(
                        web::put()
                            .to(update_task)
                            .wrap(RequireRole::for_operation(Operation::UpdateTask)),
                    )
                    .route(
                        web::delete()
                            .to(delete_task)
                            .wrap(RequireRole::for_operation(Operation::DeleteTask)),
                    ),
            )
            .service(
                web::resource("/{id}/attachment")
                    .route(web::post().to(upload_attachment))
                    .wrap(RequireRole::for_operation(Operation::UploadTaskAttachment)),
            )
            .service(
                web::resource("/{id}/stats")
                    .route(web::get().to(get_task_stats))
                    .wrap(RequireRole::for_operation(Operation::ViewTaskStats)),
            ),
    );
}
