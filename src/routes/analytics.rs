use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, Operation, RequireRole};
use crate::services::AnalyticsService;

static ANALYTICS_SERVICE: Lazy<AnalyticsService> = Lazy::new(AnalyticsService::new_lazy);

pub async fn task_activity(req: HttpRequest) -> ActixResult<HttpResponse> {
    ANALYTICS_SERVICE.task_activity(&req).await
}

pub async fn monthly_activity(req: HttpRequest) -> ActixResult<HttpResponse> {
    ANALYTICS_SERVICE.monthly_activity(&req).await
}

pub async fn recent_tasks(req: HttpRequest) -> ActixResult<HttpResponse> {
    ANALYTICS_SERVICE.recent_tasks(&req).await
}

// 配置路由（仅教师）
pub fn configure_analytics_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/analytics")
            .wrap(RequireRole::for_operation(Operation::ViewTeachingAnalytics))
            .wrap(middlewares::RequireJWT)
            .route("/tasks/activity", web::get().to(task_activity))
            .route("/tasks/monthly", web::get().to(monthly_activity))
            .route("/tasks/recent", web::get().to(recent_tasks)),
    );
}
