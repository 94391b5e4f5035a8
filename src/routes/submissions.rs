use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares::{self, Operation, RequireRole};
use crate::models::submissions::requests::{
    AllSubmissionsParams, GradeSubmissionRequest, SubmissionListParams,
};
use crate::services::SubmissionService;

// 懒加载的全局 SubmissionService 实例
static SUBMISSION_SERVICE: Lazy<SubmissionService> = Lazy::new(SubmissionService::new_lazy);

// 提交作业
pub async fn submit_assignment(
    req: HttpRequest,
    path: web::Path<i64>, // task_id
    payload: Multipart,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .submit(&req, path.into_inner(), payload)
        .await
}

// 某任务下的提交
pub async fn list_task_submissions(
    req: HttpRequest,
    path: web::Path<i64>, // task_id
    query: web::Query<SubmissionListParams>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .list_for_task(&req, path.into_inner(), query.into_inner())
        .await
}

// 获取单个提交
pub async fn get_submission(req: HttpRequest, path: web::Path<i64>) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .get_single(&req, path.into_inner())
        .await
}

// 评分
pub async fn grade_submission(
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<GradeSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .grade(&req, path.into_inner(), body.into_inner())
        .await
}

// 学习进度
pub async fn get_progress(req: HttpRequest) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE.progress(&req).await
}

// 我的提交
pub async fn list_my_submissions(req: HttpRequest) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE.my_submissions(&req).await
}

// 教师名下全部提交
pub async fn list_all_submissions(
    req: HttpRequest,
    query: web::Query<AllSubmissionsParams>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .list_all(&req, query.into_inner())
        .await
}

// 配置路由
pub fn configure_submissions_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/submissions")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_all_submissions))
                    .wrap(RequireRole::for_operation(Operation::ListAllSubmissions)),
            )
            // 静态路径需先于 /{task_id} 注册
            .service(
                web::resource("/progress")
                    .route(web::get().to(get_progress))
                    .wrap(RequireRole::for_operation(Operation::ViewProgress)),
            )
            .service(
                web::resource("/student/my-submissions")
                    .route(web::get().to(list_my_submissions))
                    .wrap(RequireRole::for_operation(Operation::ListMySubmissions)),
            )
            .service(
                web::resource("/single/{id}")
                    .route(web::get().to(get_submission))
                    .wrap(RequireRole::for_operation(Operation::ReadSubmission)),
            )
            .service(
                web::resource("/{id}/grade")
                    .route(web::put().to(grade_submission))
                    .wrap(RequireRole::for_operation(Operation::GradeSubmission)),
            )
            .service(
                web::resource("/{task_id}")
                    .route(
                        web::post()
                            .to(submit_assignment)
                            .wrap(RequireRole::for_operation(Operation::SubmitAssignment)),
                    )
                    .route(
                        web::get()
                            .to(list_task_submissions)
                            .wrap(RequireRole::for_operation(Operation::ListTaskSubmissions)),
                    ),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{MokaCache, ObjectCache};
    use crate::models::ErrorCode;
    use crate::models::users::entities::{User, UserRole};
    use crate::services::submissions::SubmissionWorkflow;
    use crate::services::submissions::workflow::tests::{
        GatewayBehavior, MemoryStorage, RecordingGateway, test_policy,
    };
    use crate::storage::Storage;
    use crate::utils::jwt::JwtUtils;
    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test};
    use chrono::{Duration as ChronoDuration, Utc};
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::time::Duration;

    const BOUNDARY: &str = "eduhub-route-boundary";

    struct Harness {
        storage: Arc<MemoryStorage>,
        gateway: Arc<RecordingGateway>,
        workflow: Arc<SubmissionWorkflow>,
    }

    impl Harness {
        fn new() -> Self {
            let storage = Arc::new(MemoryStorage::default());
            let gateway = Arc::new(RecordingGateway::new(GatewayBehavior::Succeed));
            let workflow = Arc::new(SubmissionWorkflow::new(
                storage.clone(),
                gateway.clone(),
                test_policy(),
                Duration::from_secs(2),
                "submissions",
            ));
            Self {
                storage,
                gateway,
                workflow,
            }
        }
    }

    macro_rules! submissions_app {
        ($harness:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($harness.storage.clone() as Arc<dyn Storage>))
                    .app_data(web::Data::new(
                        Arc::new(MokaCache::new(100, Duration::from_secs(60))) as Arc<dyn ObjectCache>
                    ))
                    .app_data(web::Data::new($harness.workflow.clone()))
                    .configure(configure_submissions_routes),
            )
            .await
        };
    }

    fn bearer(user: &User) -> (header::HeaderName, String) {
        let token = JwtUtils::generate_access_token(user.id, user.role.as_str()).unwrap();
        (header::AUTHORIZATION, format!("Bearer {token}"))
    }

    fn pdf_form(filename: &str, size: usize) -> (String, Vec<u8>) {
        let mut bytes = b"%PDF-1.4 homework".to_vec();
        bytes.resize(size, b' ');
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/pdf\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(&bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        (format!("multipart/form-data; boundary={BOUNDARY}"), body)
    }

    fn submit_request(user: &User, task_id: i64) -> test::TestRequest {
        let (content_type, body) = pdf_form("hw.pdf", 2 * 1024 * 1024);
        test::TestRequest::post()
            .uri(&format!("/api/v1/submissions/{task_id}"))
            .insert_header(bearer(user))
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body)
    }

    #[actix_web::test]
    async fn test_static_paths_win_over_task_id() {
        let h = Harness::new();
        let student = h.storage.add_user("Alice", UserRole::Student);
        let app = submissions_app!(h);

        let req = test::TestRequest::get()
            .uri("/api/v1/submissions/progress")
            .insert_header(bearer(&student))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["progress"]["totalTasks"], json!(0));

        let req = test::TestRequest::get()
            .uri("/api/v1/submissions/student/my-submissions")
            .insert_header(bearer(&student))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["submissions"], json!([]));

        let req = test::TestRequest::get()
            .uri("/api/v1/submissions/single/99")
            .insert_header(bearer(&student))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], json!(ErrorCode::SubmissionNotFound as i32));
    }

    #[actix_web::test]
    async fn test_student_cannot_reach_grade_handler() {
        let h = Harness::new();
        let student = h.storage.add_user("Alice", UserRole::Student);
        let app = submissions_app!(h);

        // 请求体无效：角色检查先于 JSON 解析
        let req = test::TestRequest::put()
            .uri("/api/v1/submissions/1/grade")
            .insert_header(bearer(&student))
            .insert_header((header::CONTENT_TYPE, "application/json"))
            .set_payload("{not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_missing_token_is_unauthorized() {
        let h = Harness::new();
        let app = submissions_app!(h);

        let req = test::TestRequest::get()
            .uri("/api/v1/submissions/progress")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn test_submit_grade_and_visibility_over_http() {
        let h = Harness::new();
        let teacher = h.storage.add_user("Teacher", UserRole::Teacher);
        let alice = h.storage.add_user("Alice", UserRole::Student);
        let bob = h.storage.add_user("Bob", UserRole::Student);
        let task = h
            .storage
            .add_task(teacher.id, Utc::now() + ChronoDuration::hours(1));
        let app = submissions_app!(h);

        let resp = test::call_service(&app, submit_request(&alice, task.id).to_request()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let submission = &body["data"]["submission"];
        assert_eq!(submission["is_graded"], json!(false));
        assert_eq!(submission["original_name"], json!("hw.pdf"));
        assert_eq!(submission["file_size"], json!(2 * 1024 * 1024));
        let id = submission["id"].as_i64().unwrap();

        let req = test::TestRequest::put()
            .uri(&format!("/api/v1/submissions/{id}/grade"))
            .insert_header(bearer(&teacher))
            .set_json(json!({ "score": 88, "feedback": "Good work" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["submission"]["is_graded"], json!(true));
        assert_eq!(body["data"]["submission"]["score"], json!(88.0));
        assert_eq!(body["data"]["submission"]["feedback"], json!("Good work"));

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/submissions/single/{id}"))
            .insert_header(bearer(&bob))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let resp = test::call_service(&app, submit_request(&alice, task.id).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], json!(ErrorCode::AlreadySubmitted as i32));
        assert_eq!(h.gateway.upload_count(), 1);

        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/submissions/{}", task.id))
            .insert_header(bearer(&teacher))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["submissions"].as_array().map(Vec::len), Some(1));
        assert!(body["data"]["pagination"].is_object());
    }
}
