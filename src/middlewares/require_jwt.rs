/*!
 * JWT 认证中间件
 *
 * 验证 `Authorization: Bearer <token>`，解析出用户后放入请求扩展，
 * 供后续的 [`RequireRole`](super::RequireRole) 和处理程序使用。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::web;
 * use crate::middlewares::RequireJWT;
 *
 * web::scope("/api/v1/tasks")
 *     .wrap(RequireJWT)
 *     .route("", web::get().to(list_tasks));
 * ```
 *
 * 在处理程序中：
 *
 * ```rust,ignore
 * let Some(user) = RequireJWT::extract_user_claims(&req) else { ... };
 * ```
 *
 * ## 认证流程
 *
 * 1. 提取并验证访问令牌（签名、过期、令牌类型）
 * 2. 按令牌中的用户 ID 查缓存，未命中则查存储并回填缓存
 * 3. 非活跃用户一律拒绝
 */

use crate::cache::{ObjectCache, get_json, insert_json, user_cache_key};
use crate::models::{ErrorCode, users::entities};
use crate::storage::Storage;
use crate::utils::jwt::JwtUtils;
use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, error, info};

use super::create_error_response;

const BEARER_PREFIX: &str = "Bearer ";
const AUTHORIZATION_HEADER: &str = "Authorization";

#[derive(Clone)]
pub struct RequireJWT;

enum AuthFailure {
    Unauthorized(String),
    Inactive,
    Misconfigured(&'static str),
}

impl AuthFailure {
    fn into_response(self) -> HttpResponse {
        match self {
            AuthFailure::Unauthorized(msg) => create_error_response(
                StatusCode::UNAUTHORIZED,
                ErrorCode::Unauthorized,
                &format!("Unauthorized: {msg}"),
            ),
            AuthFailure::Inactive => create_error_response(
                StatusCode::UNAUTHORIZED,
                ErrorCode::UserInactive,
                "User account is not active",
            ),
            AuthFailure::Misconfigured(what) => {
                error!("{} is not registered as app data", what);
                create_error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalServerError,
                    "Internal server error",
                )
            }
        }
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

// 提取并验证 JWT access token，返回当前用户
async fn extract_and_validate_jwt(req: &ServiceRequest) -> Result<entities::User, AuthFailure> {
    let token = bearer_token(req).ok_or_else(|| {
        AuthFailure::Unauthorized("Missing or invalid Authorization header".to_string())
    })?;

    let claims = JwtUtils::verify_access_token(token).map_err(|err| {
        info!("JWT token validation failed: {}", err);
        AuthFailure::Unauthorized("Invalid JWT token".to_string())
    })?;

    let user_id = claims
        .user_id()
        .ok_or_else(|| AuthFailure::Unauthorized("Invalid user ID in JWT".to_string()))?;

    let cache = req
        .app_data::<web::Data<Arc<dyn ObjectCache>>>()
        .ok_or(AuthFailure::Misconfigured("ObjectCache"))?
        .get_ref()
        .clone();

    let key = user_cache_key(user_id);
    let user = match get_json::<entities::User>(cache.as_ref(), &key).await {
        Some(user) => user,
        None => {
            debug!("User {} not found in cache, loading from storage", user_id);
            let storage = req
                .app_data::<web::Data<Arc<dyn Storage>>>()
                .ok_or(AuthFailure::Misconfigured("Storage"))?
                .get_ref()
                .clone();

            let user = storage
                .get_user_by_id(user_id)
                .await
                .map_err(|err| {
                    error!("Failed to load user {}: {}", user_id, err);
                    AuthFailure::Unauthorized("Failed to retrieve user".to_string())
                })?
                .ok_or_else(|| AuthFailure::Unauthorized("User not found".to_string()))?;

            insert_json(cache.as_ref(), key, &user).await;
            user
        }
    };

    if !user.is_active() {
        return Err(AuthFailure::Inactive);
    }

    Ok(user)
}

impl<S, B> Transform<S, ServiceRequest> for RequireJWT
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireJWTMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireJWTMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequireJWTMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequireJWTMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        Box::pin(async move {
            // 预检请求直接放行给 CORS 层
            if req.method() == actix_web::http::Method::OPTIONS {
                return Ok(
                    req.into_response(HttpResponse::NoContent().finish().map_into_right_body())
                );
            }

            match extract_and_validate_jwt(&req).await {
                Ok(user) => {
                    debug!("JWT authentication successful for ID: {}", user.id);
                    req.extensions_mut().insert(user);
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Err(failure) => {
                    info!("JWT authentication failed for request to {}", req.path());
                    Ok(req.into_response(failure.into_response().map_into_right_body()))
                }
            }
        })
    }
}

impl RequireJWT {
    /// 从请求扩展中提取当前用户
    pub fn extract_user_claims(req: &actix_web::HttpRequest) -> Option<entities::User> {
        req.extensions().get::<entities::User>().cloned()
    }

    pub fn extract_user_id(req: &actix_web::HttpRequest) -> Option<i64> {
        req.extensions().get::<entities::User>().map(|user| user.id)
    }

    pub fn extract_user_role(req: &actix_web::HttpRequest) -> Option<entities::UserRole> {
        req.extensions().get::<entities::User>().map(|user| user.role)
    }
}
