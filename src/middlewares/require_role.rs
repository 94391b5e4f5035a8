/*!
 * 基于角色的访问控制中间件
 *
 * 此中间件必须在 RequireJWT 中间件之后使用，在进入处理程序前完成角色门检查。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::web;
 * use crate::middlewares::{Operation, RequireJWT, RequireRole};
 *
 * web::resource("/{task_id}")
 *     .route(
 *         web::post()
 *             .to(submit_assignment)
 *             .wrap(RequireRole::for_operation(Operation::SubmitAssignment)),
 *     )
 *     .wrap(RequireJWT);
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use super::capability::Operation;
use super::create_error_response;
use crate::models::{
    ErrorCode,
    users::entities::{self, UserRole},
};

#[derive(Clone)]
pub struct RequireRole {
    required_roles: Vec<UserRole>,
}

impl RequireRole {
    /// 创建需要任一角色的中间件
    pub fn new_any(roles: &[UserRole]) -> Self {
        Self {
            required_roles: roles.to_vec(),
        }
    }

    /// 按操作能力表创建
    pub fn for_operation(operation: Operation) -> Self {
        Self::new_any(operation.allowed_roles())
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            required_roles: self.required_roles.clone(),
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    required_roles: Vec<UserRole>,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
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
        let required_roles = self.required_roles.clone();

        Box::pin(async move {
            let caller = req
                .extensions()
                .get::<entities::User>()
                .map(|user| (user.id, user.role));

            match caller {
                Some((_, role)) if required_roles.contains(&role) => {
                    let res = srv.call(req).await?.map_into_left_body();
                    Ok(res)
                }
                Some((user_id, role)) => {
                    info!(
                        "Access denied for user {} (role: {}) on {} {}. Required roles: {:?}",
                        user_id,
                        role,
                        req.method(),
                        req.path(),
                        required_roles
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::FORBIDDEN,
                            ErrorCode::Forbidden,
                            "Access denied.",
                        )
                        .map_into_right_body(),
                    ))
                }
                None => {
                    info!(
                        "Role check failed: No user found in request. Make sure RequireJWT middleware is applied first."
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            "Authentication required",
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}
