//! 请求参数解析失败时的统一响应

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{Error, HttpRequest, HttpResponse};

use crate::models::{ApiResponse, ErrorCode};

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> Error {
    let message = format!("Invalid JSON body: {err}");
    actix_web::error::InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message)),
    )
    .into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> Error {
    let message = format!("Invalid query parameters: {err}");
    actix_web::error::InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message)),
    )
    .into()
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> Error {
    let message = format!("Invalid path parameter: {err}");
    actix_web::error::InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(ApiResponse::error_empty(ErrorCode::BadRequest, message)),
    )
    .into()
}
