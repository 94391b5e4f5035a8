//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码、类型名称以及 HTTP 状态映射。

use actix_web::http::StatusCode;
use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_eduhub_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum EduHubError {
            $($variant(String),)*
        }

        impl EduHubError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(EduHubError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(EduHubError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(EduHubError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl EduHubError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        EduHubError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_eduhub_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    DatabaseConfig("E002", "Database Configuration Error"),
    DatabaseConnection("E003", "Database Connection Error"),
    DatabaseOperation("E004", "Database Operation Error"),
    FileOperation("E005", "File Operation Error"),
    Validation("E006", "Validation Error"),
    NotFound("E007", "Resource Not Found"),
    Serialization("E008", "Serialization Error"),
    DateParse("E009", "Date Parse Error"),
    Authentication("E010", "Authentication Error"),
    Authorization("E011", "Authorization Error"),
    AlreadySubmitted("E012", "Already Submitted"),
    DeadlineExpired("E013", "Deadline Expired"),
    Conflict("E014", "Conflict"),
    UploadFailed("E015", "Upload Failed"),
    UpstreamUnavailable("E016", "Upstream Unavailable"),
    Internal("E017", "Internal Error"),
    SelfGrading("E018", "Self Grading Forbidden"),
    CapacityExceeded("E019", "Capacity Exceeded"),
}

impl EduHubError {
    /// 对应的 HTTP 状态码
    pub fn http_status(&self) -> StatusCode {
        match self {
            EduHubError::Validation(_)
            | EduHubError::AlreadySubmitted(_)
            | EduHubError::DeadlineExpired(_)
            | EduHubError::CapacityExceeded(_)
            | EduHubError::DateParse(_) => StatusCode::BAD_REQUEST,
            EduHubError::NotFound(_) => StatusCode::NOT_FOUND,
            EduHubError::Authentication(_) => StatusCode::UNAUTHORIZED,
            EduHubError::Authorization(_) | EduHubError::SelfGrading(_) => StatusCode::FORBIDDEN,
            EduHubError::Conflict(_) => StatusCode::CONFLICT,
            EduHubError::UploadFailed(_) | EduHubError::UpstreamUnavailable(_) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 是否为可重试的上游错误（网络/超时）
    pub fn is_retryable(&self) -> bool {
        matches!(self, EduHubError::UpstreamUnavailable(_))
    }

    /// 是否为服务端内部错误（需要记录上下文并对外隐藏细节）
    pub fn is_internal(&self) -> bool {
        self.http_status() == StatusCode::INTERNAL_SERVER_ERROR
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for EduHubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for EduHubError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for EduHubError {
    fn from(err: sea_orm::DbErr) -> Self {
        EduHubError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for EduHubError {
    fn from(err: std::io::Error) -> Self {
        EduHubError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for EduHubError {
    fn from(err: serde_json::Error) -> Self {
        EduHubError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for EduHubError {
    fn from(err: chrono::ParseError) -> Self {
        EduHubError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EduHubError>;
