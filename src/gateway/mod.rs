//! 对象存储网关
//!
//! 文件字节只保存在外部对象存储中，本地仅持久化其返回的 ID / URL 等元数据。

pub mod appwrite;

use std::fmt;

use crate::errors::EduHubError;

pub use appwrite::AppwriteGateway;

/// 上传请求
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub bytes: Vec<u8>,
    pub folder: String,
    pub original_name: String,
    pub mime_type: String,
}

/// 存储网关返回的对象元数据
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub storage_id: String,
    pub url: String,
    pub name: String,
    pub size: i64,
    pub mime_type: String,
}

/// 网关错误分类
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// 请求超时
    Timeout,
    /// 网络层失败（连接被拒绝、DNS 等）
    Network(String),
    /// 上游返回非成功状态
    Rejected { status: u16, message: String },
    /// 存储配额不足
    QuotaExceeded(String),
    /// 上游响应无法解析
    InvalidResponse(String),
}

impl GatewayError {
    /// 网络/超时/5xx 可重试，其余为终止性错误
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::Timeout | GatewayError::Network(_) => true,
            GatewayError::Rejected { status, .. } => *status >= 500 || *status == 429,
            GatewayError::QuotaExceeded(_) | GatewayError::InvalidResponse(_) => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::Rejected { status: 404, .. })
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Timeout => write!(f, "storage gateway timed out"),
            GatewayError::Network(e) => write!(f, "storage gateway unreachable: {e}"),
            GatewayError::Rejected { status, message } => {
                write!(f, "storage gateway rejected request ({status}): {message}")
            }
            GatewayError::QuotaExceeded(e) => write!(f, "storage quota exceeded: {e}"),
            GatewayError::InvalidResponse(e) => write!(f, "invalid storage gateway response: {e}"),
        }
    }
}

impl std::error::Error for GatewayError {}

impl From<GatewayError> for EduHubError {
    fn from(err: GatewayError) -> Self {
        if err.is_retryable() {
            EduHubError::upstream_unavailable(err.to_string())
        } else {
            EduHubError::upload_failed(err.to_string())
        }
    }
}

/// 对象存储网关抽象
#[async_trait::async_trait]
pub trait StorageGateway: Send + Sync {
    /// 上传文件；至少一次语义，调用方需容忍重复对象
    async fn upload(&self, request: UploadRequest) -> Result<StoredObject, GatewayError>;
    async fn info(&self, storage_id: &str) -> Result<StoredObject, GatewayError>;
    async fn download(&self, storage_id: &str) -> Result<Vec<u8>, GatewayError>;
    async fn delete(&self, storage_id: &str) -> Result<(), GatewayError>;
    fn view_url(&self, storage_id: &str) -> String;
}

/// 生成对象名：`{folder}/{unix_millis}_{清洗后的原始文件名}`
pub fn object_key(folder: &str, original_name: &str, now: chrono::DateTime<chrono::Utc>) -> String {
    format!(
        "{}/{}_{}",
        folder.trim_matches('/'),
        now.timestamp_millis(),
        sanitize_file_name(original_name)
    )
}

/// 清洗文件名，仅保留字母数字与 `.-_`
pub fn sanitize_file_name(name: &str) -> String {
    // 去掉客户端可能带上的路径
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(100)
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}
