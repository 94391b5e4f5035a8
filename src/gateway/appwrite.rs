//! Appwrite 兼容的对象存储 REST 客户端

use std::time::Duration;

use reqwest::{Client, StatusCode, multipart};
use serde::Deserialize;
use tracing::{debug, warn};

use super::{GatewayError, StorageGateway, StoredObject, UploadRequest, object_key};
use crate::config::StorageGatewayConfig;

/// Appwrite 文件对象（仅取用到的字段）
#[derive(Debug, Deserialize)]
struct AppwriteFile {
    #[serde(rename = "$id")]
    id: String,
    name: String,
    #[serde(rename = "sizeOriginal", default)]
    size_original: i64,
    #[serde(rename = "mimeType", default)]
    mime_type: String,
}

#[derive(Debug, Deserialize)]
struct AppwriteErrorBody {
    #[serde(default)]
    message: String,
    #[serde(rename = "type", default)]
    kind: String,
}

pub struct AppwriteGateway {
    client: Client,
    endpoint: String,
    project_id: String,
    api_key: String,
    bucket_id: String,
    max_retries: u32,
    retry_backoff: Duration,
}

impl AppwriteGateway {
    pub fn new(config: &StorageGatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            project_id: config.project_id.clone(),
            api_key: config.api_key.clone(),
            bucket_id: config.bucket_id.clone(),
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(500),
        })
    }

    fn files_url(&self) -> String {
        format!("{}/storage/buckets/{}/files", self.endpoint, self.bucket_id)
    }

    fn file_url(&self, storage_id: &str) -> String {
        format!("{}/{}", self.files_url(), storage_id)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("X-Appwrite-Project", &self.project_id)
            .header("X-Appwrite-Key", &self.api_key)
    }

    fn into_stored(&self, file: AppwriteFile) -> StoredObject {
        StoredObject {
            url: self.view_url(&file.id),
            storage_id: file.id,
            name: file.name,
            size: file.size_original,
            mime_type: file.mime_type,
        }
    }

    async fn upload_once(
        &self,
        storage_id: &str,
        key: &str,
        request: &UploadRequest,
    ) -> Result<StoredObject, GatewayError> {
        let part = multipart::Part::bytes(request.bytes.clone())
            .file_name(key.to_string())
            .mime_str(&request.mime_type)
            .map_err(|e| GatewayError::InvalidResponse(format!("invalid mime type: {e}")))?;
        let form = multipart::Form::new()
            .text("fileId", storage_id.to_string())
            .part("file", part);

        let response = self
            .authed(self.client.post(self.files_url()))
            .multipart(form)
            .send()
            .await
            .map_err(classify_transport)?;

        let file: AppwriteFile = parse_json(response).await?;
        Ok(self.into_stored(file))
    }
}

/// 传输层错误分类
fn classify_transport(err: reqwest::Error) -> GatewayError {
    if err.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Network(err.to_string())
    }
}

/// 将非成功状态映射为网关错误
fn classify_status(status: StatusCode, body: &str) -> GatewayError {
    let parsed: Option<AppwriteErrorBody> = serde_json::from_str(body).ok();
    let (message, kind) = parsed
        .map(|b| (b.message, b.kind))
        .unwrap_or_else(|| (body.chars().take(200).collect(), String::new()));

    if status == StatusCode::INSUFFICIENT_STORAGE || kind.contains("limit") {
        GatewayError::QuotaExceeded(message)
    } else {
        GatewayError::Rejected {
            status: status.as_u16(),
            message,
        }
    }
}

async fn parse_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, GatewayError> {
    let status = response.status();
    let body = response.text().await.map_err(classify_transport)?;
    if !status.is_success() {
        return Err(classify_status(status, &body));
    }
    serde_json::from_str(&body).map_err(|e| GatewayError::InvalidResponse(e.to_string()))
}

#[async_trait::async_trait]
impl StorageGateway for AppwriteGateway {
    async fn upload(&self, request: UploadRequest) -> Result<StoredObject, GatewayError> {
        let storage_id = uuid::Uuid::new_v4().simple().to_string();
        let key = object_key(&request.folder, &request.original_name, chrono::Utc::now());

        let mut attempt = 0;
        loop {
            match self.upload_once(&storage_id, &key, &request).await {
                Ok(stored) => {
                    debug!(storage_id = %stored.storage_id, key = %key, "Object uploaded");
                    return Ok(stored);
                }
                // 同一个 fileId 重试时，上游可能已经收到上一次请求
                Err(GatewayError::Rejected { status: 409, .. }) if attempt > 0 => {
                    return self.info(&storage_id).await;
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!(attempt, error = %e, "Upload to storage gateway failed, retrying");
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn info(&self, storage_id: &str) -> Result<StoredObject, GatewayError> {
        let response = self
            .authed(self.client.get(self.file_url(storage_id)))
            .send()
            .await
            .map_err(classify_transport)?;
        let file: AppwriteFile = parse_json(response).await?;
        Ok(self.into_stored(file))
    }

    async fn download(&self, storage_id: &str) -> Result<Vec<u8>, GatewayError> {
        let response = self
            .authed(
                self.client
                    .get(format!("{}/download", self.file_url(storage_id))),
            )
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.map_err(classify_transport)?;
            return Err(classify_status(status, &body));
        }
        let bytes = response.bytes().await.map_err(classify_transport)?;
        Ok(bytes.to_vec())
    }

    async fn delete(&self, storage_id: &str) -> Result<(), GatewayError> {
        let response = self
            .authed(self.client.delete(self.file_url(storage_id)))
            .send()
            .await
            .map_err(classify_transport)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.map_err(classify_transport)?;
        Err(classify_status(status, &body))
    }

    fn view_url(&self, storage_id: &str) -> String {
        format!(
            "{}/view?project={}",
            self.file_url(storage_id),
            self.project_id
        )
    }
}
