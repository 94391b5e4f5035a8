use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::{MokaCache, ObjectCache};
use crate::config::AppConfig;
use crate::errors::{EduHubError, Result};
use crate::gateway::{AppwriteGateway, StorageGateway};
use crate::services::auth::seed_super_admin;
use crate::services::submissions::SubmissionWorkflow;
use crate::storage::Storage;
use crate::utils::UploadPolicy;

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
    pub gateway: Arc<dyn StorageGateway>,
    pub workflow: Arc<SubmissionWorkflow>,
}

/// 创建缓存实例
fn create_cache() -> Arc<dyn ObjectCache> {
    let config = AppConfig::get();
    warn!(
        "Creating Moka (in-memory) cache backend (capacity: {}, ttl: {}s)",
        config.cache.memory.max_capacity, config.cache.default_ttl
    );
    Arc::new(MokaCache::from_config(&config.cache))
}

/// 创建文件存储网关
fn create_gateway() -> Result<Arc<dyn StorageGateway>> {
    let config = AppConfig::get();
    let gateway = AppwriteGateway::new(&config.storage_gateway)
        .map_err(|e| EduHubError::internal(format!("Storage gateway: {e}")))?;
    warn!(
        "Storage gateway initialized (endpoint: {}, bucket: {})",
        config.storage_gateway.endpoint, config.storage_gateway.bucket_id
    );
    Ok(Arc::new(gateway))
}

/// 准备服务器启动的上下文
/// 包括存储、缓存、文件网关与提交工作流
pub async fn prepare_server_startup() -> Result<StartupContext> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| EduHubError::internal("Failed to install rustls crypto provider"))?;

    let config = AppConfig::get();

    let storage = crate::storage::create_storage().await?;
    warn!("Storage backend initialized and migrations completed");

    // 初始化超级管理员账号（如果需要）
    if let Err(e) = seed_super_admin(&storage).await {
        warn!("Failed to seed super admin account: {}", e);
    }

    let cache = create_cache();
    let gateway = create_gateway()?;

    let workflow = Arc::new(SubmissionWorkflow::new(
        storage.clone(),
        gateway.clone(),
        UploadPolicy::from(&config.upload),
        config.request_deadline(),
        config.storage_gateway.submission_folder.clone(),
    ));
    debug!(
        "Submission workflow ready (upload timeout: {:?})",
        config.request_deadline()
    );

    Ok(StartupContext {
        storage,
        cache,
        gateway,
        workflow,
    })
}
