use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use std::sync::OnceLock;
use std::time::Duration;

use super::AppConfig;

static APP_CONFIG: OnceLock<AppConfig> = OnceLock::new();

/// 示例配置中的占位密钥，生产环境禁止使用
const PLACEHOLDER_SECRET: &str = "change-me-in-production";

/// 常用环境变量到配置键的映射（优先级高于 EDUHUB__* 变量）
const ENV_ALIASES: &[(&str, &str)] = &[
    ("APP_ENV", "app.environment"),
    ("RUST_LOG", "app.log_level"),
    ("SERVER_HOST", "server.host"),
    ("SERVER_PORT", "server.port"),
    ("UNIX_SOCKET", "server.unix_socket_path"),
    ("CPU_COUNT", "server.workers"),
    ("JWT_SECRET", "jwt.secret"),
    ("DATABASE_URL", "database.url"),
    ("STORAGE_ENDPOINT", "storage_gateway.endpoint"),
    ("STORAGE_PROJECT_ID", "storage_gateway.project_id"),
    ("STORAGE_API_KEY", "storage_gateway.api_key"),
    ("STORAGE_BUCKET_ID", "storage_gateway.bucket_id"),
];

fn environment_name() -> String {
    std::env::var("APP_ENV").unwrap_or_else(|_| "development".into())
}

/// 配置来源：config.toml → config.{APP_ENV}.toml → EDUHUB__* → 别名变量
fn layered_sources() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(File::with_name(&format!("config.{}", environment_name())).required(false))
        .add_source(
            Environment::with_prefix("EDUHUB")
                .separator("__")
                .try_parsing(true),
        );

    ENV_ALIASES
        .iter()
        .try_fold(builder, |builder, (var, key)| {
            builder.set_override_option(*key, std::env::var(var).ok())
        })
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_builder(layered_sources()?)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let mut app_config: AppConfig = builder.build()?.try_deserialize()?;

        // workers = 0 表示按 CPU 数自动选择
        if app_config.server.workers == 0 {
            app_config.server.workers = num_cpus::get().min(app_config.server.max_workers).max(1);
        }

        app_config.check()?;
        Ok(app_config)
    }

    /// 启动前的一致性检查
    fn check(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.trim().is_empty() {
            return Err(ConfigError::Message("jwt.secret must not be empty".into()));
        }
        if self.is_production() && self.jwt.secret == PLACEHOLDER_SECRET {
            return Err(ConfigError::Message(
                "jwt.secret still uses the placeholder value in production".into(),
            ));
        }
        if self.upload.max_size == 0 || self.upload.max_size > self.server.limits.max_payload_size {
            return Err(ConfigError::Message(format!(
                "upload.max_size ({}) must be positive and fit in server.limits.max_payload_size ({})",
                self.upload.max_size, self.server.limits.max_payload_size
            )));
        }
        if self.server.timeouts.request_deadline == 0 {
            return Err(ConfigError::Message(
                "server.timeouts.request_deadline must be positive".into(),
            ));
        }
        Ok(())
    }

    /// 全局配置；首次访问时加载，失败直接退出进程
    pub fn get() -> &'static AppConfig {
        APP_CONFIG.get_or_init(|| match Self::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Invalid EduHub configuration: {e}");
                std::process::exit(1);
            }
        })
    }

    /// 启动时显式加载，重复调用返回错误
    pub fn init() -> Result<(), ConfigError> {
        APP_CONFIG
            .set(Self::load()?)
            .map_err(|_| ConfigError::Message("configuration was loaded twice".to_string()))
    }

    pub fn is_production(&self) -> bool {
        self.app.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.app.environment == "development"
    }

    pub fn server_bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    #[cfg(unix)]
    pub fn unix_socket_path(&self) -> Option<&str> {
        Some(self.server.unix_socket_path.as_str()).filter(|path| !path.is_empty())
    }

    /// 单个请求（含上传）的截止时间
    pub fn request_deadline(&self) -> Duration {
        Duration::from_millis(self.server.timeouts.request_deadline)
    }
}
