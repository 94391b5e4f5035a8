//! 启动时确保存在超级管理员

use rand::Rng;
use rand::distr::Alphanumeric;
use std::sync::Arc;
use tracing::{info, warn};

use crate::errors::Result;
use crate::models::users::entities::{NewUser, UserRole, UserStatus};
use crate::storage::Storage;
use crate::utils::password::hash_password;

const DEFAULT_ADMIN_EMAIL: &str = "admin@eduhub.local";
const GENERATED_PASSWORD_LEN: usize = 16;

fn generate_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

/// 没有超级管理员时创建一个
///
/// 密码取自 `ADMIN_PASSWORD`，未设置时随机生成并以警告级别输出一次。
pub async fn seed_super_admin(storage: &Arc<dyn Storage>) -> Result<()> {
    if storage.count_users_by_role(UserRole::SuperAdmin).await? > 0 {
        return Ok(());
    }

    let email = std::env::var("ADMIN_EMAIL")
        .map(|e| e.trim().to_lowercase())
        .unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_string());
    let (password, generated) = match std::env::var("ADMIN_PASSWORD") {
        Ok(password) if !password.is_empty() => (password, false),
        _ => (generate_password(), true),
    };

    let admin = storage
        .create_user(NewUser {
            full_name: "Super Admin".to_string(),
            email: email.clone(),
            password_hash: hash_password(&password)?,
            role: UserRole::SuperAdmin,
            status: UserStatus::Active,
        })
        .await?;

    if generated {
        warn!(
            "Created super admin {} (id {}) with generated password: {}",
            email, admin.id, password
        );
    } else {
        info!("Created super admin {} (id {})", email, admin.id);
    }
    Ok(())
}
