use crate::models::users::entities::UserRole;
use serde::Deserialize;
use ts_rs::TS;

// 用户登录请求
#[derive(Debug, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

// 用户注册请求
#[derive(Debug, Deserialize, TS)]
#[serde(deny_unknown_fields)]
#[ts(export, export_to = "../frontend/src/types/generated/auth.ts")]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_register_role")]
    pub role: UserRole,
}

fn default_register_role() -> UserRole {
    UserRole::Student
}
