//! 应用通用错误

use super::{ApiError, AuthError};

/// 应用通用错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// IO 错误
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 设置错误
    #[error("设置错误: {0}")]
    Settings(#[from] SettingsError),

    /// HTTP API 错误
    #[error("API 错误: {0}")]
    Api(#[from] ApiError),

    /// 认证错误
    #[error("认证错误: {0}")]
    Auth(#[from] AuthError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),
}

/// 设置相关错误
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// 保存设置失败
    #[error("保存设置失败: {source}")]
    Save {
        #[source]
        source: std::io::Error,
    },

    /// 设置值无效
    #[error("设置值无效: {0}")]
    InvalidValue(String),
}
