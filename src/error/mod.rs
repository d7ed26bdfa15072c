//! 统一错误处理模块
//!
//! 提供项目中所有模块的结构化错误类型，替代 String 错误。

mod api;
mod app;
mod auth;

// 重新导出所有错误类型，便于使用
pub use api::ApiError;
pub use app::{AppError, SettingsError};
pub use auth::AuthError;
