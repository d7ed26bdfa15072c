//! Token 生命周期相关错误

use super::ApiError;

/// 认证 / 刷新错误类型
///
/// 刷新失败对会话是致命的：调用方需要走 `Session::logout`。
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// 本地没有 refresh token
    #[error("没有可用的 refresh token")]
    NoRefreshToken,

    /// 后端返回成功但没有 access token
    #[error("刷新响应中没有 access token")]
    MissingAccessToken,

    /// 后端拒绝刷新 / 换取 token
    #[error("token 请求被拒绝: {0}")]
    Rejected(#[source] ApiError),
}

impl AuthError {
    /// 判断是否是网络错误（刷新请求没能到达后端）
    pub fn is_network_error(&self) -> bool {
        matches!(self, AuthError::Rejected(e) if e.is_network_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_keeps_source() {
        use std::error::Error;

        let err = AuthError::Rejected(ApiError::Status {
            status: 400,
            message: "invalid_grant".to_owned(),
        });
        assert!(err.to_string().contains("invalid_grant"));
        assert!(err.source().is_some());
        assert!(!err.is_network_error());
    }
}
