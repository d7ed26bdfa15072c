//! Token 刷新协议：用 refresh token 经后端换取新的 access token。
//!
//! 刷新请求本身不重试；任何失败都交给调用方走注销流程。

use super::token::TokenResponse;
use crate::backend::BackendClient;
use crate::error::AuthError;

/// 发起一次刷新请求并校验响应
pub async fn refresh_tokens(
    backend: &BackendClient,
    refresh_token: &str,
) -> Result<TokenResponse, AuthError> {
    if refresh_token.is_empty() {
        return Err(AuthError::NoRefreshToken);
    }

    let resp = backend
        .refresh(refresh_token)
        .await
        .map_err(AuthError::Rejected)?;
    validate(resp)
}

/// 后端可能返回 200 但没有 access_token（上游报错被吞掉的情况）
pub(crate) fn validate(resp: TokenResponse) -> Result<TokenResponse, AuthError> {
    if resp.access_token.trim().is_empty() {
        return Err(AuthError::MissingAccessToken);
    }
    Ok(resp)
}
