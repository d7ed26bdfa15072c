use crate::config::ClientConfig;
use crate::error::AppError;
use rand::Rng;
use rand::distributions::Alphanumeric;

pub const SCOPES: &str =
    "user-read-private user-read-email user-read-playback-state user-modify-playback-state streaming";

/// 随机 `state` 参数，用于回调时校验
pub fn generate_state() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

/// Spotify 授权页地址（authorization code flow）
pub fn authorize_url(cfg: &ClientConfig, state: &str) -> Result<String, AppError> {
    let client_id = cfg
        .client_id
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| AppError::Config("缺少 Spotify client_id".to_owned()))?;

    Ok(format!(
        "{}/authorize?client_id={}&response_type=code&redirect_uri={}&scope={}&state={}",
        cfg.accounts_url.trim_end_matches('/'),
        urlencoding::encode(client_id),
        urlencoding::encode(&cfg.redirect_uri),
        urlencoding::encode(SCOPES),
        urlencoding::encode(state),
    ))
}
