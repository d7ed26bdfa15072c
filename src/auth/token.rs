use serde::{Deserialize, Serialize};

/// 持久化存储中的固定 key
pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const EXPIRES_AT_KEY: &str = "expires_at";

pub const ALL_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, EXPIRES_AT_KEY];

/// `/api/token` 与 `/api/refresh` 的响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// 有效期（秒）
    #[serde(default)]
    pub expires_in: u64,
}

/// 内存中的 token 状态，只由 `TokenStore` 持有
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenState {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// 过期时刻（unix epoch 毫秒）
    pub expires_at: Option<u64>,
}

impl TokenState {
    pub fn is_expired(&self, now_ms: u64) -> bool {
        match self.expires_at {
            Some(at) => now_ms >= at,
            None => true,
        }
    }
}

pub fn expires_at_from(now_ms: u64, expires_in_secs: u64) -> u64 {
    now_ms.saturating_add(expires_in_secs.saturating_mul(1000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_response_without_refresh_token() {
        let resp: TokenResponse =
            serde_json::from_str(r#"{"access_token":"B","expires_in":3600,"token_type":"Bearer"}"#)
                .expect("parse");
        assert_eq!(resp.access_token, "B");
        assert_eq!(resp.refresh_token, None);
        assert_eq!(resp.expires_in, 3600);
    }

    #[test]
    fn expiry_is_seconds_times_thousand() {
        assert_eq!(expires_at_from(1_000, 3600), 3_601_000);
    }

    #[test]
    fn expired_exactly_at_deadline() {
        let state = TokenState {
            access_token: Some("A".to_owned()),
            refresh_token: None,
            expires_at: Some(10_000),
        };
        assert!(!state.is_expired(9_999));
        assert!(state.is_expired(10_000));
    }
}
