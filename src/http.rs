//! reqwest 客户端构造与错误响应解析（Spotify 与后端共用）

use crate::error::ApiError;
use crate::settings::AppSettings;
use serde_json::Value;

pub fn build_http_client(settings: &AppSettings) -> Result<reqwest::Client, ApiError> {
    reqwest::Client::builder()
        .user_agent("spotify-lyrics-ratui")
        .timeout(settings.http_timeout())
        .connect_timeout(settings.http_connect_timeout())
        .build()
        .map_err(ApiError::Reqwest)
}

/// 把非 2xx 响应转换为 `ApiError::Status`
///
/// 后端返回 `{"error": "..."}`，Spotify 返回 `{"error": {"status": .., "message": ".."}}`。
pub async fn status_error(resp: reqwest::Response) -> ApiError {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    ApiError::Status {
        status: status.as_u16(),
        message: error_message(&text)
            .or_else(|| status.canonical_reason().map(ToOwned::to_owned))
            .unwrap_or_else(|| "unknown error".to_owned()),
    }
}

fn error_message(body: &str) -> Option<String> {
    let v: Value = serde_json::from_str(body).ok()?;
    let err = v.get("error")?;
    match err {
        Value::String(s) => Some(s.clone()),
        Value::Object(_) => err
            .get("message")
            .and_then(|m| m.as_str())
            .map(ToOwned::to_owned),
        _ => None,
    }
}

pub(crate) fn encode_query(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_string() {
        assert_eq!(
            error_message(r#"{"error":"Lyrics not found"}"#).as_deref(),
            Some("Lyrics not found")
        );
    }

    #[test]
    fn spotify_error_object() {
        let body = r#"{"error":{"status":401,"message":"The access token expired"}}"#;
        assert_eq!(
            error_message(body).as_deref(),
            Some("The access token expired")
        );
    }

    #[test]
    fn non_json_body_has_no_message() {
        assert_eq!(error_message("<html>"), None);
    }

    #[test]
    fn query_is_percent_encoded() {
        assert_eq!(
            encode_query(&[("track", "夜に駆ける"), ("artist", "YOASOBI & co")]),
            "track=%E5%A4%9C%E3%81%AB%E9%A7%86%E3%81%91%E3%82%8B&artist=YOASOBI%20%26%20co"
        );
    }
}
