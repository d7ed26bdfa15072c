use super::dto;
use crate::auth::token::TokenResponse;
use crate::config::ClientConfig;
use crate::domain::model::LyricLine;
use crate::error::ApiError;
use crate::http::{build_http_client, encode_query, status_error};
use crate::settings::AppSettings;

/// 后端中转服务客户端
///
/// 后端持有 Spotify client secret，负责换取/刷新 token，并代理歌词与翻译服务。
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    cfg: ClientConfig,
}

impl BackendClient {
    pub fn new(cfg: ClientConfig, settings: &AppSettings) -> Result<Self, ApiError> {
        Ok(Self {
            http: build_http_client(settings)?,
            cfg,
        })
    }

    // ========== Auth Methods ==========

    /// `POST /api/token {code}`：授权码换 token
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, ApiError> {
        if code.trim().is_empty() {
            return Err(ApiError::BadInput("授权码为空"));
        }
        let resp = self
            .http
            .post(self.cfg.backend_endpoint("/api/token"))
            .json(&dto::CodeReq { code })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        Ok(resp.json().await?)
    }

    /// `POST /api/refresh {refresh_token}`：只发一次，不重试
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, ApiError> {
        let resp = self
            .http
            .post(self.cfg.backend_endpoint("/api/refresh"))
            .json(&dto::RefreshTokenReq { refresh_token })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        Ok(resp.json().await?)
    }

    /// `POST /api/logout {refresh_token}`：通知后端作废会话
    pub async fn logout(&self, refresh_token: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.cfg.backend_endpoint("/api/logout"))
            .json(&dto::RefreshTokenReq { refresh_token })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        Ok(())
    }

    // ========== Lyrics / Translation ==========

    /// `GET /api/lyrics?track=&artist=`，返回按时间排序的歌词行（译文为空）
    pub async fn lyrics(&self, track: &str, artist: &str) -> Result<Vec<LyricLine>, ApiError> {
        let url = format!(
            "{}?{}",
            self.cfg.backend_endpoint("/api/lyrics"),
            encode_query(&[("track", track), ("artist", artist)])
        );
        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        let body: dto::LyricsResp = resp.json().await?;
        Ok(body
            .lyrics
            .into_iter()
            .map(|l| LyricLine {
                original_text: l.original,
                translated_text: String::new(),
                start_time_ms: l.start_time_ms,
                end_time_ms: l.end_time_ms,
            })
            .collect())
    }

    /// `POST /api/translate`，返回与输入逐行对齐的译文
    pub async fn translate(
        &self,
        text: &[String],
        source_lang: &str,
        target_lang: &str,
    ) -> Result<Vec<String>, ApiError> {
        if text.is_empty() {
            return Ok(Vec::new());
        }
        let resp = self
            .http
            .post(self.cfg.backend_endpoint("/api/translate"))
            .json(&dto::TranslateReq {
                text,
                source_lang,
                target_lang,
            })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        let body: dto::TranslateResp = resp.json().await?;
        Ok(body.translated_text)
    }
}
