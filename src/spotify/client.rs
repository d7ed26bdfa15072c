use super::models::{convert, dto};
use super::request::ApiRequest;
use crate::auth::Session;
use crate::config::ClientConfig;
use crate::domain::model::{PlaybackSnapshot, PlayerControl, UserProfile};
use crate::error::ApiError;
use crate::http::{build_http_client, status_error};
use crate::settings::AppSettings;

use reqwest::StatusCode;
use std::sync::Arc;

/// Spotify Web API 客户端
///
/// 每次调用都从 `Session` 取 token；收到 401 时刷新一次并重发。
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: reqwest::Client,
    cfg: ClientConfig,
    session: Arc<Session>,
}

impl SpotifyClient {
    pub fn new(
        cfg: ClientConfig,
        settings: &AppSettings,
        session: Arc<Session>,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            http: build_http_client(settings)?,
            cfg,
            session,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// 带鉴权的请求
    ///
    /// `retry = true` 时，401 会触发一次刷新，然后以 `retry = false` 重发同一请求；
    /// 第二次 401 原样返回。网络错误直接返回，不重试。
    pub async fn fetch_with_auth(
        &self,
        req: &ApiRequest,
        retry: bool,
    ) -> Result<reqwest::Response, ApiError> {
        let token = self.session.bearer_token().await?;
        let resp = self.send(req, &token).await?;
        if resp.status() != StatusCode::UNAUTHORIZED || !retry {
            return Ok(resp);
        }

        tracing::info!(method = %req.method, path = %req.path, "收到 401，刷新 token 后重试");
        let token = self
            .session
            .recover_unauthorized(&token)
            .await
            .map_err(|_| ApiError::SessionExpired)?;
        self.send(req, &token).await
    }

    async fn send(&self, req: &ApiRequest, token: &str) -> Result<reqwest::Response, ApiError> {
        let mut url = self.cfg.api_endpoint(&req.path);
        if let Some(q) = req.query_string() {
            url.push('?');
            url.push_str(&q);
        }

        // 播放控制接口都不带请求体，Spotify 要求显式的 Content-Length
        let resp = self
            .http
            .request(req.method.clone(), url)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await?;
        tracing::debug!(method = %req.method, path = %req.path, status = resp.status().as_u16(), "Spotify 响应");
        Ok(resp)
    }

    async fn expect_ok(&self, req: ApiRequest) -> Result<(), ApiError> {
        let resp = self.fetch_with_auth(&req, true).await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        Ok(())
    }

    // ========== Player ==========

    /// `GET /me/player/currently-playing`；204 表示当前没有播放，返回 `None`
    pub async fn currently_playing(&self) -> Result<Option<PlaybackSnapshot>, ApiError> {
        let resp = self
            .fetch_with_auth(&ApiRequest::get("me/player/currently-playing"), true)
            .await?;
        if resp.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        let body: dto::CurrentlyPlayingResp = resp.json().await?;
        convert::to_snapshot(body).map(Some)
    }

    pub async fn play(&self) -> Result<(), ApiError> {
        self.expect_ok(ApiRequest::put("me/player/play")).await
    }

    pub async fn pause(&self) -> Result<(), ApiError> {
        self.expect_ok(ApiRequest::put("me/player/pause")).await
    }

    pub async fn next(&self) -> Result<(), ApiError> {
        self.expect_ok(ApiRequest::post("me/player/next")).await
    }

    pub async fn previous(&self) -> Result<(), ApiError> {
        self.expect_ok(ApiRequest::post("me/player/previous")).await
    }

    pub async fn seek(&self, position_ms: u64) -> Result<(), ApiError> {
        self.expect_ok(ApiRequest::put("me/player/seek").with_query("position_ms", position_ms))
            .await
    }

    pub async fn set_volume(&self, percent: u8) -> Result<(), ApiError> {
        self.expect_ok(
            ApiRequest::put("me/player/volume").with_query("volume_percent", percent.min(100)),
        )
        .await
    }

    pub async fn control(&self, control: PlayerControl) -> Result<(), ApiError> {
        match control {
            PlayerControl::Play => self.play().await,
            PlayerControl::Pause => self.pause().await,
            PlayerControl::Next => self.next().await,
            PlayerControl::Previous => self.previous().await,
            PlayerControl::Seek { position_ms } => self.seek(position_ms).await,
            PlayerControl::Volume { percent } => self.set_volume(percent).await,
        }
    }

    // ========== Profile ==========

    /// `GET /me`
    pub async fn me(&self) -> Result<UserProfile, ApiError> {
        let resp = self.fetch_with_auth(&ApiRequest::get("me"), true).await?;
        if !resp.status().is_success() {
            return Err(status_error(resp).await);
        }
        let body: dto::UserProfileResp = resp.json().await?;
        Ok(convert::to_profile(body))
    }
}
