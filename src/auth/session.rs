//! 会话：登录 / 注销 / 是否已登录，以及主动刷新定时器。
//!
//! 所有需要鉴权的组件都持有同一个 `Arc<Session>`，不存在全局 token 状态。
//! `logout` 是唯一的拆除路径，无法恢复的 401 也走这里。

use super::clock::Clock;
use super::refresh;
use super::storage::TokenStorage;
use super::store::TokenStore;
use crate::backend::BackendClient;
use crate::error::{ApiError, AuthError};

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const MIN_REFRESH_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug)]
pub struct Session {
    store: TokenStore,
    backend: BackendClient,
}

impl Session {
    pub fn new(
        backend: BackendClient,
        storage: Arc<dyn TokenStorage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store: TokenStore::new(backend.clone(), storage, clock),
            backend,
        }
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// 启动时恢复登录状态
    ///
    /// 只剩 refresh token 时静默刷新一次；刷新失败则注销。
    pub async fn restore(&self) -> bool {
        if self.store.restore().await {
            tracing::info!("已从本地存储恢复登录状态");
            return true;
        }
        if self.store.refresh_token().await.is_none() {
            return false;
        }
        match self.store.refresh().await {
            Ok(_) => {
                tracing::info!("已用 refresh token 恢复登录状态");
                true
            }
            Err(e) => {
                tracing::warn!(err = %e, "恢复登录失败");
                self.logout().await;
                false
            }
        }
    }

    /// 授权回调拿到的 code 换取 token
    pub async fn login(&self, code: &str) -> Result<(), AuthError> {
        let resp = self
            .backend
            .exchange_code(code)
            .await
            .map_err(AuthError::Rejected)?;
        let resp = refresh::validate(resp)?;
        self.store.set_tokens(&resp).await;
        tracing::info!(expires_in = resp.expires_in, "登录成功");
        Ok(())
    }

    pub fn is_logged_in(&self) -> bool {
        self.store.has_access_token()
    }

    /// 当前可用的 access token；刷新失败时注销并返回 `None`
    pub async fn access_token(&self) -> Option<String> {
        match self.store.access_token().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(err = %e, "刷新 access token 失败，注销会话");
                self.logout().await;
                None
            }
        }
    }

    /// access token 剩余有效期；已过期时先刷新，未登录或刷新失败返回 `None`
    pub async fn remaining_validity(&self) -> Option<Duration> {
        self.access_token().await?;
        let expires_at = self.store.expires_at()?;
        Some(Duration::from_millis(
            expires_at.saturating_sub(self.store.now_ms()),
        ))
    }

    pub async fn refresh_access_token(&self) -> Result<String, AuthError> {
        match self.store.refresh().await {
            Ok(token) => Ok(token),
            Err(e) => {
                tracing::warn!(
                    err = %e,
                    network = e.is_network_error(),
                    "刷新 access token 失败，注销会话"
                );
                self.logout().await;
                Err(e)
            }
        }
    }

    /// 发请求前取 token：没有 token 不发请求，刷新失败则注销
    pub(crate) async fn bearer_token(&self) -> Result<String, ApiError> {
        match self.store.access_token().await {
            Ok(Some(token)) => Ok(token),
            Ok(None) => Err(ApiError::NotAuthenticated),
            Err(e) => {
                tracing::warn!(err = %e, "刷新 access token 失败，注销会话");
                self.logout().await;
                Err(ApiError::SessionExpired)
            }
        }
    }

    /// 请求被 401 拒绝后的恢复
    pub(crate) async fn recover_unauthorized(&self, rejected: &str) -> Result<String, AuthError> {
        match self.store.refresh_rejected(rejected).await {
            Ok(token) => Ok(token),
            Err(e) => {
                tracing::warn!(err = %e, "401 后刷新失败，注销会话");
                self.logout().await;
                Err(e)
            }
        }
    }

    /// 注销：通知后端（尽力而为），清空本地全部 token，并通过 watch 通知订阅方
    pub async fn logout(&self) {
        if let Some(refresh_token) = self.store.refresh_token().await
            && let Err(e) = self.backend.logout(&refresh_token).await
        {
            tracing::warn!(err = %e, "后端注销失败，继续清理本地会话");
        }
        self.store.clear_tokens().await;
        tracing::info!("会话已注销");
    }

    /// 订阅登录状态：`Some(expires_at)` 为已登录，`None` 为未登录
    pub fn subscribe(&self) -> watch::Receiver<Option<u64>> {
        self.store.subscribe()
    }

    /// 启动主动刷新：在过期前 `leeway` 刷新 access token
    pub fn spawn_refresh_timer(self: &Arc<Self>, leeway: Duration) -> RefreshTimer {
        let session = Arc::clone(self);
        let mut rx = self.subscribe();

        let task = tokio::spawn(async move {
            loop {
                let expires_at = *rx.borrow_and_update();
                let Some(expires_at) = expires_at else {
                    if rx.changed().await.is_err() {
                        break;
                    }
                    continue;
                };

                let delay = refresh_delay(expires_at, session.store.now_ms(), leeway);
                tracing::debug!(delay_ms = delay.as_millis() as u64, "已安排主动刷新");
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {
                        if session.refresh_access_token().await.is_ok() {
                            tracing::debug!("主动刷新完成");
                        }
                    }
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        RefreshTimer { task }
    }
}

/// 主动刷新定时器；drop 时取消
#[derive(Debug)]
pub struct RefreshTimer {
    task: JoinHandle<()>,
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// 剩余时间大于 leeway 时在过期前 leeway 刷新，否则在剩余时间过半时刷新
fn refresh_delay(expires_at: u64, now_ms: u64, leeway: Duration) -> Duration {
    let remaining = expires_at.saturating_sub(now_ms);
    let leeway_ms = u64::try_from(leeway.as_millis()).unwrap_or(u64::MAX);
    let delay_ms = if remaining > leeway_ms {
        remaining - leeway_ms
    } else {
        remaining / 2
    };
    Duration::from_millis(delay_ms).max(MIN_REFRESH_DELAY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_one_minute_before_expiry() {
        let d = refresh_delay(3_600_000, 0, Duration::from_secs(60));
        assert_eq!(d, Duration::from_millis(3_540_000));
    }

    #[test]
    fn short_lived_token_refreshes_at_half_life() {
        let d = refresh_delay(30_000, 0, Duration::from_secs(60));
        assert_eq!(d, Duration::from_millis(15_000));
    }

    #[test]
    fn expired_token_waits_minimum_delay() {
        let d = refresh_delay(1_000, 5_000, Duration::from_secs(60));
        assert_eq!(d, MIN_REFRESH_DELAY);
    }
}
