//! Token 存储
//!
//! 进程内唯一的 token 持有者：内存中的 `TokenState` + 持久化的三个 key。
//! 所有刷新都在同一把异步锁内完成，同一时刻最多只有一个刷新请求在路上。

use super::clock::Clock;
use super::refresh;
use super::storage::TokenStorage;
use super::token::{
    ACCESS_TOKEN_KEY, ALL_KEYS, EXPIRES_AT_KEY, REFRESH_TOKEN_KEY, TokenResponse, TokenState,
    expires_at_from,
};
use crate::backend::BackendClient;
use crate::error::AuthError;

use std::sync::Arc;
use tokio::sync::{Mutex, watch};

#[derive(Debug)]
pub struct TokenStore {
    state: Mutex<TokenState>,
    storage: Arc<dyn TokenStorage>,
    clock: Arc<dyn Clock>,
    backend: BackendClient,
    /// 当前 access token 的过期时刻；`None` 表示没有 token
    expiry_tx: watch::Sender<Option<u64>>,
}

impl TokenStore {
    pub fn new(
        backend: BackendClient,
        storage: Arc<dyn TokenStorage>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (expiry_tx, _) = watch::channel(None);
        Self {
            state: Mutex::new(TokenState::default()),
            storage,
            clock,
            backend,
            expiry_tx,
        }
    }

    /// 从持久化存储恢复 token，返回是否恢复出 access token
    pub async fn restore(&self) -> bool {
        let mut state = self.state.lock().await;
        let access_token = self.storage.get(ACCESS_TOKEN_KEY).filter(|t| !t.is_empty());
        let refresh_token = self.storage.get(REFRESH_TOKEN_KEY).filter(|t| !t.is_empty());
        let expires_at = self
            .storage
            .get(EXPIRES_AT_KEY)
            .and_then(|v| v.trim().parse::<u64>().ok());

        *state = TokenState {
            expires_at: access_token.as_ref().and(expires_at),
            access_token: access_token.filter(|_| expires_at.is_some()),
            refresh_token,
        };
        tracing::debug!(
            has_access = state.access_token.is_some(),
            has_refresh = state.refresh_token.is_some(),
            expires_at = ?state.expires_at,
            "从本地存储恢复 token"
        );
        self.expiry_tx.send_replace(state.expires_at);
        state.access_token.is_some()
    }

    /// 接受一次 token 响应：写内存、写持久化、计算过期时刻
    pub async fn set_tokens(&self, resp: &TokenResponse) {
        let mut state = self.state.lock().await;
        self.apply(&mut state, resp);
    }

    /// 获取 access token
    ///
    /// 从未设置过（或已清除）时返回 `Ok(None)`，不会发起网络请求。
    /// 已过期时先同步完成刷新再返回；刷新失败返回 `Err`。
    pub async fn access_token(&self) -> Result<Option<String>, AuthError> {
        let mut state = self.state.lock().await;
        let Some(token) = state.access_token.clone() else {
            return Ok(None);
        };
        if !state.is_expired(self.clock.now_ms()) {
            return Ok(Some(token));
        }
        tracing::info!(expires_at = ?state.expires_at, "access token 已过期，刷新中");
        self.refresh_locked(&mut state).await.map(Some)
    }

    /// 无条件刷新
    pub async fn refresh(&self) -> Result<String, AuthError> {
        let mut state = self.state.lock().await;
        self.refresh_locked(&mut state).await
    }

    /// 请求收到 401 后的刷新
    ///
    /// 如果在等锁期间别的请求已经换了新 token，直接返回新 token，不再刷新。
    pub async fn refresh_rejected(&self, rejected: &str) -> Result<String, AuthError> {
        let mut state = self.state.lock().await;
        if let Some(current) = state.access_token.as_deref()
            && current != rejected
            && !state.is_expired(self.clock.now_ms())
        {
            tracing::debug!("401 对应的 token 已被替换，跳过刷新");
            return Ok(current.to_owned());
        }
        self.refresh_locked(&mut state).await
    }

    pub async fn refresh_token(&self) -> Option<String> {
        let state = self.state.lock().await;
        state
            .refresh_token
            .clone()
            .or_else(|| self.storage.get(REFRESH_TOKEN_KEY))
    }

    /// 清空内存与持久化中的全部 token
    pub async fn clear_tokens(&self) {
        let mut state = self.state.lock().await;
        *state = TokenState::default();
        for key in ALL_KEYS {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(key, err = %e, "删除本地 token 失败");
            }
        }
        self.expiry_tx.send_replace(None);
    }

    pub fn has_access_token(&self) -> bool {
        self.expiry_tx.borrow().is_some()
    }

    pub fn expires_at(&self) -> Option<u64> {
        *self.expiry_tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<u64>> {
        self.expiry_tx.subscribe()
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    async fn refresh_locked(&self, state: &mut TokenState) -> Result<String, AuthError> {
        let refresh_token = state
            .refresh_token
            .clone()
            .or_else(|| self.storage.get(REFRESH_TOKEN_KEY))
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::NoRefreshToken)?;

        let resp = refresh::refresh_tokens(&self.backend, &refresh_token).await?;
        self.apply(state, &resp);
        tracing::info!(expires_in = resp.expires_in, "access token 已刷新");
        Ok(resp.access_token)
    }

    fn apply(&self, state: &mut TokenState, resp: &TokenResponse) {
        let expires_at = expires_at_from(self.clock.now_ms(), resp.expires_in);
        state.access_token = Some(resp.access_token.clone());
        if let Some(rt) = resp.refresh_token.as_ref().filter(|t| !t.is_empty()) {
            state.refresh_token = Some(rt.clone());
        }
        state.expires_at = Some(expires_at);
        self.persist(state);
        self.expiry_tx.send_replace(Some(expires_at));
    }

    fn persist(&self, state: &TokenState) {
        let mut writes = Vec::with_capacity(3);
        if let Some(v) = &state.access_token {
            writes.push((ACCESS_TOKEN_KEY, v.clone()));
        }
        if let Some(v) = &state.refresh_token {
            writes.push((REFRESH_TOKEN_KEY, v.clone()));
        }
        if let Some(v) = state.expires_at {
            writes.push((EXPIRES_AT_KEY, v.to_string()));
        }
        for (key, value) in writes {
            if let Err(e) = self.storage.set(key, &value) {
                tracing::warn!(key, err = %e, "保存 token 失败");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::clock::ManualClock;
    use crate::auth::storage::MemoryTokenStorage;
    use crate::config::ClientConfig;
    use crate::settings::AppSettings;
    use std::time::Duration;

    // 指向一个不会被访问的地址：这些用例都不应触发网络请求
    fn offline_store(clock: Arc<ManualClock>) -> (TokenStore, Arc<MemoryTokenStorage>) {
        let cfg = ClientConfig {
            backend_url: "http://127.0.0.1:9".to_owned(),
            ..ClientConfig::default()
        };
        let backend = BackendClient::new(cfg, &AppSettings::default()).expect("backend");
        let storage = Arc::new(MemoryTokenStorage::new());
        (TokenStore::new(backend, storage.clone(), clock), storage)
    }

    #[tokio::test]
    async fn unset_store_returns_none() {
        let (store, _) = offline_store(Arc::new(ManualClock::new(0)));
        assert_eq!(store.access_token().await.expect("no refresh"), None);
        assert!(!store.has_access_token());
    }

    #[tokio::test]
    async fn fresh_token_is_returned_until_expiry() {
        let clock = Arc::new(ManualClock::new(1_000));
        let (store, storage) = offline_store(clock.clone());
        store
            .set_tokens(&TokenResponse {
                access_token: "A".to_owned(),
                refresh_token: Some("R".to_owned()),
                expires_in: 3600,
            })
            .await;

        clock.advance(Duration::from_secs(3599));
        assert_eq!(store.access_token().await.expect("valid").as_deref(), Some("A"));
        assert_eq!(storage.get(REFRESH_TOKEN_KEY).as_deref(), Some("R"));
        assert_eq!(storage.get(EXPIRES_AT_KEY).as_deref(), Some("3601000"));
        assert_eq!(store.expires_at(), Some(3_601_000));
    }

    #[tokio::test]
    async fn refresh_without_refresh_token_fails() {
        let clock = Arc::new(ManualClock::new(0));
        let (store, _) = offline_store(clock.clone());
        store
            .set_tokens(&TokenResponse {
                access_token: "A".to_owned(),
                refresh_token: None,
                expires_in: 1,
            })
            .await;
        clock.advance(Duration::from_secs(1));
        assert!(matches!(
            store.access_token().await,
            Err(AuthError::NoRefreshToken)
        ));
    }

    #[tokio::test]
    async fn clear_wipes_all_durable_keys() {
        let (store, storage) = offline_store(Arc::new(ManualClock::new(0)));
        store
            .set_tokens(&TokenResponse {
                access_token: "A".to_owned(),
                refresh_token: Some("R".to_owned()),
                expires_in: 3600,
            })
            .await;
        store.clear_tokens().await;

        for key in ALL_KEYS {
            assert_eq!(storage.get(key), None, "{key} should be removed");
        }
        assert_eq!(store.access_token().await.expect("no refresh"), None);
        assert!(!store.has_access_token());
    }

    #[tokio::test]
    async fn restore_reads_persisted_tokens() {
        let (store, storage) = offline_store(Arc::new(ManualClock::new(0)));
        storage.set(ACCESS_TOKEN_KEY, "A").expect("set");
        storage.set(REFRESH_TOKEN_KEY, "R").expect("set");
        storage.set(EXPIRES_AT_KEY, "5000").expect("set");

        assert!(store.restore().await);
        assert_eq!(store.expires_at(), Some(5000));
        assert_eq!(store.refresh_token().await.as_deref(), Some("R"));
    }

    #[tokio::test]
    async fn restore_without_expiry_keeps_only_refresh_token() {
        let (store, storage) = offline_store(Arc::new(ManualClock::new(0)));
        storage.set(ACCESS_TOKEN_KEY, "A").expect("set");
        storage.set(REFRESH_TOKEN_KEY, "R").expect("set");

        assert!(!store.restore().await);
        assert!(!store.has_access_token());
        assert_eq!(store.refresh_token().await.as_deref(), Some("R"));
    }

    #[tokio::test]
    async fn rejected_token_already_replaced_skips_refresh() {
        let (store, _) = offline_store(Arc::new(ManualClock::new(0)));
        store
            .set_tokens(&TokenResponse {
                access_token: "B".to_owned(),
                refresh_token: Some("R".to_owned()),
                expires_in: 3600,
            })
            .await;
        let token = store.refresh_rejected("A").await.expect("no network needed");
        assert_eq!(token, "B");
    }
}
