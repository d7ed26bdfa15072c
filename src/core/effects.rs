use crate::app::App;
use crate::auth::Session;
use crate::backend::BackendCommand;
use crate::messages::app::AppEvent;
use crate::spotify::SpotifyCommand;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Default)]
pub struct CoreEffects {
    pub(super) actions: Vec<CoreEffect>,
}

#[derive(Debug)]
pub enum CoreEffect {
    EmitState(Box<App>),
    EmitError(String),
    EmitLoggedOut,
    SendSpotifyHi {
        cmd: SpotifyCommand,
        warn: Option<&'static str>,
    },
    SendSpotifyLo {
        cmd: SpotifyCommand,
        warn: Option<&'static str>,
    },
    SendBackend {
        cmd: BackendCommand,
        warn: Option<&'static str>,
    },
    /// 延迟后重新拉取播放状态
    ScheduleRefresh(Duration),
    Logout,
}

impl CoreEffects {
    pub fn emit_state(&mut self, app: &App) {
        self.actions
            .push(CoreEffect::EmitState(Box::new(app.clone())));
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.actions.push(CoreEffect::EmitError(message.into()));
    }

    pub fn logged_out(&mut self) {
        self.actions.push(CoreEffect::EmitLoggedOut);
    }

    pub fn send_spotify_hi_warn(&mut self, cmd: SpotifyCommand, warn: &'static str) {
        self.actions.push(CoreEffect::SendSpotifyHi {
            cmd,
            warn: Some(warn),
        });
    }

    pub fn send_spotify_lo(&mut self, cmd: SpotifyCommand) {
        self.actions
            .push(CoreEffect::SendSpotifyLo { cmd, warn: None });
    }

    pub fn send_backend_warn(&mut self, cmd: BackendCommand, warn: &'static str) {
        self.actions.push(CoreEffect::SendBackend {
            cmd,
            warn: Some(warn),
        });
    }

    pub fn schedule_refresh(&mut self, delay: Duration) {
        self.actions.push(CoreEffect::ScheduleRefresh(delay));
    }

    pub fn logout(&mut self) {
        self.actions.push(CoreEffect::Logout);
    }
}

pub struct CoreDispatch<'a> {
    pub(super) tx_spotify_hi: &'a mpsc::Sender<SpotifyCommand>,
    pub(super) tx_spotify_lo: &'a mpsc::Sender<SpotifyCommand>,
    pub(super) tx_backend: &'a mpsc::Sender<BackendCommand>,
    pub(super) tx_evt: &'a mpsc::Sender<AppEvent>,
    pub(super) tx_delayed: &'a mpsc::Sender<()>,
    pub(super) session: &'a Arc<Session>,
}

pub async fn run_effects(effects: CoreEffects, dispatch: &CoreDispatch<'_>) {
    for effect in effects.actions {
        match effect {
            CoreEffect::EmitState(app) => {
                let _ = dispatch.tx_evt.send(AppEvent::State(app)).await;
            }
            CoreEffect::EmitError(msg) => {
                let _ = dispatch.tx_evt.send(AppEvent::Error(msg)).await;
            }
            CoreEffect::EmitLoggedOut => {
                let _ = dispatch.tx_evt.send(AppEvent::LoggedOut).await;
            }
            CoreEffect::SendSpotifyHi { cmd, warn } => {
                if let Err(e) = dispatch.tx_spotify_hi.send(cmd).await
                    && let Some(ctx) = warn
                {
                    tracing::warn!(err = %e, "{ctx}");
                }
            }
            CoreEffect::SendSpotifyLo { cmd, warn } => {
                if let Err(e) = dispatch.tx_spotify_lo.send(cmd).await
                    && let Some(ctx) = warn
                {
                    tracing::warn!(err = %e, "{ctx}");
                }
            }
            CoreEffect::SendBackend { cmd, warn } => {
                if let Err(e) = dispatch.tx_backend.send(cmd).await
                    && let Some(ctx) = warn
                {
                    tracing::warn!(err = %e, "{ctx}");
                }
            }
            CoreEffect::ScheduleRefresh(delay) => {
                let tx = dispatch.tx_delayed.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(()).await;
                });
            }
            CoreEffect::Logout => {
                // 注销完成后由 session 的 watch 通知驱动 LoggedOut
                dispatch.session.logout().await;
            }
        }
    }
}
