use crate::domain::model::{PlaybackSnapshot, PlayerControl, UserProfile};
use crate::error::ApiError;
use crate::spotify::SpotifyClient;

use tokio::sync::mpsc;

async fn emit_error(
    tx_evt: &mpsc::Sender<SpotifyEvent>,
    req_id: u64,
    ctx: &'static str,
    err: ApiError,
) {
    tracing::warn!(req_id, ctx, err = %err, "SpotifyActor 请求失败");
    let _ = tx_evt
        .send(SpotifyEvent::Error {
            req_id,
            ctx,
            kind: ErrorKind::of(&err),
            message: err.to_string(),
        })
        .await;
}

/// 失败原因的粗分类，reducer 据此决定是否继续轮询
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Status(u16),
    /// 会话已失效（已走注销流程）
    Auth,
    /// 200 但没有曲目信息
    NoItem,
    Other,
}

impl ErrorKind {
    fn of(err: &ApiError) -> Self {
        match err {
            ApiError::NotAuthenticated | ApiError::SessionExpired => ErrorKind::Auth,
            ApiError::MissingField(_) => ErrorKind::NoItem,
            ApiError::Status { status, .. } => ErrorKind::Status(*status),
            e if e.is_network_error() => ErrorKind::Network,
            _ => ErrorKind::Other,
        }
    }
}

#[derive(Debug)]
pub enum SpotifyCommand {
    CurrentlyPlaying { req_id: u64 },
    Profile { req_id: u64 },
    Control { req_id: u64, control: PlayerControl },
}

#[derive(Debug)]
pub enum SpotifyEvent {
    Playback {
        req_id: u64,
        snapshot: Option<PlaybackSnapshot>,
    },
    Profile {
        req_id: u64,
        profile: UserProfile,
    },
    ControlDone {
        req_id: u64,
        control: PlayerControl,
    },
    Error {
        req_id: u64,
        ctx: &'static str,
        kind: ErrorKind,
        message: String,
    },
}

/// 用户操作走高优先级通道，轮询走低优先级通道
pub fn spawn_spotify_actor(
    client: SpotifyClient,
) -> (
    mpsc::Sender<SpotifyCommand>,
    mpsc::Sender<SpotifyCommand>,
    mpsc::Receiver<SpotifyEvent>,
) {
    let (tx_hi, mut rx_hi) = mpsc::channel::<SpotifyCommand>(64);
    let (tx_lo, mut rx_lo) = mpsc::channel::<SpotifyCommand>(64);
    let (tx_evt, rx_evt) = mpsc::channel::<SpotifyEvent>(64);

    tokio::spawn(async move {
        loop {
            let cmd = tokio::select! {
                biased;
                Some(cmd) = rx_hi.recv() => cmd,
                Some(cmd) = rx_lo.recv() => cmd,
                else => break,
            };

            match cmd {
                SpotifyCommand::CurrentlyPlaying { req_id } => {
                    match client.currently_playing().await {
                        Ok(snapshot) => {
                            let _ = tx_evt
                                .send(SpotifyEvent::Playback { req_id, snapshot })
                                .await;
                        }
                        Err(e) => emit_error(&tx_evt, req_id, "CurrentlyPlaying", e).await,
                    }
                }
                SpotifyCommand::Profile { req_id } => match client.me().await {
                    Ok(profile) => {
                        let _ = tx_evt.send(SpotifyEvent::Profile { req_id, profile }).await;
                    }
                    Err(e) => emit_error(&tx_evt, req_id, "Profile", e).await,
                },
                SpotifyCommand::Control { req_id, control } => {
                    match client.control(control).await {
                        Ok(()) => {
                            let _ = tx_evt
                                .send(SpotifyEvent::ControlDone { req_id, control })
                                .await;
                        }
                        Err(e) => emit_error(&tx_evt, req_id, "Control", e).await,
                    }
                }
            }
        }
    });

    (tx_hi, tx_lo, rx_evt)
}
