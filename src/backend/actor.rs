use crate::backend::BackendClient;
use crate::domain::model::{LyricLine, TrackIdentity};
use crate::error::ApiError;

use tokio::sync::mpsc;

async fn emit_error(
    tx_evt: &mpsc::Sender<BackendEvent>,
    req_id: u64,
    ctx: &'static str,
    err: ApiError,
) {
    tracing::warn!(req_id, ctx, err = %err, "BackendActor 请求失败");
    let _ = tx_evt
        .send(BackendEvent::Error {
            req_id,
            status: err.status(),
            message: err.to_string(),
        })
        .await;
}

#[derive(Debug)]
pub enum BackendCommand {
    Lyrics {
        req_id: u64,
        track: TrackIdentity,
    },
    Translate {
        req_id: u64,
        lines: Vec<String>,
        source_lang: String,
        target_lang: String,
    },
}

#[derive(Debug)]
pub enum BackendEvent {
    Lyrics {
        req_id: u64,
        track: TrackIdentity,
        lyrics: Vec<LyricLine>,
    },
    Translation {
        req_id: u64,
        translations: Vec<String>,
    },
    Error {
        req_id: u64,
        /// HTTP 状态码；网络错误时为 `None`
        status: Option<u16>,
        message: String,
    },
}

/// 歌词 / 翻译请求走单独的 actor，避免阻塞播放状态轮询
pub fn spawn_backend_actor(
    client: BackendClient,
) -> (mpsc::Sender<BackendCommand>, mpsc::Receiver<BackendEvent>) {
    let (tx_cmd, mut rx_cmd) = mpsc::channel::<BackendCommand>(64);
    let (tx_evt, rx_evt) = mpsc::channel::<BackendEvent>(64);

    tokio::spawn(async move {
        while let Some(cmd) = rx_cmd.recv().await {
            match cmd {
                BackendCommand::Lyrics { req_id, track } => {
                    match client.lyrics(&track.name, &track.artist).await {
                        Ok(lyrics) => {
                            tracing::debug!(req_id, lines = lyrics.len(), "歌词已获取");
                            let _ = tx_evt
                                .send(BackendEvent::Lyrics {
                                    req_id,
                                    track,
                                    lyrics,
                                })
                                .await;
                        }
                        Err(e) => emit_error(&tx_evt, req_id, "Lyrics", e).await,
                    }
                }
                BackendCommand::Translate {
                    req_id,
                    lines,
                    source_lang,
                    target_lang,
                } => match client.translate(&lines, &source_lang, &target_lang).await {
                    Ok(translations) => {
                        let _ = tx_evt
                            .send(BackendEvent::Translation {
                                req_id,
                                translations,
                            })
                            .await;
                    }
                    Err(e) => emit_error(&tx_evt, req_id, "Translate", e).await,
                },
            }
        }
    });

    (tx_cmd, rx_evt)
}
