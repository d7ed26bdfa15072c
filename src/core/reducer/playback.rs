use super::{CoreState, lyrics};
use crate::core::effects::CoreEffects;
use crate::core::infra::RequestKey;
use crate::domain::model::{PlaybackSnapshot, PlayerControl};
use crate::messages::app::AppCommand;
use crate::spotify::{ErrorKind, SpotifyCommand, SpotifyEvent};

use std::time::Duration;

/// 播放 / 暂停后等待多久再确认真实状态
const TOGGLE_REFRESH_DELAY: Duration = Duration::from_secs(1);

/// 立即拉取一次播放状态（用户操作触发，走高优先级通道）
pub(super) fn request_playback(state: &mut CoreState, effects: &mut CoreEffects) {
    if !state.app.logged_in {
        return;
    }
    let req_id = state.request_tracker.issue(RequestKey::Playback);
    effects.send_spotify_hi_warn(
        SpotifyCommand::CurrentlyPlaying { req_id },
        "SpotifyActor 已退出，无法获取播放状态",
    );
}

/// 轮询：上一次请求还没回来时跳过本次
pub(super) fn handle_poll_tick(state: &mut CoreState, effects: &mut CoreEffects) {
    if !state.app.wants_polling() || state.request_tracker.is_pending(&RequestKey::Playback) {
        return;
    }
    let req_id = state.request_tracker.issue(RequestKey::Playback);
    effects.send_spotify_lo(SpotifyCommand::CurrentlyPlaying { req_id });
}

fn send_control(state: &mut CoreState, effects: &mut CoreEffects, control: PlayerControl) {
    let req_id = state.request_tracker.next_id();
    state.pending_controls.insert(req_id, control);
    tracing::debug!(req_id, ?control, "发送播放控制");
    effects.send_spotify_hi_warn(
        SpotifyCommand::Control { req_id, control },
        "SpotifyActor 已退出，无法发送播放控制",
    );
}

pub(super) fn handle_ui(cmd: &AppCommand, state: &mut CoreState, effects: &mut CoreEffects) -> bool {
    match cmd {
        AppCommand::TogglePlay => {
            let control = if state.app.is_playing {
                PlayerControl::Pause
            } else {
                PlayerControl::Play
            };
            send_control(state, effects, control);
        }
        AppCommand::Next => send_control(state, effects, PlayerControl::Next),
        AppCommand::Previous => send_control(state, effects, PlayerControl::Previous),
        AppCommand::SeekPercent { percent } => {
            let Some(track) = &state.app.current_track else {
                return true;
            };
            if !percent.is_finite() {
                tracing::warn!(percent, "忽略无效的跳转进度");
                return true;
            }
            let percent = percent.clamp(0.0, 100.0);
            let position_ms = (percent / 100.0 * track.duration_ms as f64).round() as u64;
            state.app.progress_pct = percent;
            state.app.update_current_line();
            send_control(state, effects, PlayerControl::Seek { position_ms });
            effects.emit_state(&state.app);
        }
        AppCommand::SetVolume { percent } => {
            let percent = (*percent).min(100);
            state.app.volume = percent;
            state.app.muted = false;
            send_control(state, effects, PlayerControl::Volume { percent });
            effects.emit_state(&state.app);
        }
        AppCommand::ToggleMute => {
            let percent = if state.app.muted {
                state.app.muted = false;
                state.app.volume = state.app.prev_volume;
                state.app.prev_volume
            } else {
                state.app.muted = true;
                state.app.prev_volume = state.app.volume;
                state.app.volume = 0;
                0
            };
            send_control(state, effects, PlayerControl::Volume { percent });
            effects.emit_state(&state.app);
        }
        _ => return false,
    }
    true
}

pub(super) fn handle_spotify_event(
    evt: SpotifyEvent,
    state: &mut CoreState,
    effects: &mut CoreEffects,
) {
    match evt {
        SpotifyEvent::Playback { req_id, snapshot } => {
            // 按到达顺序应用；accept 只用于清除 pending
            state.request_tracker.accept(&RequestKey::Playback, req_id);
            if !state.app.logged_in {
                return;
            }
            apply_playback(state, effects, snapshot);
            effects.emit_state(&state.app);
        }
        SpotifyEvent::ControlDone { req_id, control } => {
            state.pending_controls.remove(&req_id);
            match control {
                PlayerControl::Play | PlayerControl::Pause => {
                    state.app.is_playing = control == PlayerControl::Play;
                    effects.schedule_refresh(TOGGLE_REFRESH_DELAY);
                    effects.emit_state(&state.app);
                }
                PlayerControl::Next | PlayerControl::Previous => request_playback(state, effects),
                PlayerControl::Seek { .. } | PlayerControl::Volume { .. } => {}
            }
        }
        SpotifyEvent::Error {
            req_id,
            ctx: "CurrentlyPlaying",
            kind,
            message,
        } => {
            state.request_tracker.accept(&RequestKey::Playback, req_id);
            state.app.loading = false;
            if kind == ErrorKind::Auth {
                return;
            }
            state.playback_failed = true;
            match kind {
                ErrorKind::Auth => {}
                ErrorKind::Network => {
                    tracing::debug!(err = %message, "轮询失败，下次继续");
                    set_error(state, effects, "获取播放进度失败");
                }
                ErrorKind::NoItem => {
                    state.app.is_playing = false;
                    set_error(state, effects, "没有可用的曲目信息");
                }
                ErrorKind::Status(_) | ErrorKind::Other => {
                    state.app.is_playing = false;
                    set_error(state, effects, "获取当前曲目失败");
                }
            }
            effects.emit_state(&state.app);
        }
        SpotifyEvent::Error {
            req_id,
            kind,
            ..
        } => {
            let Some(control) = state.pending_controls.remove(&req_id) else {
                return;
            };
            if kind == ErrorKind::Auth {
                return;
            }
            set_error(state, effects, control_error_message(control));
            effects.emit_state(&state.app);
        }
        SpotifyEvent::Profile { .. } => {}
    }
}

fn apply_playback(
    state: &mut CoreState,
    effects: &mut CoreEffects,
    snapshot: Option<PlaybackSnapshot>,
) {
    state.app.loading = false;
    let Some(snapshot) = snapshot else {
        tracing::info!("当前没有正在播放的曲目");
        state.playback_failed = false;
        state.app.error = None;
        state.app.clear_track();
        state.app.notice = Some("当前没有正在播放的曲目".to_owned());
        state.request_tracker.clear(&RequestKey::Lyrics);
        state.request_tracker.clear(&RequestKey::Translation);
        return;
    };

    if state.playback_failed {
        state.playback_failed = false;
        state.app.error = None;
    }
    if state.app.apply_playback(snapshot) {
        if let Some(track) = &state.app.current_track {
            tracing::info!(track = %track.track_name, artist = %track.artist_name, "切换曲目");
        }
        lyrics::request_lyrics(state, effects);
    }
}

fn set_error(state: &mut CoreState, effects: &mut CoreEffects, msg: &str) {
    state.app.error = Some(msg.to_owned());
    effects.error(msg);
}

fn control_error_message(control: PlayerControl) -> &'static str {
    match control {
        PlayerControl::Play | PlayerControl::Pause => "播放 / 暂停失败",
        PlayerControl::Next => "切换到下一首失败",
        PlayerControl::Previous => "切换到上一首失败",
        PlayerControl::Seek { .. } => "跳转进度失败",
        PlayerControl::Volume { .. } => "调整音量失败",
    }
}
