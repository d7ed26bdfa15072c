use super::CoreState;
use crate::backend::{BackendCommand, BackendEvent};
use crate::core::effects::CoreEffects;
use crate::core::infra::RequestKey;
use crate::lyrics;
use crate::messages::app::AppCommand;
use crate::settings;

/// 切歌后拉取歌词；旧曲目的歌词与译文请求作废
pub(super) fn request_lyrics(state: &mut CoreState, effects: &mut CoreEffects) {
    let Some(track) = state.app.current_track.as_ref().map(|t| t.identity()) else {
        return;
    };
    state.app.error = None;
    state.app.lyrics.clear();
    state.app.current_line = None;
    state.request_tracker.clear(&RequestKey::Translation);

    let req_id = state.request_tracker.issue(RequestKey::Lyrics);
    tracing::debug!(req_id, track = %track.name, artist = %track.artist, "请求歌词");
    effects.send_backend_warn(
        BackendCommand::Lyrics { req_id, track },
        "BackendActor 已退出，无法获取歌词",
    );
}

fn request_translation(state: &mut CoreState, effects: &mut CoreEffects) {
    if state.app.lyrics.is_empty() || state.app.to_lang.is_empty() {
        return;
    }
    let lines = state
        .app
        .lyrics
        .iter()
        .map(|l| l.original_text.clone())
        .collect::<Vec<_>>();
    let req_id = state.request_tracker.issue(RequestKey::Translation);
    effects.send_backend_warn(
        BackendCommand::Translate {
            req_id,
            lines,
            source_lang: state.app.from_lang.clone(),
            target_lang: state.app.to_lang.clone(),
        },
        "BackendActor 已退出，无法翻译歌词",
    );
}

pub(super) fn handle_ui(cmd: &AppCommand, state: &mut CoreState, effects: &mut CoreEffects) -> bool {
    let AppCommand::SetLanguages { from, to } = cmd else {
        return false;
    };

    if let Err(e) = state.settings.set_languages(from, to) {
        let msg = e.to_string();
        state.app.error = Some(msg.clone());
        effects.error(msg);
        effects.emit_state(&state.app);
        return true;
    }
    if let Err(e) = settings::save_settings(&state.data_dir, &state.settings) {
        tracing::warn!(err = %e, "保存语言设置失败");
    }

    state.app.from_lang = state.settings.source_lang.clone();
    state.app.to_lang = state.settings.target_lang.clone();
    tracing::info!(from = %state.app.from_lang, to = %state.app.to_lang, "翻译语言已更新");
    request_translation(state, effects);
    effects.emit_state(&state.app);
    true
}

pub(super) fn handle_backend_event(
    evt: BackendEvent,
    state: &mut CoreState,
    effects: &mut CoreEffects,
) {
    match evt {
        BackendEvent::Lyrics {
            req_id,
            track,
            lyrics,
        } => {
            if !state.request_tracker.accept(&RequestKey::Lyrics, req_id) {
                tracing::debug!(req_id, "丢弃过期的歌词响应");
                return;
            }
            let current = state.app.current_track.as_ref().map(|t| t.identity());
            if current.as_ref() != Some(&track) {
                return;
            }
            if lyrics.is_empty() {
                set_error(state, effects, "该曲目暂无歌词");
            } else {
                state.app.lyrics = lyrics;
                state.app.update_current_line();
                request_translation(state, effects);
            }
            effects.emit_state(&state.app);
        }
        BackendEvent::Translation {
            req_id,
            translations,
        } => {
            if !state.request_tracker.accept(&RequestKey::Translation, req_id) {
                tracing::debug!(req_id, "丢弃过期的翻译响应");
                return;
            }
            if translations.len() != state.app.lyrics.len() {
                tracing::warn!(
                    expected = state.app.lyrics.len(),
                    got = translations.len(),
                    "译文行数与歌词不一致"
                );
            }
            lyrics::merge_translations(&mut state.app.lyrics, &translations);
            effects.emit_state(&state.app);
        }
        BackendEvent::Error {
            req_id,
            status,
            message,
        } => {
            if state.request_tracker.accept(&RequestKey::Lyrics, req_id) {
                let msg = if status == Some(404) {
                    "未找到该曲目的歌词"
                } else {
                    "获取歌词失败"
                };
                set_error(state, effects, msg);
                effects.emit_state(&state.app);
            } else if state.request_tracker.accept(&RequestKey::Translation, req_id) {
                // 翻译失败时保留原文
                set_error(state, effects, &format!("翻译失败: {message}"));
                effects.emit_state(&state.app);
            }
        }
    }
}

fn set_error(state: &mut CoreState, effects: &mut CoreEffects, msg: &str) {
    state.app.error = Some(msg.to_owned());
    effects.error(msg);
}
