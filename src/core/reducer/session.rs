use super::{CoreState, playback};
use crate::app::View;
use crate::core::effects::CoreEffects;
use crate::core::infra::RequestKey;
use crate::messages::app::AppCommand;
use crate::spotify::{SpotifyCommand, SpotifyEvent};

pub(super) fn handle_ui(cmd: &AppCommand, state: &mut CoreState, effects: &mut CoreEffects) -> bool {
    match cmd {
        AppCommand::Bootstrap | AppCommand::Refresh => {
            if !state.app.logged_in {
                state.app.view = View::Login;
                effects.emit_state(&state.app);
                return true;
            }
            state.app.view = View::Lyrics;
            state.app.loading = true;
            state.app.error = None;
            state.playback_failed = false;
            playback::request_playback(state, effects);
            let req_id = state.request_tracker.issue(RequestKey::Profile);
            effects.send_spotify_hi_warn(
                SpotifyCommand::Profile { req_id },
                "SpotifyActor 已退出，无法获取用户信息",
            );
            effects.emit_state(&state.app);
            true
        }
        AppCommand::Logout => {
            tracing::info!("用户注销");
            effects.logout();
            true
        }
        _ => false,
    }
}

pub(super) fn handle_spotify_event(
    evt: &SpotifyEvent,
    state: &mut CoreState,
    effects: &mut CoreEffects,
) -> bool {
    match evt {
        SpotifyEvent::Profile { req_id, profile } => {
            if state.request_tracker.accept(&RequestKey::Profile, *req_id) {
                state.app.profile = Some(profile.clone());
                effects.emit_state(&state.app);
            }
            true
        }
        SpotifyEvent::Error {
            req_id,
            ctx: "Profile",
            ..
        } => {
            if state.request_tracker.accept(&RequestKey::Profile, *req_id) {
                let msg = "获取用户信息失败";
                state.app.error = Some(msg.to_owned());
                effects.error(msg);
                effects.emit_state(&state.app);
            }
            true
        }
        _ => false,
    }
}

/// 会话被注销（主动注销或刷新失败）：丢弃在途请求，回到登录页
pub(super) fn handle_logged_out(state: &mut CoreState, effects: &mut CoreEffects) {
    state.request_tracker.reset_all();
    state.pending_controls.clear();
    state.playback_failed = false;
    state.app.reset_session();
    effects.logged_out();
    effects.emit_state(&state.app);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::effects::CoreEffect;
    use crate::core::reducer::test_support::{logged_in_state, take};
    use crate::domain::model::PlaybackSnapshot;

    #[test]
    fn bootstrap_logged_out_shows_login() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut state = logged_in_state(dir.path());
        state.app.logged_in = false;
        let mut effects = CoreEffects::default();

        assert!(handle_ui(&AppCommand::Bootstrap, &mut state, &mut effects));
        assert_eq!(state.app.view, View::Login);
        let actions = take(effects);
        assert!(
            !actions
                .iter()
                .any(|a| matches!(a, CoreEffect::SendSpotifyHi { .. }))
        );
    }

    #[test]
    fn bootstrap_fetches_playback_and_profile() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut state = logged_in_state(dir.path());
        let mut effects = CoreEffects::default();

        handle_ui(&AppCommand::Bootstrap, &mut state, &mut effects);
        assert!(state.app.loading);
        let sent = take(effects)
            .into_iter()
            .filter_map(|a| match a {
                CoreEffect::SendSpotifyHi { cmd, .. } => Some(cmd),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert!(matches!(sent[0], SpotifyCommand::CurrentlyPlaying { .. }));
        assert!(matches!(sent[1], SpotifyCommand::Profile { .. }));
    }

    #[test]
    fn logged_out_resets_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut state = logged_in_state(dir.path());
        state.app.apply_playback(PlaybackSnapshot {
            track_name: "A".to_owned(),
            is_playing: true,
            duration_ms: 1000,
            ..PlaybackSnapshot::default()
        });
        let mut effects = CoreEffects::default();

        handle_logged_out(&mut state, &mut effects);
        assert_eq!(state.app.view, View::Login);
        assert!(!state.app.wants_polling());
        assert!(
            take(effects)
                .iter()
                .any(|a| matches!(a, CoreEffect::EmitLoggedOut))
        );
    }
}
