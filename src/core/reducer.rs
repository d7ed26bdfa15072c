use crate::app::App;
use crate::auth::Session;
use crate::backend::{BackendClient, BackendEvent, spawn_backend_actor};
use crate::messages::app::{AppCommand, AppEvent};
use crate::settings::AppSettings;
use crate::spotify::{SpotifyClient, SpotifyEvent, spawn_spotify_actor};

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Interval, MissedTickBehavior};

use crate::core::effects::{CoreDispatch, CoreEffects, run_effects};
use crate::core::infra::{RequestKey, RequestTracker};
use crate::domain::model::PlayerControl;

mod lyrics;
mod playback;
mod session;

enum CoreMsg {
    Ui(AppCommand),
    Spotify(SpotifyEvent),
    Backend(BackendEvent),
    PollTick,
    DelayedRefresh,
    LoggedOut,
}

struct CoreState {
    app: App,
    settings: AppSettings,
    data_dir: PathBuf,
    request_tracker: RequestTracker<RequestKey>,
    /// 在途的播放控制请求，失败时用于生成错误提示
    pending_controls: HashMap<u64, PlayerControl>,
    /// `app.error` 来自最近一次失败的播放状态请求
    playback_failed: bool,
}

impl CoreState {
    fn new(data_dir: PathBuf, settings: AppSettings) -> Self {
        Self {
            app: App::from_settings(&settings),
            settings,
            data_dir,
            request_tracker: RequestTracker::new(),
            pending_controls: HashMap::new(),
            playback_failed: false,
        }
    }
}

/// 返回 true 表示退出
fn reduce(msg: CoreMsg, state: &mut CoreState, effects: &mut CoreEffects) -> bool {
    match msg {
        CoreMsg::Ui(AppCommand::Quit) => return true,
        CoreMsg::Ui(cmd) => {
            if session::handle_ui(&cmd, state, effects) {
                return false;
            }
            if playback::handle_ui(&cmd, state, effects) {
                return false;
            }
            lyrics::handle_ui(&cmd, state, effects);
        }
        CoreMsg::Spotify(evt) => {
            if session::handle_spotify_event(&evt, state, effects) {
                return false;
            }
            playback::handle_spotify_event(evt, state, effects);
        }
        CoreMsg::Backend(evt) => lyrics::handle_backend_event(evt, state, effects),
        CoreMsg::PollTick => playback::handle_poll_tick(state, effects),
        CoreMsg::DelayedRefresh => playback::request_playback(state, effects),
        CoreMsg::LoggedOut => session::handle_logged_out(state, effects),
    }
    false
}

/// 新建轮询定时器：第一次 tick 立即触发
fn poll_interval(settings: &AppSettings) -> Interval {
    let mut interval = tokio::time::interval(settings.poll_interval());
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

pub fn spawn_app_actor(
    session: Arc<Session>,
    spotify: SpotifyClient,
    backend: BackendClient,
    settings: AppSettings,
    data_dir: PathBuf,
) -> (mpsc::Sender<AppCommand>, mpsc::Receiver<AppEvent>) {
    let (tx_cmd, mut rx_cmd) = mpsc::channel::<AppCommand>(64);
    let (tx_evt, rx_evt) = mpsc::channel::<AppEvent>(64);
    let (tx_delayed, mut rx_delayed) = mpsc::channel::<()>(8);

    let (tx_spotify_hi, tx_spotify_lo, mut rx_spotify) = spawn_spotify_actor(spotify);
    let (tx_backend, mut rx_backend) = spawn_backend_actor(backend);
    let mut session_rx = session.subscribe();

    tokio::spawn(async move {
        let mut state = CoreState::new(data_dir, settings);
        state.app.logged_in = session.is_logged_in();
        let mut session_open = true;
        // 轮询定时器随 actor 状态一起释放
        let mut poll: Option<Interval> = None;

        let dispatch = CoreDispatch {
            tx_spotify_hi: &tx_spotify_hi,
            tx_spotify_lo: &tx_spotify_lo,
            tx_backend: &tx_backend,
            tx_evt: &tx_evt,
            tx_delayed: &tx_delayed,
            session: &session,
        };

        loop {
            let msg = tokio::select! {
                Some(cmd) = rx_cmd.recv() => CoreMsg::Ui(cmd),
                Some(evt) = rx_spotify.recv() => CoreMsg::Spotify(evt),
                Some(evt) = rx_backend.recv() => CoreMsg::Backend(evt),
                Some(()) = rx_delayed.recv() => CoreMsg::DelayedRefresh,
                _ = async {
                    match poll.as_mut() {
                        Some(interval) => interval.tick().await,
                        None => std::future::pending().await,
                    }
                } => CoreMsg::PollTick,
                changed = session_rx.changed(), if session_open => {
                    if changed.is_err() {
                        session_open = false;
                        continue;
                    }
                    if session_rx.borrow_and_update().is_some() {
                        continue;
                    }
                    CoreMsg::LoggedOut
                }
                else => break,
            };

            let mut effects = CoreEffects::default();
            let should_quit = reduce(msg, &mut state, &mut effects);
            run_effects(effects, &dispatch).await;
            if should_quit {
                tracing::info!("AppActor 退出");
                break;
            }

            match (state.app.wants_polling(), poll.is_some()) {
                (true, false) => {
                    tracing::debug!("开始轮询播放状态");
                    poll = Some(poll_interval(&state.settings));
                }
                (false, true) => {
                    tracing::debug!("停止轮询播放状态");
                    poll = None;
                }
                _ => {}
            }
        }
    });

    (tx_cmd, rx_evt)
}

#[cfg(test)]
mod test_support {
    use super::CoreState;
    use crate::core::effects::{CoreEffect, CoreEffects};
    use crate::settings::AppSettings;

    pub(super) fn logged_in_state(dir: &std::path::Path) -> CoreState {
        let mut state = CoreState::new(dir.to_path_buf(), AppSettings::default());
        state.app.logged_in = true;
        state.app.view = crate::app::View::Lyrics;
        state
    }

    pub(super) fn take(effects: CoreEffects) -> Vec<CoreEffect> {
        effects.actions
    }
}
