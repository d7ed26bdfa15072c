use crate::app::App;

#[derive(Debug)]
pub enum AppCommand {
    /// 启动：已登录则拉取播放状态与用户信息
    Bootstrap,
    Refresh,
    TogglePlay,
    Next,
    Previous,
    SeekPercent { percent: f64 },
    SetVolume { percent: u8 },
    ToggleMute,
    SetLanguages { from: String, to: String },
    Logout,
    Quit,
}

#[derive(Debug)]
pub enum AppEvent {
    State(Box<App>),
    LoggedOut,
    Error(String),
}
