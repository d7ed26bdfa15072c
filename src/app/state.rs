use crate::domain::model::{LyricLine, PlaybackSnapshot, UserProfile};
use crate::lyrics;
use crate::settings::AppSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Login,
    Lyrics,
}

/// 对外发布的应用状态快照
#[derive(Debug, Clone, Default)]
pub struct App {
    pub view: View,
    pub logged_in: bool,
    pub loading: bool,

    pub current_track: Option<PlaybackSnapshot>,
    pub progress_pct: f64,
    pub is_playing: bool,

    pub lyrics: Vec<LyricLine>,
    pub current_line: Option<usize>,

    pub profile: Option<UserProfile>,

    pub volume: u8,
    pub muted: bool,
    /// 静音前的音量，取消静音时恢复
    pub prev_volume: u8,

    pub from_lang: String,
    pub to_lang: String,

    pub error: Option<String>,
    /// 非错误的提示，例如当前没有在播放
    pub notice: Option<String>,
}

impl App {
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self {
            volume: settings.default_volume,
            prev_volume: settings.default_volume,
            from_lang: settings.source_lang.clone(),
            to_lang: settings.target_lang.clone(),
            ..Self::default()
        }
    }

    /// 应用一次轮询结果，返回是否切歌
    pub fn apply_playback(&mut self, snapshot: PlaybackSnapshot) -> bool {
        let changed = self
            .current_track
            .as_ref()
            .is_none_or(|cur| !cur.same_track(&snapshot));

        self.progress_pct = snapshot.progress_percent();
        self.is_playing = snapshot.is_playing;
        self.notice = None;
        if changed {
            self.lyrics.clear();
            self.current_line = None;
        }
        self.current_track = Some(snapshot);
        self.update_current_line();
        changed
    }

    /// 204：没有正在播放的曲目
    pub fn clear_track(&mut self) {
        self.current_track = None;
        self.is_playing = false;
        self.progress_pct = 0.0;
        self.lyrics.clear();
        self.current_line = None;
    }

    /// 由进度百分比换算出的播放位置
    pub fn position_ms(&self) -> u64 {
        let Some(track) = &self.current_track else {
            return 0;
        };
        (self.progress_pct / 100.0 * track.duration_ms as f64).round() as u64
    }

    /// 找不到对应行（第一行之前）时保持原来的高亮行
    pub fn update_current_line(&mut self) {
        if self.lyrics.is_empty() {
            self.current_line = None;
            return;
        }
        if let Some(i) = lyrics::active_line_index(&self.lyrics, self.position_ms()) {
            self.current_line = Some(i);
        }
    }

    pub fn wants_polling(&self) -> bool {
        self.logged_in && self.is_playing && self.current_track.is_some()
    }

    /// 注销后回到登录页，只保留语言与音量偏好
    pub fn reset_session(&mut self) {
        *self = Self {
            volume: self.volume,
            prev_volume: self.prev_volume,
            from_lang: std::mem::take(&mut self.from_lang),
            to_lang: std::mem::take(&mut self.to_lang),
            ..Self::default()
        };
    }
}
