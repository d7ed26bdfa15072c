/// 曲目身份：歌名 + 第一位艺人，用于判断是否切歌
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct TrackIdentity {
    pub name: String,
    pub artist: String,
}

/// 一次 currently-playing 轮询的结果
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlaybackSnapshot {
    pub track_id: Option<String>,
    pub track_name: String,
    pub artist_name: String,
    pub album_name: String,
    pub album_art: Option<String>,
    pub duration_ms: u64,
    pub position_ms: u64,
    pub is_playing: bool,
}

impl PlaybackSnapshot {
    pub fn identity(&self) -> TrackIdentity {
        TrackIdentity {
            name: self.track_name.clone(),
            artist: self.artist_name.clone(),
        }
    }

    pub fn same_track(&self, other: &PlaybackSnapshot) -> bool {
        self.track_name == other.track_name && self.artist_name == other.artist_name
    }

    /// 播放进度百分比（0..=100）；时长未知时为 0
    pub fn progress_percent(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        (self.position_ms as f64 / self.duration_ms as f64 * 100.0).clamp(0.0, 100.0)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LyricLine {
    pub original_text: String,
    pub translated_text: String,
    pub start_time_ms: u64,
    pub end_time_ms: u64,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    pub image: Option<String>,
}

/// 用户发起的播放控制
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerControl {
    Play,
    Pause,
    Next,
    Previous,
    Seek { position_ms: u64 },
    Volume { percent: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_percent_handles_zero_duration() {
        let snap = PlaybackSnapshot {
            position_ms: 500,
            ..Default::default()
        };
        assert_eq!(snap.progress_percent(), 0.0);
    }

    #[test]
    fn progress_percent_is_position_over_duration() {
        let snap = PlaybackSnapshot {
            duration_ms: 200_000,
            position_ms: 50_000,
            ..Default::default()
        };
        assert!((snap.progress_percent() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn identity_ignores_progress() {
        let a = PlaybackSnapshot {
            track_name: "Lemon".to_owned(),
            artist_name: "Kenshi Yonezu".to_owned(),
            position_ms: 1,
            ..Default::default()
        };
        let b = PlaybackSnapshot {
            position_ms: 9_000,
            ..a.clone()
        };
        assert!(a.same_track(&b));
        assert_eq!(a.identity(), b.identity());
    }
}
