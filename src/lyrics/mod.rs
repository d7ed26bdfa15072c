//! 歌词同步：当前行定位、译文合并、时间格式化

mod language;

pub use language::language_name;

use crate::domain::model::LyricLine;

/// 当前播放位置对应的歌词行
///
/// 第一行开始之前返回 `None`。不假设 `start_time_ms` 严格递增，逐行扫描。
pub fn active_line_index(lines: &[LyricLine], position_ms: u64) -> Option<usize> {
    lines.iter().enumerate().position(|(i, line)| {
        position_ms >= line.start_time_ms
            && lines
                .get(i + 1)
                .is_none_or(|next| position_ms < next.start_time_ms)
    })
}

/// 按下标合并译文；译文条数不足时对应行为空串
pub fn merge_translations(lines: &mut [LyricLine], translations: &[String]) {
    for (i, line) in lines.iter_mut().enumerate() {
        line.translated_text = translations.get(i).cloned().unwrap_or_default();
    }
}

/// 毫秒格式化为 `m:ss`
pub fn format_time(ms: u64) -> String {
    let total_sec = ms / 1000;
    let m = total_sec / 60;
    let s = total_sec % 60;
    format!("{m}:{s:02}")
}
