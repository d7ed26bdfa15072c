use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    // 翻译设置
    #[serde(default = "default_source_lang")]
    pub source_lang: String,
    #[serde(default = "default_target_lang")]
    pub target_lang: String,

    // 播放器设置
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_volume")]
    pub default_volume: u8,

    // 网络 / token 设置
    #[serde(default = "default_refresh_leeway_secs")]
    pub refresh_leeway_secs: u64,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_http_connect_timeout_secs")]
    pub http_connect_timeout_secs: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
            poll_interval_ms: default_poll_interval_ms(),
            default_volume: default_volume(),
            refresh_leeway_secs: default_refresh_leeway_secs(),
            http_timeout_secs: default_http_timeout_secs(),
            http_connect_timeout_secs: default_http_connect_timeout_secs(),
        }
    }
}

// 默认值函数（用于 serde default）
fn default_source_lang() -> String { "auto".to_owned() }
fn default_target_lang() -> String { "en".to_owned() }
fn default_poll_interval_ms() -> u64 { 1000 }
fn default_volume() -> u8 { 70 }
fn default_refresh_leeway_secs() -> u64 { 60 }
fn default_http_timeout_secs() -> u64 { 30 }
fn default_http_connect_timeout_secs() -> u64 { 10 }

impl AppSettings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(100))
    }

    pub fn refresh_leeway(&self) -> Duration {
        Duration::from_secs(self.refresh_leeway_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs.max(1))
    }

    pub fn http_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.http_connect_timeout_secs.max(1))
    }

    /// 设置翻译语言；目标语言不能是 auto
    pub fn set_languages(&mut self, from: &str, to: &str) -> Result<(), SettingsError> {
        let from = from.trim().to_lowercase();
        let to = to.trim().to_lowercase();
        if to.is_empty() || to == "auto" {
            return Err(SettingsError::InvalidValue(format!("目标语言无效: {to:?}")));
        }
        self.source_lang = if from.is_empty() { default_source_lang() } else { from };
        self.target_lang = to;
        Ok(())
    }
}

pub fn load_settings(data_dir: &Path) -> AppSettings {
    let p = settings_path(data_dir);
    let Ok(bytes) = fs::read(&p) else {
        return AppSettings::default();
    };
    serde_json::from_slice(&bytes).unwrap_or_default()
}

pub fn save_settings(data_dir: &Path, s: &AppSettings) -> Result<(), SettingsError> {
    write_atomic(data_dir, s).map_err(|source| SettingsError::Save { source })
}

fn write_atomic(data_dir: &Path, s: &AppSettings) -> std::io::Result<()> {
    fs::create_dir_all(data_dir)?;
    let p = settings_path(data_dir);
    let tmp = p.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(s).unwrap_or_else(|_| b"{}".to_vec());
    fs::write(&tmp, bytes)?;
    if let Err(e) = fs::rename(&tmp, &p) {
        let _ = fs::remove_file(&p);
        fs::rename(&tmp, &p).map_err(|_| e)?;
    }
    Ok(())
}

fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join("settings.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let s: AppSettings = serde_json::from_str(r#"{"target_lang":"ja"}"#).expect("parse");
        assert_eq!(s.target_lang, "ja");
        assert_eq!(s.source_lang, "auto");
        assert_eq!(s.poll_interval_ms, 1000);
        assert_eq!(s.refresh_leeway_secs, 60);
    }

    #[test]
    fn set_languages_rejects_auto_target() {
        let mut s = AppSettings::default();
        assert!(s.set_languages("ja", "auto").is_err());
        assert_eq!(s.target_lang, "en");

        s.set_languages(" KO ", "EN").expect("valid");
        assert_eq!(s.source_lang, "ko");
        assert_eq!(s.target_lang, "en");
    }

    #[test]
    fn poll_interval_has_floor() {
        let s = AppSettings {
            poll_interval_ms: 0,
            ..AppSettings::default()
        };
        assert_eq!(s.poll_interval(), Duration::from_millis(100));
    }
}
