use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::ClientConfig;
use crate::messages::app::AppCommand;

#[derive(Debug, Parser)]
#[command(
    name = "spotify-lyrics-ratui",
    version,
    about = "Spotify 歌词同步翻译客户端"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// 覆盖数据目录（默认走系统 data_local_dir）
    #[arg(long, env = "SPOTIFY_LYRICS_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// 覆盖日志目录（默认 `{data_dir}/logs`）
    #[arg(long, env = "SPOTIFY_LYRICS_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// 覆盖日志过滤（等价于设置 RUST_LOG）
    #[arg(long, env = "RUST_LOG")]
    pub log_filter: Option<String>,

    /// 后端中转服务地址（默认 http://localhost:3000）
    #[arg(long, env = "SPOTIFY_LYRICS_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Spotify Web API 根地址（默认 https://api.spotify.com/v1）
    #[arg(long, env = "SPOTIFY_API_BASE")]
    pub api_base: Option<String>,

    #[arg(long, env = "SPOTIFY_CLIENT_ID")]
    pub client_id: Option<String>,

    #[arg(long, env = "SPOTIFY_REDIRECT_URI")]
    pub redirect_uri: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 跟随当前播放输出歌词（默认）
    Watch,

    /// 打印授权页地址
    LoginUrl,

    /// 用授权回调中的 code 登录
    Login {
        #[arg(long)]
        code: String,
    },

    /// 注销并清除本地 token
    Logout,

    /// 查看登录状态
    Status,
}

impl Cli {
    pub fn client_config(&self) -> ClientConfig {
        let mut cfg = ClientConfig::default();
        if let Some(v) = self.data_dir.clone() {
            cfg.data_dir = v;
        }
        if let Some(v) = self.backend_url.clone() {
            cfg.backend_url = v;
        }
        if let Some(v) = self.api_base.clone() {
            cfg.api_base = v;
        }
        if let Some(v) = self.client_id.clone() {
            cfg.client_id = Some(v);
        }
        if let Some(v) = self.redirect_uri.clone() {
            cfg.redirect_uri = v;
        }
        cfg
    }
}

/// watch 模式下从标准输入读到的一行指令
pub fn parse_line(line: &str) -> Option<AppCommand> {
    let mut parts = line.split_whitespace();
    let cmd = match parts.next()? {
        "p" | "play" | "pause" => AppCommand::TogglePlay,
        "n" | "next" => AppCommand::Next,
        "b" | "prev" => AppCommand::Previous,
        "m" | "mute" => AppCommand::ToggleMute,
        "r" | "refresh" => AppCommand::Refresh,
        "seek" => AppCommand::SeekPercent {
            percent: parts
                .next()?
                .parse::<f64>()
                .ok()
                .filter(|p| p.is_finite())?,
        },
        "vol" => AppCommand::SetVolume {
            percent: parts.next()?.parse().ok()?,
        },
        "lang" => {
            let from = parts.next()?.to_owned();
            let to = parts.next()?.to_owned();
            AppCommand::SetLanguages { from, to }
        }
        "logout" => AppCommand::Logout,
        "q" | "quit" => AppCommand::Quit,
        _ => return None,
    };
    Some(cmd)
}
