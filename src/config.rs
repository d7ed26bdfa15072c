use directories::ProjectDirs;
use std::path::PathBuf;

/// 客户端连接配置（后端中转 + Spotify Web API）
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// 后端中转服务地址（/api/token、/api/refresh、/api/lyrics ...）
    pub backend_url: String,
    /// Spotify Web API 根地址
    pub api_base: String,
    /// Spotify 账号授权地址
    pub accounts_url: String,
    pub client_id: Option<String>,
    pub redirect_uri: String,
    pub data_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let data_dir = ProjectDirs::from("dev", "spotify-lyrics", "spotify-lyrics-ratui")
            .map(|p| p.data_local_dir().to_path_buf())
            .unwrap_or_else(|| std::env::temp_dir().join("spotify-lyrics-ratui"));
        Self {
            backend_url: "http://localhost:3000".to_owned(),
            api_base: "https://api.spotify.com/v1".to_owned(),
            accounts_url: "https://accounts.spotify.com".to_owned(),
            client_id: None,
            redirect_uri: "http://localhost:3000/callback".to_owned(),
            data_dir,
        }
    }
}

impl ClientConfig {
    pub(crate) fn backend_endpoint(&self, path: &str) -> String {
        join_url(&self.backend_url, path)
    }

    pub(crate) fn api_endpoint(&self, path: &str) -> String {
        join_url(&self.api_base, path)
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
