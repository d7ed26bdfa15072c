use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CurrentlyPlayingResp {
    #[serde(default)]
    pub is_playing: bool,
    pub progress_ms: Option<u64>,
    /// 广告或本地文件时可能为 null
    pub item: Option<TrackItem>,
}

#[derive(Debug, Deserialize)]
pub struct TrackItem {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub artists: Vec<ArtistInfo>,
    pub album: Option<AlbumInfo>,
}

#[derive(Debug, Deserialize)]
pub struct ArtistInfo {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct AlbumInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub images: Vec<ImageInfo>,
}

#[derive(Debug, Deserialize)]
pub struct ImageInfo {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct UserProfileResp {
    pub display_name: Option<String>,
    pub id: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub images: Vec<ImageInfo>,
}
