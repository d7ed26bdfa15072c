use crate::domain::model::{PlaybackSnapshot, UserProfile};
use crate::error::ApiError;

use super::dto::{CurrentlyPlayingResp, UserProfileResp};

pub fn to_snapshot(resp: CurrentlyPlayingResp) -> Result<PlaybackSnapshot, ApiError> {
    let item = resp.item.ok_or(ApiError::MissingField("item"))?;
    let artist_name = item
        .artists
        .into_iter()
        .next()
        .map(|a| a.name)
        .unwrap_or_default();
    let (album_name, album_art) = match item.album {
        Some(album) => (album.name, album.images.into_iter().next().map(|i| i.url)),
        None => (String::new(), None),
    };

    Ok(PlaybackSnapshot {
        track_id: item.id,
        track_name: item.name,
        artist_name,
        album_name,
        album_art,
        duration_ms: item.duration_ms,
        position_ms: resp.progress_ms.unwrap_or(0),
        is_playing: resp.is_playing,
    })
}

pub fn to_profile(resp: UserProfileResp) -> UserProfile {
    UserProfile {
        name: resp.display_name.or(resp.id).unwrap_or_default(),
        email: resp.email,
        image: resp.images.into_iter().next().map(|i| i.url),
    }
}
