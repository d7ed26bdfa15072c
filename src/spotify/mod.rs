pub mod actor;
pub mod client;
pub mod models;
pub mod request;

pub use actor::{ErrorKind, SpotifyCommand, SpotifyEvent, spawn_spotify_actor};
pub use client::SpotifyClient;
pub use request::ApiRequest;
