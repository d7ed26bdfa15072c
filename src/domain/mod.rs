pub mod model;

pub use model::{LyricLine, PlaybackSnapshot, PlayerControl, TrackIdentity, UserProfile};
