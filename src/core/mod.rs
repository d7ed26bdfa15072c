mod effects;
mod reducer;

pub mod infra;

pub use effects::{CoreEffect, CoreEffects};
pub use reducer::spawn_app_actor;
