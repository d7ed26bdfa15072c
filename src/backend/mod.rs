pub mod actor;
pub mod client;
pub mod dto;

pub use actor::{BackendCommand, BackendEvent, spawn_backend_actor};
pub use client::BackendClient;
