pub mod app;
pub mod auth;
pub mod backend;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod http;
pub mod logging;
pub mod lyrics;
pub mod messages;
pub mod settings;
pub mod spotify;
