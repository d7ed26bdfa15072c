pub mod state;

pub use state::{App, View};
