pub mod authorize;
pub mod clock;
pub mod refresh;
pub mod session;
pub mod storage;
pub mod store;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use session::{RefreshTimer, Session};
pub use storage::{FileTokenStorage, MemoryTokenStorage, TokenStorage};
pub use store::TokenStore;
pub use token::{TokenResponse, TokenState};
