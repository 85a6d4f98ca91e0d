pub mod manager;
pub mod session;

pub use manager::{AuthConfig, AuthSessionManager, CallbackParams};
pub use session::{SessionStore, TokenSet};
