pub mod session;
pub mod test_utils;

pub use session::{FileSessionStore, Session, SessionError, TokenClaims};
