//! HTTP API: admin session, admin content management and the public endpoints

mod errors;
pub mod handlers;
pub mod session;

pub use errors::ApiError;
pub use handlers::AppState;
pub use session::{admin_page_guard, require_session, Session, SESSION_COOKIE};
