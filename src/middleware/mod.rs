mod request_logging;
mod require_auth;

pub use request_logging::RequestLogger;
pub use require_auth::{AuthenticatedUser, RequireAuth};
