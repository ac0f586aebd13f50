/// Authentication module
///
/// Token pair issuance/verification, password hashing, and the single-use
/// refresh token lifecycle.
mod claims;
mod password;
mod refresh;
mod token;

pub use claims::Claims;
pub use password::hash_password;
pub use password::verify_password;
pub use refresh::consume_refresh_token;
pub use token::issue_token_pair;
pub use token::verify_token;
pub use token::TokenPair;
