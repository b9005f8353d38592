//! Authentication: login, token handling and the route guards.

mod log_in;
mod middleware;
mod token;

pub use log_in::{Credentials, LogInResponse, post_log_in};
pub use middleware::{admin_guard, auth_guard};
pub use token::{Claims, TOKEN_DURATION, decode_token, encode_token};
