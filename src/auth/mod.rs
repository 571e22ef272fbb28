/// Passwordless sign-in
///
/// Handles the full lifecycle of single-use, time-bounded sign-in
/// tokens: issuance for a (possibly new) account, out-of-band delivery
/// of the sign-in URL, and atomic consumption at verification.

mod manager;

pub use manager::{AuthManager, IssuedToken, TOKEN_TTL_MINUTES};
