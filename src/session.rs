/// Client-held session state
///
/// The server keeps no session records: a successful token verification
/// hands the client a `SessionBoundary` and that value is the whole
/// proof of authentication. It has no server-side TTL; it ends only when
/// the client clears it.
use serde::{Deserialize, Serialize};

/// Proof of authentication: the account id and the email it was
/// established for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBoundary {
    pub user_id: String,
    pub email: String,
}

impl SessionBoundary {
    /// Establish a session after a successful verification
    pub fn establish(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
        }
    }

    /// End the session (logout). Consumes the value so a cleared
    /// session cannot be presented again.
    pub fn clear(self) {}
}
