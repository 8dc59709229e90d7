use serde::{Deserialize, Serialize};

/// The caller as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticatedUser {
    /// Stable identifier assigned by the provider.
    pub user_id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl AuthenticatedUser {
    pub fn new(user_id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email,
        }
    }
}
