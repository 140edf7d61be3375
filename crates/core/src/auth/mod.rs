//! Authenticated identity seen by the core.
//!
//! The session/authentication layer lives outside the core. Services only
//! need a way to ask "who is calling?", which is what [`AuthSession`] offers.

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Identity of a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub user_id: String,
    pub email: Option<String>,
}

impl UserIdentity {
    pub fn new(user_id: impl Into<String>, email: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email,
        }
    }
}

/// Capability yielding the identity behind the current request, if any.
pub trait AuthSession: Send + Sync {
    fn current_user(&self) -> Option<UserIdentity>;

    /// Returns the current identity or `Error::AuthenticationRequired`.
    fn require_user(&self) -> Result<UserIdentity> {
        self.current_user().ok_or(Error::AuthenticationRequired)
    }
}

impl AuthSession for Option<UserIdentity> {
    fn current_user(&self) -> Option<UserIdentity> {
        self.clone()
    }
}

impl AuthSession for UserIdentity {
    fn current_user(&self) -> Option<UserIdentity> {
        Some(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_user() {
        let anonymous: Option<UserIdentity> = None;
        assert!(matches!(
            anonymous.require_user(),
            Err(Error::AuthenticationRequired)
        ));

        let identity = UserIdentity::new("user-1", None);
        assert_eq!(identity.require_user().unwrap().user_id, "user-1");
        assert_eq!(Some(identity).require_user().unwrap().user_id, "user-1");
    }
}
