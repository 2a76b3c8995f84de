use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity-provider user identifier (an opaque UUID string).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An authenticated session issued by the identity provider.
///
/// Created on sign-in, replaced on provider-pushed refresh, destroyed on
/// sign-out. Owned by the session machinery; read-only everywhere else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub user_id: UserId,
    pub email: Option<String>,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_session_expiry() {
        let now = Utc::now();
        let session = Session {
            user_id: UserId::new("user-1"),
            email: None,
            access_token: "token".to_string(),
            expires_at: now + Duration::hours(1),
        };

        assert!(!session.is_expired(now));
        assert!(session.is_expired(now + Duration::hours(2)));
        assert!(session.is_expired(session.expires_at));
    }
}
