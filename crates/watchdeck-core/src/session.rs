use watchdeck_models::{Session, UserId};

/// Holder of the current authenticated identity.
///
/// Populated and cleared exclusively from identity-provider events; every
/// other component reads it.
#[derive(Debug, Default)]
pub struct SessionStore {
    current: Option<Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self { current: None }
    }

    /// Apply a provider event: a new/refreshed session or a sign-out.
    pub fn apply(&mut self, session: Option<Session>) {
        self.current = session;
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.current.as_ref().map(|s| &s.user_id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::session;

    #[test]
    fn test_session_store_lifecycle() {
        let mut store = SessionStore::new();
        assert!(!store.is_authenticated());
        assert!(store.user_id().is_none());

        store.apply(Some(session("user-1")));
        assert!(store.is_authenticated());
        assert_eq!(store.user_id().unwrap().as_str(), "user-1");

        store.apply(None);
        assert!(!store.is_authenticated());
        assert!(store.current().is_none());
    }
}
