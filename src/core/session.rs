//! Process-wide authentication state.
//!
//! The session is swapped as a whole on login and logout. Readers take an
//! `Arc` snapshot, so they never observe a token from one login paired with
//! the permission list of another.

use crate::api::models::CurrentUser;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub user: Option<CurrentUser>,
    pub token: Option<String>,
    pub allowed_actions: Vec<String>,
}

impl Session {
    pub fn new(user: CurrentUser, token: String, allowed_actions: Vec<String>) -> Self {
        Self {
            user: Some(user),
            token: Some(token),
            allowed_actions,
        }
    }

    /// Token known, user and permissions not fetched yet
    pub fn token_only(token: String) -> Self {
        Self {
            user: None,
            token: Some(token),
            allowed_actions: Vec::new(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Shared handle to the current session; clones point at the same state
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    current: Arc<RwLock<Arc<Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(session))),
        }
    }

    pub fn snapshot(&self) -> Arc<Session> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            // A writer panicked mid-swap; the stored Arc is still a complete session
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    fn replace(&self, session: Session) {
        let next = Arc::new(session);
        match self.current.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }

    pub fn login(&self, session: Session) {
        log::debug!(
            "Session replaced ({} allowed actions)",
            session.allowed_actions.len()
        );
        self.replace(session);
    }

    pub fn logout(&self) {
        log::debug!("Session cleared");
        self.replace(Session::default());
    }

    pub fn token(&self) -> Option<String> {
        self.snapshot().token.clone()
    }

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.snapshot().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_authenticated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn user(id: &str) -> CurrentUser {
        CurrentUser {
            id: id.to_string(),
            email: format!("{}@example.org", id),
            first_name: None,
            last_name: None,
            role: None,
        }
    }

    #[test]
    fn test_login_and_logout_replace_whole_session() {
        let store = SessionStore::new();
        assert!(!store.is_authenticated());

        store.login(Session::new(
            user("u1"),
            "t1".to_string(),
            vec!["member.findAll".to_string()],
        ));
        assert_eq!(store.token(), Some("t1".to_string()));
        assert_eq!(store.current_user().unwrap().id, "u1");

        store.logout();
        assert_eq!(*store.snapshot(), Session::default());
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::new();
        let other = store.clone();
        store.login(Session::token_only("abc".to_string()));
        assert_eq!(other.token(), Some("abc".to_string()));
    }

    #[test]
    fn test_snapshot_survives_later_swap() {
        let store = SessionStore::new();
        store.login(Session::new(user("u1"), "t1".to_string(), vec![]));
        let snapshot = store.snapshot();
        store.logout();
        assert_eq!(snapshot.token.as_deref(), Some("t1"));
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_concurrent_readers_see_consistent_sessions() {
        let store = SessionStore::new();
        let writer = {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..200 {
                    let token = format!("t{}", i);
                    store.login(Session::new(user("u"), token.clone(), vec![token]));
                }
            })
        };

        for _ in 0..200 {
            let snapshot = store.snapshot();
            // token and permission list always come from the same login
            if let Some(token) = &snapshot.token {
                assert_eq!(snapshot.allowed_actions, vec![token.clone()]);
            }
        }
        writer.join().unwrap();
    }
}
