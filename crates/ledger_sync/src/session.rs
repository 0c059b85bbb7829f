use std::sync::{Arc, PoisonError, RwLock};

use ledger::UserId;

/// Source of the authenticated user.
///
/// Authentication itself lives elsewhere; the coordinator only asks who is
/// signed in and does nothing while the answer is `None`.
pub trait SessionProvider {
    fn user_id(&self) -> Option<UserId>;
}

/// Session whose user can be swapped at runtime, e.g. after sign-in.
#[derive(Clone, Debug, Default)]
pub struct SharedSession {
    user: Arc<RwLock<Option<UserId>>>,
}

impl SharedSession {
    pub fn new(user: Option<UserId>) -> Self {
        Self {
            user: Arc::new(RwLock::new(user)),
        }
    }

    pub fn signed_in(user: impl Into<String>) -> Self {
        Self::new(Some(UserId::new(user)))
    }

    pub fn set(&self, user: Option<UserId>) {
        *self.user.write().unwrap_or_else(PoisonError::into_inner) = user;
    }
}

impl SessionProvider for SharedSession {
    fn user_id(&self) -> Option<UserId> {
        self.user
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SessionProvider for Option<UserId> {
    fn user_id(&self) -> Option<UserId> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_session_is_visible_through_clones() {
        let session = SharedSession::default();
        let handle = session.clone();
        assert_eq!(session.user_id(), None);

        handle.set(Some(UserId::new("user_1")));
        assert_eq!(session.user_id(), Some(UserId::new("user_1")));

        handle.set(None);
        assert_eq!(session.user_id(), None);
    }

    #[test]
    fn option_is_a_fixed_session() {
        let session: Option<UserId> = Some(UserId::new("user_2"));
        assert_eq!(session.user_id().unwrap().as_str(), "user_2");
    }
}
