use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use uuid::Uuid;

/// A signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
}

/// Supplies the signed-in identity and auth-state change notifications.
/// How authentication actually happens is outside this crate.
pub trait IdentityProvider: Send + Sync {
    /// The currently signed-in user, if any
    fn current_user(&self) -> Option<UserIdentity>;

    /// Receiver that observes sign-in/sign-out transitions
    fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>>;
}

pub type SharedIdentity = Arc<dyn IdentityProvider>;

/// Single-tenant local identity provider: one user, signed in explicitly
pub struct LocalIdentityProvider {
    state: watch::Sender<Option<UserIdentity>>,
}

impl LocalIdentityProvider {
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        LocalIdentityProvider { state }
    }

    /// Sign in a local user and broadcast the change
    pub fn sign_in(&self, name: impl Into<String>, email: Option<String>) -> UserIdentity {
        let user = UserIdentity {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            email,
        };
        let _ = self.state.send(Some(user.clone()));
        user
    }

    pub fn sign_out(&self) {
        let _ = self.state.send(None);
    }
}

impl Default for LocalIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for LocalIdentityProvider {
    fn current_user(&self) -> Option<UserIdentity> {
        self.state.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<UserIdentity>> {
        self.state.subscribe()
    }
}
