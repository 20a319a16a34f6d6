use std::sync::{Arc, RwLock};

use rbuddy_client::{ApiError, ResolutionGateway, TokenSource, UserIdentity};
use rbuddy_flux::StateStore;
use tracing::{info, warn};

use crate::error::SyncError;
use crate::state::{AuthPhase, AuthState, LoginPrompt};

const LOGIN_PROMPT: &str = "Please login to share your thoughts!";

#[derive(Debug, Clone, Default)]
struct Session {
    token: Option<String>,
    user: Option<UserIdentity>,
}

/// The signed-in user and their bearer token.
///
/// Cloning shares the same session. The gateway holds one as its
/// [`TokenSource`]; the engine holds one to know who is acting.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
}

impl SessionHandle {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session whose identity is already known.
    pub fn signed_in(token: impl Into<String>, user: UserIdentity) -> Self {
        let handle = Self::default();
        handle.set(token.into(), user);
        handle
    }

    pub fn is_authenticated(&self) -> bool {
        let s = self.inner.read().unwrap();
        s.token.is_some() && s.user.is_some()
    }

    pub fn user(&self) -> Option<UserIdentity> {
        let s = self.inner.read().unwrap();
        s.token.as_ref().and(s.user.clone())
    }

    pub fn token(&self) -> Option<String> {
        self.inner.read().unwrap().token.clone()
    }

    pub fn set(&self, token: String, user: UserIdentity) {
        *self.inner.write().unwrap() = Session { token: Some(token), user: Some(user) };
    }

    pub fn clear(&self) {
        *self.inner.write().unwrap() = Session::default();
    }

    /// Change the display name of the signed-in user.
    pub fn rename(&self, name: &str) {
        if let Some(user) = self.inner.write().unwrap().user.as_mut() {
            user.name = name.to_string();
        }
    }

    /// Adopt `token` and resolve it to a user through the gateway.
    ///
    /// The gateway is expected to read its token from this session. On
    /// failure the session ends up anonymous.
    pub async fn login(
        &self,
        token: &str,
        gateway: &dyn ResolutionGateway,
    ) -> Result<UserIdentity, SyncError> {
        *self.inner.write().unwrap() = Session { token: Some(token.to_string()), user: None };
        match gateway.verify_token().await {
            Ok(user) => {
                self.set(token.to_string(), user.clone());
                info!(user = %user.id, "signed in");
                Ok(user)
            }
            Err(e) => {
                self.clear();
                warn!("token verification failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// The acting user, or `LoginRequired` after publishing a login prompt
    /// for `action`.
    pub(crate) fn require_user(
        &self,
        store: &StateStore,
        action: &str,
    ) -> Result<UserIdentity, SyncError> {
        match self.user() {
            Some(user) => Ok(user),
            None => {
                store.set(
                    LoginPrompt::PATH,
                    LoginPrompt { message: LOGIN_PROMPT.into(), action: action.into() },
                );
                Err(SyncError::LoginRequired)
            }
        }
    }

    /// Write the session into `auth/state`.
    pub fn publish(&self, store: &StateStore) {
        let state = match self.user() {
            Some(user) => AuthState {
                phase: AuthPhase::Authenticated,
                user: Some(user),
                busy: false,
                error: None,
            },
            None => AuthState::anonymous(),
        };
        store.set(AuthState::PATH, state);
    }
}

#[async_trait::async_trait]
impl TokenSource for SessionHandle {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(SessionHandle::token(self))
    }
}
