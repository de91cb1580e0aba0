//! The session store and its event-driven state machine.

use std::sync::{Arc, RwLock};

use backend::{AuthBackend, AuthEvent};
use entities::User;
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};

use crate::{SessionError, SessionResult};

/// Where the session currently stands.
///
/// `Loading` holds only until the first [`SessionStore::restore`] completes;
/// after that the state moves between `Authenticated` and `Anonymous`, driven
/// exclusively by the auth backend's session-change stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Startup; restore has not finished yet.
    Loading,
    /// A user is signed in.
    Authenticated(User),
    /// Nobody is signed in.
    Anonymous,
}

impl SessionState {
    /// Returns the signed-in user, if any.
    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }
}

/// Single source of truth for "who is logged in".
///
/// Login and signup calls only trigger the backend side effect; the state
/// update always arrives through the event listener. One code path writes
/// "current user", so a call's return value and the session stream can never
/// diverge.
pub struct SessionStore {
    backend: Arc<dyn AuthBackend>,
    state: RwLock<SessionState>,
    user_tx: watch::Sender<Option<User>>,
}

impl SessionStore {
    /// Creates a store in the `Loading` state.
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        let (user_tx, _) = watch::channel(None);
        Self {
            backend,
            state: RwLock::new(SessionState::Loading),
            user_tx,
        }
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> SessionState {
        self.state.read().unwrap().clone()
    }

    /// Returns the signed-in user, if any.
    pub fn current_user(&self) -> Option<User> {
        self.state.read().unwrap().user().cloned()
    }

    /// True while the initial restore has not completed.
    pub fn is_loading(&self) -> bool {
        matches!(*self.state.read().unwrap(), SessionState::Loading)
    }

    /// True when a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        matches!(*self.state.read().unwrap(), SessionState::Authenticated(_))
    }

    /// Channel downstream consumers (the task store) watch for user changes.
    pub fn subscribe_user(&self) -> watch::Receiver<Option<User>> {
        self.user_tx.subscribe()
    }

    /// Queries the backend for an existing session once at startup.
    ///
    /// Terminates the `Loading` state exactly once, whatever the outcome: an
    /// existing session authenticates, absence or a lookup error leaves the
    /// store anonymous.
    pub async fn restore(&self) {
        match self.backend.session().await {
            Ok(Some(session)) => self.set_user(Some(session.user)),
            Ok(None) => self.set_user(None),
            Err(e) => {
                tracing::warn!(error = %e, "session restore failed");
                self.set_user(None);
            }
        }
    }

    /// Spawns the single consumer loop over the backend's session-change
    /// stream. Abort the returned handle on teardown to drop the
    /// subscription.
    pub fn spawn_listener(self: &Arc<Self>) -> JoinHandle<()> {
        let store = Arc::clone(self);
        let mut rx = store.backend.subscribe();

        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(AuthEvent::SignedIn(session)) | Ok(AuthEvent::UserUpdated(session)) => {
                        tracing::debug!(user_id = %session.user.id, "session signed in");
                        store.set_user(Some(session.user));
                    }
                    Ok(AuthEvent::SignedOut) => {
                        tracing::debug!("session signed out");
                        store.set_user(None);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "auth event stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    /// Delegates sign-in to the backend.
    ///
    /// On failure the backend's message is surfaced to the caller. On
    /// success local state is deliberately NOT set here; the sign-in event
    /// on the session stream performs the update.
    pub async fn login(&self, email: &str, password: &str) -> SessionResult<()> {
        self.backend
            .sign_in_with_password(email, password)
            .await
            .map_err(|e| {
                tracing::warn!(email, error = %e, "login failed");
                SessionError::Auth(e.to_string())
            })?;
        Ok(())
    }

    /// Creates an account with `name` as profile metadata and signs in.
    /// Same event-driven contract as [`login`](Self::login).
    pub async fn signup(&self, email: &str, password: &str, name: &str) -> SessionResult<()> {
        self.backend
            .sign_up(email, password, name)
            .await
            .map_err(|e| {
                tracing::warn!(email, error = %e, "signup failed");
                SessionError::Auth(e.to_string())
            })?;
        Ok(())
    }

    /// Ends the session. A backend failure is logged, not surfaced: the user
    /// is treated as logged out regardless of acknowledgment.
    pub async fn logout(&self) {
        if let Err(e) = self.backend.sign_out().await {
            tracing::warn!(error = %e, "sign-out failed; ending session locally");
            self.set_user(None);
        }
    }

    fn set_user(&self, user: Option<User>) {
        let mut state = self.state.write().unwrap();
        *state = match &user {
            Some(user) => SessionState::Authenticated(user.clone()),
            None => SessionState::Anonymous,
        };
        drop(state);

        self.user_tx.send_replace(user);
    }
}
