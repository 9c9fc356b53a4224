//! Session lifecycle: the single source of truth for "is the user logged in".
//!
//! The manager owns the in-memory session state, bootstraps it from the
//! credential store at startup, and mutates it through the login, register,
//! verify, and logout operations. UI layers read [`SessionState`] from here
//! and never derive authentication from ad-hoc checks.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::auth::{Ack, AuthApi, LoginReply, RegisterRequest, User};
use crate::error::Error;
use crate::store::{CredentialStore, Token};

/// Where the session is in its lifecycle.
///
/// `Loading` exists only between construction and the end of
/// [`initialize`](SessionManager::initialize); every operation leaves the
/// state at `Anonymous` or `Authenticated`.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Loading,
    Anonymous,
    Authenticated(User),
}

/// Navigation side effect for the UI layer to act on.
///
/// The manager never navigates itself; it returns the signal and the caller
/// routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Main workspace, after a session was established.
    Workspace,
    /// Verification prompt, carrying the email it concerns.
    VerificationPending { email: String },
    /// Landing view, after logout.
    Landing,
}

/// Result of a login attempt.
///
/// `VerificationRequired` is an alternate outcome, not a failure: no error
/// is raised and the state stays `Anonymous`, but the caller gets the email
/// back so it can route to the verification prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    LoggedIn { user: User },
    VerificationRequired { email: String },
}

impl LoginOutcome {
    /// The navigation signal matching this outcome.
    #[must_use]
    pub fn navigation(&self) -> Navigation {
        match self {
            Self::LoggedIn { .. } => Navigation::Workspace,
            Self::VerificationRequired { email } => Navigation::VerificationPending {
                email: email.clone(),
            },
        }
    }
}

/// Session state container, one instance per process.
///
/// Explicitly constructed and passed to the UI layer; construct it once at
/// startup, call [`initialize`](Self::initialize), and keep it for the
/// process lifetime. Concurrent `login`/`register` calls are not mutually
/// excluded — the UI is responsible for disabling duplicate submissions;
/// racing calls resolve last-writer-wins on the state slot.
pub struct SessionManager {
    api: AuthApi,
    store: Arc<dyn CredentialStore>,
    // Never held across an await.
    state: Mutex<SessionState>,
}

impl SessionManager {
    #[must_use]
    pub fn new(api: AuthApi) -> Self {
        let store = api.client().store();
        Self {
            api,
            store,
            state: Mutex::new(SessionState::Loading),
        }
    }

    /// Current session state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.lock().clone()
    }

    /// Whether an authenticated session is active.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(&*self.state.lock(), SessionState::Authenticated(_))
    }

    /// The authenticated profile, if any.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        match &*self.state.lock() {
            SessionState::Authenticated(user) => Some(user.clone()),
            _ => None,
        }
    }

    /// Bootstrap the session from the stored credential. Call once at
    /// process start.
    ///
    /// A stored credential is validated with a profile fetch; failure clears
    /// the credential (it is stale or revoked) and lands in `Anonymous`.
    /// Always terminates in `Anonymous` or `Authenticated`, never `Loading`.
    pub async fn initialize(&self) -> SessionState {
        if self.store.get().is_none() {
            return self.transition(SessionState::Anonymous);
        }
        match self.api.current_user().await {
            Ok(user) => self.transition(SessionState::Authenticated(user)),
            Err(error) => {
                tracing::warn!(%error, "stored credential rejected, clearing");
                if let Err(error) = self.store.remove() {
                    tracing::error!(%error, "failed to clear stale credential");
                }
                self.transition(SessionState::Anonymous)
            }
        }
    }

    /// Log in. On success the credential is persisted, the profile becomes
    /// the authenticated state, and the outcome signals workspace
    /// navigation. An unverified account yields
    /// [`LoginOutcome::VerificationRequired`] with the submitted email and
    /// no state change.
    ///
    /// # Errors
    ///
    /// Propagates the operation's [`Error`]; the state stays `Anonymous`.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, Error> {
        match self.api.login(email, password).await {
            Ok(LoginReply::Session { user, token }) => {
                self.establish(&token, user.clone())?;
                Ok(LoginOutcome::LoggedIn { user })
            }
            Ok(LoginReply::VerificationRequired) => {
                self.transition(SessionState::Anonymous);
                Ok(LoginOutcome::VerificationRequired {
                    email: email.to_owned(),
                })
            }
            Err(error) => {
                self.transition(SessionState::Anonymous);
                Err(error)
            }
        }
    }

    /// Register a new account. Success does not authenticate — the email
    /// must be verified first — so the state is untouched and the signal
    /// routes to the verification-pending view.
    ///
    /// # Errors
    ///
    /// Propagates the operation's [`Error`]; no state change.
    pub async fn register(&self, request: &RegisterRequest) -> Result<Navigation, Error> {
        let email = request.email.clone();
        self.api.register(request).await?;
        Ok(Navigation::VerificationPending { email })
    }

    /// Redeem an email-verification token. Success issues a credential and
    /// authenticates, same as a login.
    ///
    /// # Errors
    ///
    /// Propagates the operation's [`Error`]; no state change.
    pub async fn verify_email(&self, token: &str) -> Result<User, Error> {
        let reply = self.api.verify_email(token).await?;
        self.establish(&reply.token, reply.user.clone())?;
        Ok(reply.user)
    }

    /// Request a fresh verification email, for the verification prompt.
    ///
    /// # Errors
    ///
    /// Propagates the operation's [`Error`].
    pub async fn resend_verification(&self, email: &str) -> Result<Ack, Error> {
        self.api.resend_verification(email).await
    }

    /// Log out: clear the stored credential and return to `Anonymous`.
    ///
    /// Infallible, even with no active session; store failures are logged
    /// and swallowed.
    pub fn logout(&self) -> Navigation {
        if let Err(error) = self.store.clear() {
            tracing::error!(%error, "failed to clear credential store on logout");
        }
        self.transition(SessionState::Anonymous);
        Navigation::Landing
    }

    /// Best-effort backend warm-up via the health probe.
    ///
    /// Failures are expected while a cold backend spins up; they are logged
    /// at debug and never surfaced.
    pub async fn warm_up(&self) {
        match self.api.health().await {
            Ok(health) => tracing::debug!(status = %health.status, "backend awake"),
            Err(error) => tracing::debug!(%error, "backend warm-up probe failed"),
        }
    }

    fn establish(&self, token: &Token, user: User) -> Result<(), Error> {
        self.store.set(token)?;
        self.transition(SessionState::Authenticated(user));
        Ok(())
    }

    fn transition(&self, next: SessionState) -> SessionState {
        *self.state.lock() = next.clone();
        next
    }
}
