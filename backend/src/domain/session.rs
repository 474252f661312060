//! Explicit session context for write operations.
//!
//! Services never look the current user up on their own. Callers resolve the
//! session once through a [`SessionProvider`](super::ports::SessionProvider)
//! and pass it into every write, so tests can hand in any user they like.

use tracing::warn;

use super::ports::{SessionProvider, SessionProviderError};
use super::{Error, UserId};

/// The acting user for an interaction, if one is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    user_id: Option<UserId>,
}

impl Session {
    /// A session for a signed-in user.
    pub const fn authenticated(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    /// A session with nobody signed in.
    pub const fn anonymous() -> Self {
        Self { user_id: None }
    }

    /// The signed-in user, if any.
    pub const fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    /// The signed-in user, or a `NotAuthenticated` error.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorCode::NotAuthenticated`](super::ErrorCode::NotAuthenticated)
    /// for anonymous sessions.
    pub fn require_user(&self) -> Result<&UserId, Error> {
        self.user_id
            .as_ref()
            .ok_or_else(|| Error::not_authenticated("user not authenticated"))
    }
}

impl From<Option<UserId>> for Session {
    fn from(user_id: Option<UserId>) -> Self {
        Self { user_id }
    }
}

/// Resolve the acting user once through `provider`.
///
/// # Errors
///
/// Returns [`ErrorCode::BackendError`](super::ErrorCode::BackendError) when the
/// auth collaborator cannot be reached or answers with garbage.
pub async fn resolve_session<P>(provider: &P) -> Result<Session, Error>
where
    P: SessionProvider + ?Sized,
{
    provider
        .current_user()
        .await
        .map(Session::from)
        .map_err(|error| {
            warn!(%error, "failed to resolve current user");
            match error {
                SessionProviderError::Connection { message } => {
                    Error::backend(format!("auth service unavailable: {message}"))
                }
                SessionProviderError::Invalid { message } => {
                    Error::backend(format!("auth service returned an invalid user: {message}"))
                }
            }
        })
}
