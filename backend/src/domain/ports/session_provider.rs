//! Port for resolving the signed-in user.

use async_trait::async_trait;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by session provider adapters.
    pub enum SessionProviderError {
        /// The auth service could not be reached.
        Connection { message: String } =>
            "session provider connection failed: {message}",
        /// The auth service returned something unusable.
        Invalid { message: String } =>
            "session provider returned an invalid response: {message}",
    }
}

/// Port onto the external auth collaborator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The signed-in user, or `None` when nobody is signed in.
    async fn current_user(&self) -> Result<Option<UserId>, SessionProviderError>;
}

/// Fixture provider that always reports the same user.
#[derive(Debug, Default, Clone)]
pub struct FixedSessionProvider {
    user_id: Option<UserId>,
}

impl FixedSessionProvider {
    /// A provider reporting `user_id`.
    pub const fn new(user_id: Option<UserId>) -> Self {
        Self { user_id }
    }
}

#[async_trait]
impl SessionProvider for FixedSessionProvider {
    async fn current_user(&self) -> Result<Option<UserId>, SessionProviderError> {
        Ok(self.user_id.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixed_provider_reports_configured_user() {
        let user_id = UserId::random();
        let provider = FixedSessionProvider::new(Some(user_id.clone()));

        let current = provider.current_user().await.expect("fixture never fails");
        assert_eq!(current, Some(user_id));
    }

    #[tokio::test]
    async fn default_provider_is_anonymous() {
        let current = FixedSessionProvider::default()
            .current_user()
            .await
            .expect("fixture never fails");
        assert!(current.is_none());
    }
}
