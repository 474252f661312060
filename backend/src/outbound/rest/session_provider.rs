//! `SessionProvider` backed by the store's auth user endpoint.

use async_trait::async_trait;

use super::client::{RestClient, RestError};
use crate::domain::UserId;
use crate::domain::ports::{SessionProvider, SessionProviderError};

/// Resolves the user owning the configured access token.
#[derive(Debug, Clone)]
pub struct RestSessionProvider {
    client: RestClient,
}

impl RestSessionProvider {
    /// Create a provider using the shared client.
    pub const fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SessionProvider for RestSessionProvider {
    async fn current_user(&self) -> Result<Option<UserId>, SessionProviderError> {
        let raw = self.client.current_user_id().await.map_err(|error| match error {
            RestError::Transport { message } | RestError::Timeout { message } => {
                SessionProviderError::connection(message)
            }
            other => SessionProviderError::invalid(other.to_string()),
        })?;
        raw.map(|id| {
            UserId::new(&id).map_err(|error| SessionProviderError::invalid(error.to_string()))
        })
        .transpose()
    }
}
