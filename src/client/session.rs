use std::{future::Future, sync::Arc};
use tokio::sync::Mutex;

use super::credentials::{CredentialStoreState, Credentials};
use crate::error::ClientError;

/// CredentialService
///
/// The single access point to the credential store. Besides plain reads it owns
/// the refresh gate: at most one refresh exchange is in flight per service, and
/// callers that were rejected with a token somebody else already replaced pick
/// up the replacement instead of refreshing again.
pub struct CredentialService {
    store: CredentialStoreState,
    refresh_gate: Mutex<()>,
}

/// Shared handle, cloned into every client that sends authenticated requests.
pub type CredentialServiceState = Arc<CredentialService>;

impl CredentialService {
    pub fn new(store: CredentialStoreState) -> Self {
        Self {
            store,
            refresh_gate: Mutex::new(()),
        }
    }

    /// Current access and refresh tokens. Empty stored values read as absent.
    pub async fn current(&self) -> Result<Credentials, ClientError> {
        Ok(self.store.load().await?.non_empty())
    }

    /// renew
    ///
    /// Obtains a replacement for `stale`, the access token the server just
    /// rejected (`None` if the request went out unauthenticated).
    ///
    /// `exchange` receives the stored refresh token and returns the new access
    /// token, or `None` when the refresh was refused. A new token is persisted
    /// before this returns, so a retry issued afterwards always carries it.
    pub async fn renew<F, Fut>(
        &self,
        stale: Option<&str>,
        exchange: F,
    ) -> Result<Option<String>, ClientError>
    where
        F: FnOnce(Option<String>) -> Fut,
        Fut: Future<Output = Result<Option<String>, ClientError>>,
    {
        let _gate = self.refresh_gate.lock().await;

        let credentials = self.current().await?;
        if let Some(current) = credentials.access_token.as_deref() {
            if Some(current) != stale {
                tracing::debug!("access token already renewed by a concurrent request");
                return Ok(Some(current.to_string()));
            }
        }

        let renewed = exchange(credentials.refresh_token).await?;
        if let Some(token) = &renewed {
            self.store.save_access_token(token).await?;
            tracing::info!("access token renewed");
        }

        Ok(renewed)
    }

    /// Drops both credentials, e.g. after a successful logout.
    pub async fn clear(&self) -> Result<(), ClientError> {
        self.store.clear().await
    }
}
