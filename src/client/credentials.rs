use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{
    io::ErrorKind,
    path::PathBuf,
    sync::Arc,
};
use tokio::sync::{Mutex, RwLock};

use crate::error::ClientError;

/// Credentials
///
/// Snapshot of the credential store. Field names double as the persistent keys
/// (`access_token`, `refresh_token`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }

    /// Treats empty stored values as absent.
    pub fn non_empty(self) -> Self {
        Self {
            access_token: self.access_token.filter(|t| !t.is_empty()),
            refresh_token: self.refresh_token.filter(|t| !t.is_empty()),
        }
    }
}

/// CredentialStore
///
/// Contract for the persistent storage holding at most one access token and one
/// refresh token. Only `CredentialService` talks to a store directly.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Reads both credentials. An empty store is not an error.
    async fn load(&self) -> Result<Credentials, ClientError>;

    /// Replaces the access token, leaving the refresh token untouched.
    async fn save_access_token(&self, token: &str) -> Result<(), ClientError>;

    /// Forgets both credentials.
    async fn clear(&self) -> Result<(), ClientError>;
}

/// Shared handle to a credential store.
pub type CredentialStoreState = Arc<dyn CredentialStore>;

/// MemoryCredentialStore
///
/// Process-local store. Used by tests and by embedders that manage persistence
/// themselves.
#[derive(Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Credentials>,
}

impl MemoryCredentialStore {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            inner: RwLock::new(credentials),
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Credentials, ClientError> {
        Ok(self.inner.read().await.clone())
    }

    async fn save_access_token(&self, token: &str) -> Result<(), ClientError> {
        self.inner.write().await.access_token = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        *self.inner.write().await = Credentials::default();
        Ok(())
    }
}

/// FileCredentialStore
///
/// Keeps the credentials as a small JSON document on disk, the native
/// counterpart of browser local storage. A missing file reads as an empty store.
pub struct FileCredentialStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read(&self) -> Result<Credentials, ClientError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(Credentials::default()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Credentials::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, credentials: &Credentials) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let bytes = serde_json::to_vec_pretty(credentials)?;
        tokio::fs::write(&self.path, bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Credentials, ClientError> {
        self.read().await
    }

    async fn save_access_token(&self, token: &str) -> Result<(), ClientError> {
        let _guard = self.write_lock.lock().await;
        let mut credentials = self.read().await?;
        credentials.access_token = Some(token.to_string());
        self.write(&credentials).await
    }

    async fn clear(&self) -> Result<(), ClientError> {
        let _guard = self.write_lock.lock().await;
        self.write(&Credentials::default()).await
    }
}
