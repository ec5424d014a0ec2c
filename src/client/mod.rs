//! API client half: credential storage, the refresh-and-retry fetch wrapper,
//! and the fixed auth endpoints of the gateway.

pub mod api;
pub mod credentials;
pub mod fetch;
pub mod session;

pub use api::ApiClient;
pub use credentials::{
    CredentialStore, CredentialStoreState, Credentials, FileCredentialStore,
    MemoryCredentialStore,
};
pub use fetch::{ApiRequest, AuthenticatedClient};
pub use session::{CredentialService, CredentialServiceState};
