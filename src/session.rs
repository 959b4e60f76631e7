//! Authentication collaborator: credentials in, opaque auth identity out.
//! The store resolves that identity to a staff profile through the remote
//! backend and holds at most one current user for the session.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AuthError;

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Verifies credentials and returns the opaque auth identity.
    async fn sign_in(&self, username: &str, password: &str) -> Result<String, AuthError>;
}

/// In-process authenticator with registered credentials, enough to stand in
/// for the hosted identity provider.
pub struct MemoryAuthenticator {
    accounts: Mutex<HashMap<String, Account>>,
}

struct Account {
    password: String,
    auth_id: String,
}

impl MemoryAuthenticator {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
        }
    }

    /// Registers credentials and returns the auth identity to link a staff
    /// profile against.
    pub fn register(&self, username: &str, password: &str) -> String {
        let auth_id = Uuid::new_v4().to_string();
        let account = Account {
            password: password.to_string(),
            auth_id: auth_id.clone(),
        };
        self.accounts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(username.to_string(), account);
        auth_id
    }
}

impl Default for MemoryAuthenticator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Authenticator for MemoryAuthenticator {
    async fn sign_in(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let accounts = self.accounts.lock().unwrap_or_else(|e| e.into_inner());
        match accounts.get(username) {
            Some(account) if account.password == password => Ok(account.auth_id.clone()),
            _ => Err(AuthError::InvalidCredentials(username.to_string())),
        }
    }
}
