use std::collections::HashMap;

use super::super::domain::Identity;

/// Credential check supplied by the authentication collaborator.
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, credential: &str) -> Result<Identity, AuthError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("credential missing")]
    Missing,
    #[error("credential rejected")]
    Invalid,
}

/// Fixed token table, for local runs and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, Identity>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, token: impl Into<String>, identity: Identity) -> Self {
        self.tokens.insert(token.into(), identity);
        self
    }
}

impl IdentityVerifier for StaticTokenVerifier {
    fn verify(&self, credential: &str) -> Result<Identity, AuthError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(AuthError::Missing);
        }
        self.tokens.get(credential).cloned().ok_or(AuthError::Invalid)
    }
}
