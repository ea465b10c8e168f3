use crate::configuration::AdminSettings;
use sha2::{Digest, Sha256};

/// Decides whether a presented username/password pair is the administrator.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// A single admin identity taken from configuration. Only a digest of the
/// password is kept in memory.
pub struct StaticCredentials {
    username: String,
    password_digest: [u8; 32],
}

impl StaticCredentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password_digest: Sha256::digest(password.as_bytes()).into(),
        }
    }
}

impl From<&AdminSettings> for StaticCredentials {
    fn from(settings: &AdminSettings) -> Self {
        Self::new(&settings.username, &settings.password)
    }
}

impl CredentialVerifier for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        let digest: [u8; 32] = Sha256::digest(password.as_bytes()).into();
        !self.username.is_empty() && self.username == username && self.password_digest == digest
    }
}
