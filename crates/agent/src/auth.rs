use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use leadline_core::UserProfile;

/// Credential-issuance seam: exchanges credentials for a session profile.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, email: &str, password: &str) -> Result<UserProfile>;
}

/// Local stand-in for an identity provider: any non-empty credentials
/// succeed after a fixed delay, and the profile is minted from the email
/// local part.
pub struct LocalAuthenticator {
    delay: Duration,
}

impl LocalAuthenticator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn from_delay_ms(delay_ms: u64) -> Self {
        Self::new(Duration::from_millis(delay_ms))
    }
}

#[async_trait]
impl Authenticator for LocalAuthenticator {
    async fn authenticate(&self, email: &str, password: &str) -> Result<UserProfile> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            bail!("email and password are required");
        }

        tokio::time::sleep(self.delay).await;
        Ok(UserProfile::from_email(email))
    }
}
