use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};

use super::schema::Database;

const TOKEN_KEY: &str = "session.token";
const EMAIL_KEY: &str = "session.email";

/// A persisted auth session: who is logged in and their bearer token.
///
/// The token lives in a `SecretString` so it is redacted from Debug output
/// and never logged by accident.
pub struct StoredSession {
    pub email: String,
    pub token: SecretString,
}

impl std::fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredSession")
            .field("email", &self.email)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl Database {
    // ========================================================================
    // Auth Session Operations
    // ========================================================================

    /// Store the session after a successful login or registration.
    pub async fn save_session(&self, email: &str, token: &SecretString) -> Result<()> {
        self.set_preference(EMAIL_KEY, email).await?;
        self.set_preference(TOKEN_KEY, token.expose_secret()).await?;
        Ok(())
    }

    /// Load the stored session, if both parts are present.
    pub async fn load_session(&self) -> Result<Option<StoredSession>> {
        let email = self.get_preference(EMAIL_KEY).await?;
        let token = self.get_preference(TOKEN_KEY).await?;

        Ok(match (email, token) {
            (Some(email), Some(token)) => Some(StoredSession {
                email,
                token: SecretString::from(token),
            }),
            _ => None,
        })
    }

    /// Logout: drop both session keys. No-op when not logged in.
    pub async fn clear_session(&self) -> Result<()> {
        self.delete_preference(TOKEN_KEY).await?;
        self.delete_preference(EMAIL_KEY).await?;
        Ok(())
    }
}
