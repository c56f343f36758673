//! Bearer token state.

use chrono::{DateTime, Duration, Utc};

use crate::types::TokenGrant;

/// What the client must do before it can send an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenAction {
    /// The access token is usable.
    Ready(String),
    /// Exchange the refresh token for a new grant.
    Refresh(String),
    /// Log in with the user identifier and secret.
    Authenticate,
}

/// In-memory access and refresh tokens with their expiry instants.
#[derive(Debug, Default)]
pub(crate) struct TokenState {
    token_type: String,
    access_token: Option<String>,
    refresh_token: Option<String>,
    access_expires_at: Option<DateTime<Utc>>,
    refresh_expires_at: Option<DateTime<Utc>>,
}

/// 90% of a lifetime, so tokens are replaced before the vendor expires them.
fn shortened(seconds: i64) -> Duration {
    Duration::milliseconds(seconds.saturating_mul(900))
}

impl TokenState {
    /// Decide what to do at `now`.
    pub(crate) fn action(&self, now: DateTime<Utc>) -> TokenAction {
        if let (Some(token), Some(expires_at)) = (&self.access_token, self.access_expires_at) {
            if expires_at > now {
                return TokenAction::Ready(format!("{} {token}", self.token_type));
            }
        }

        match (&self.refresh_token, self.refresh_expires_at) {
            (Some(token), Some(expires_at)) if expires_at > now => {
                TokenAction::Refresh(token.clone())
            }
            _ => TokenAction::Authenticate,
        }
    }

    /// Store a fresh grant issued at `now`.
    pub(crate) fn update(&mut self, grant: TokenGrant, now: DateTime<Utc>) -> String {
        self.access_expires_at = Some(now + shortened(grant.expires_in));
        self.refresh_expires_at = Some(now + shortened(grant.refresh_expires_in));
        self.token_type = grant.token_type;
        self.refresh_token = Some(grant.refresh_token);
        let header = format!("{} {}", self.token_type, grant.access_token);
        self.access_token = Some(grant.access_token);
        header
    }

    /// Forget all tokens.
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}
