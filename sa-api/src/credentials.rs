//! Credential resolution.
//!
//! Decides per request which authentication headers to attach. Endpoints
//! that require authentication fail here, before any network I/O, when a
//! credential is missing. Public endpoints get whatever credentials are
//! configured, attached opportunistically.

use std::fmt;

use tracing::warn;

use sa_core::constants::{API_KEY_HEADER, API_KEY_PREFIX, USER_ID_HEADER, USER_ID_PREFIX};
use sa_core::error::{SaError, SaResult};

/// API key and user id as configured on the client.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    api_key: Option<String>,
    user_id: Option<String>,
}

impl Credentials {
    /// Store the credentials. Values that are empty after trimming are
    /// treated as absent.
    pub fn new(api_key: Option<String>, user_id: Option<String>) -> Self {
        let clean = |v: Option<String>| {
            v.map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };
        let creds = Self {
            api_key: clean(api_key),
            user_id: clean(user_id),
        };

        if creds.api_key.as_deref().is_some_and(|k| !k.starts_with(API_KEY_PREFIX)) {
            warn!("API key does not start with {API_KEY_PREFIX}");
        }
        if creds.user_id.as_deref().is_some_and(|u| !u.starts_with(USER_ID_PREFIX)) {
            warn!("user id does not start with {USER_ID_PREFIX}");
        }
        creds
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Both credentials are present.
    pub fn is_complete(&self) -> bool {
        self.api_key.is_some() && self.user_id.is_some()
    }

    /// Produce the authentication headers for one request.
    ///
    /// With `requires_auth`, a missing API key or user id is an
    /// `Authentication` error naming the missing credential. Without it,
    /// each present credential is attached on its own. Credentials that
    /// cannot be carried in an HTTP header are rejected either way.
    pub fn resolve(&self, requires_auth: bool) -> SaResult<Vec<(String, String)>> {
        let mut headers = Vec::with_capacity(2);

        match &self.api_key {
            Some(key) => {
                ensure_header_safe(key, "API key")?;
                headers.push((API_KEY_HEADER.to_string(), key.clone()));
            }
            None if requires_auth => {
                return Err(SaError::missing_credential(
                    "API key is required for this operation",
                ));
            }
            None => {}
        }

        match &self.user_id {
            Some(user) => {
                ensure_header_safe(user, "User ID")?;
                headers.push((USER_ID_HEADER.to_string(), user.clone()));
            }
            None if requires_auth => {
                return Err(SaError::missing_credential(
                    "User ID is required for this operation",
                ));
            }
            None => {}
        }

        Ok(headers)
    }

    /// Replace every occurrence of a configured credential in `text` with
    /// its masked form. Short unprefixed values are left alone, since
    /// replacing them would rewrite unrelated words.
    pub fn redact(&self, text: &str) -> String {
        let mut out = text.to_string();
        for secret in [&self.api_key, &self.user_id].into_iter().flatten() {
            if is_redactable(secret) && out.contains(secret.as_str()) {
                out = out.replace(secret.as_str(), &mask(secret));
            }
        }
        out
    }

    /// Mask credential values in every text field of `err`.
    pub fn redact_error(&self, err: SaError) -> SaError {
        if self.api_key.is_none() && self.user_id.is_none() {
            return err;
        }
        err.map_text(|text| self.redact(text))
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key.as_deref().map(mask))
            .field("user_id", &self.user_id.as_deref().map(mask))
            .finish()
    }
}

/// Keep the conventional prefix, hide the secret part.
pub fn mask(secret: &str) -> String {
    for prefix in [API_KEY_PREFIX, USER_ID_PREFIX] {
        if secret.starts_with(prefix) {
            return format!("{prefix}****");
        }
    }
    "****".to_string()
}

/// Shortest unprefixed credential that is masked inside free text.
const MIN_REDACT_LEN: usize = 8;

fn is_redactable(secret: &str) -> bool {
    secret.starts_with(API_KEY_PREFIX)
        || secret.starts_with(USER_ID_PREFIX)
        || secret.len() >= MIN_REDACT_LEN
}

/// Header values must be visible ASCII.
fn ensure_header_safe(value: &str, label: &str) -> SaResult<()> {
    if value.bytes().all(|b| b.is_ascii_graphic()) {
        Ok(())
    } else {
        Err(SaError::missing_credential(format!(
            "{label} contains characters that cannot be sent in an HTTP header"
        )))
    }
}
