//! Credential resolution
//!
//! Produces the bearer token the Drive client needs before the walk starts.
//! Tokens come from an explicit value or from a stored credentials file in
//! the authorized-user shape written by Google's client libraries:
//!
//! ```json
//! {
//!   "client_id": "...apps.googleusercontent.com",
//!   "client_secret": "...",
//!   "refresh_token": "1//...",
//!   "access_token": "ya29...",
//!   "token_uri": "https://oauth2.googleapis.com/token"
//! }
//! ```
//!
//! With a refresh token the access token is always exchanged fresh. When the
//! file is missing or unusable and an OAuth client secret is available, the
//! consent flow in [`crate::drive::consent`] runs and writes a new file.

use crate::drive::consent::{self, ClientSecrets};
use crate::drive::types::DRIVE_METADATA_SCOPE;
use crate::error::{AuthError, AuthResult};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Google OAuth 2.0 token endpoint
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Scopes under which `files.list` returns permissions
const LISTING_SCOPES: &[&str] = &[
    DRIVE_METADATA_SCOPE,
    "https://www.googleapis.com/auth/drive.metadata",
    "https://www.googleapis.com/auth/drive.readonly",
    "https://www.googleapis.com/auth/drive",
];

/// Contents of a stored credentials file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Last access token issued; may be expired
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,

    /// Scopes granted at consent time, when recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl StoredCredentials {
    /// Read and parse a credentials file
    pub fn load(path: &Path) -> AuthResult<Self> {
        if !path.exists() {
            return Err(AuthError::MissingCredentials {
                path: path.to_path_buf(),
            });
        }

        let raw = std::fs::read_to_string(path).map_err(|e| AuthError::InvalidCredentials {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&raw).map_err(|e| AuthError::InvalidCredentials {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Write the credentials in the same shape `load` reads
    pub fn save(&self, path: &Path) -> AuthResult<()> {
        let failed = |reason: String| AuthError::SaveFailed {
            path: path.to_path_buf(),
            reason,
        };

        let json = serde_json::to_string_pretty(self).map_err(|e| failed(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| failed(e.to_string()))
    }

    /// Check if these credentials can mint a new access token
    pub fn can_refresh(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some() && self.refresh_token.is_some()
    }

    /// Check if the recorded scopes allow listing permissions
    ///
    /// Files without a scope list are assumed to be fine.
    pub fn covers_listing(&self) -> bool {
        match &self.scopes {
            Some(scopes) => scopes.iter().any(|s| LISTING_SCOPES.contains(&s.as_str())),
            None => true,
        }
    }

    /// Obtain a usable access token, refreshing when possible
    pub fn access_token(&self, timeout: Duration) -> AuthResult<String> {
        if !self.covers_listing() {
            warn!(
                "Stored credentials were not granted {}; listings may fail",
                DRIVE_METADATA_SCOPE
            );
        }

        if let (Some(id), Some(secret), Some(refresh)) =
            (&self.client_id, &self.client_secret, &self.refresh_token)
        {
            let token_uri = self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI);
            return refresh_access_token(token_uri, id, secret, refresh, timeout);
        }

        debug!("No refresh token stored, using saved access token");
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .ok_or(AuthError::NoToken)
    }
}

/// Resolve the access token for this run
///
/// An explicit token wins; otherwise the credentials file is used. If that
/// fails and `client_secret_path` exists, the user is asked to authorize and
/// the new credentials are saved to `credentials_path`.
pub fn resolve_access_token(
    explicit: Option<&str>,
    credentials_path: &Path,
    client_secret_path: &Path,
    timeout: Duration,
) -> AuthResult<String> {
    if let Some(token) = explicit.map(str::trim).filter(|t| !t.is_empty()) {
        debug!("Using access token supplied on the command line");
        return Ok(token.to_string());
    }

    info!("Loading credentials from {}", credentials_path.display());
    let stored =
        StoredCredentials::load(credentials_path).and_then(|creds| creds.access_token(timeout));

    match stored {
        Ok(token) => Ok(token),
        Err(e) if client_secret_path.exists() => {
            warn!("{}; requesting authorization", e);
            let secrets = ClientSecrets::load(client_secret_path)?;
            let creds = consent::authorize(&secrets, timeout)?;
            creds.save(credentials_path)?;
            info!("Saved credentials to {}", credentials_path.display());
            creds.access_token.ok_or(AuthError::NoToken)
        }
        Err(e) => Err(e),
    }
}

fn refresh_access_token(
    token_uri: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
    timeout: Duration,
) -> AuthResult<String> {
    let client = Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| AuthError::RefreshFailed(e.to_string()))?;

    let response = client
        .post(token_uri)
        .form(&[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .send()
        .map_err(|e| AuthError::RefreshFailed(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(AuthError::RefreshFailed(format!(
            "HTTP {}: {}",
            status.as_u16(),
            body.trim()
        )));
    }

    let token: TokenResponse = response
        .json()
        .map_err(|e| AuthError::RefreshFailed(e.to_string()))?;

    info!("Refreshed access token");
    Ok(token.access_token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_explicit_token_wins() {
        let token = resolve_access_token(
            Some("  ya29.explicit "),
            Path::new("/nonexistent/credentials.json"),
            Path::new("/nonexistent/client_secret.json"),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(token, "ya29.explicit");
    }

    #[test]
    fn test_missing_credentials_file() {
        let err = resolve_access_token(
            None,
            Path::new("/nonexistent/credentials.json"),
            Path::new("/nonexistent/client_secret.json"),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials { .. }));
    }

    #[test]
    fn test_blank_explicit_token_falls_back_to_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, r#"{"access_token": "ya29.stored"}"#).unwrap();

        let token = resolve_access_token(
            Some("   "),
            &path,
            Path::new("/nonexistent/client_secret.json"),
            Duration::from_secs(1),
        ).unwrap();
        assert_eq!(token, "ya29.stored");
    }

    #[test]
    fn test_load_authorized_user_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(
            &path,
            r#"{
                "_module": "oauth2client.client",
                "client_id": "id.apps.googleusercontent.com",
                "client_secret": "secret",
                "refresh_token": "1//refresh",
                "access_token": "ya29.old",
                "token_expiry": "2020-01-01T00:00:00Z",
                "token_uri": "https://oauth2.googleapis.com/token"
            }"#,
        )
        .unwrap();

        let creds = StoredCredentials::load(&path).unwrap();
        assert!(creds.can_refresh());
        assert!(creds.covers_listing());
        assert_eq!(creds.refresh_token.as_deref(), Some("1//refresh"));
    }

    #[test]
    fn test_scope_check() {
        let mut creds = StoredCredentials {
            scopes: Some(vec![DRIVE_METADATA_SCOPE.to_string()]),
            ..Default::default()
        };
        assert!(creds.covers_listing());

        creds.scopes = Some(vec!["https://www.googleapis.com/auth/calendar".to_string()]);
        assert!(!creds.covers_listing());
    }

    #[test]
    fn test_no_token_available() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, r#"{"client_id": "id"}"#).unwrap();

        let creds = StoredCredentials::load(&path).unwrap();
        assert!(!creds.can_refresh());
        assert!(matches!(
            creds.access_token(Duration::from_secs(1)),
            Err(AuthError::NoToken)
        ));
    }

    #[test]
    fn test_unusable_credentials_fall_back_to_client_secret() {
        let dir = tempdir().unwrap();
        let creds = dir.path().join("credentials.json");
        let secret = dir.path().join("client_secret.json");
        fs::write(&creds, "not json").unwrap();
        fs::write(&secret, r#"{"other": {}}"#).unwrap();

        let err = resolve_access_token(None, &creds, &secret, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, AuthError::InvalidClientSecret { .. }));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let creds = StoredCredentials {
            client_id: Some("id.apps.googleusercontent.com".into()),
            client_secret: Some("secret".into()),
            refresh_token: Some("1//refresh".into()),
            access_token: Some("ya29.fresh".into()),
            token_uri: Some(DEFAULT_TOKEN_URI.into()),
            scopes: Some(vec![DRIVE_METADATA_SCOPE.into()]),
        };

        creds.save(&path).unwrap();
        assert_eq!(StoredCredentials::load(&path).unwrap(), creds);

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"refresh_token\": \"1//refresh\""));
    }

    #[test]
    fn test_saved_access_token_used_without_refresh() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        StoredCredentials {
            access_token: Some("ya29.saved".into()),
            ..Default::default()
        }
        .save(&path)
        .unwrap();

        let token = resolve_access_token(
            None,
            &path,
            Path::new("/nonexistent/client_secret.json"),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(token, "ya29.saved");
        assert!(!fs::read_to_string(&path).unwrap().contains("client_id"));
    }

    #[test]
    fn test_invalid_credentials_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, "not json").unwrap();

        assert!(matches!(
            StoredCredentials::load(&path),
            Err(AuthError::InvalidCredentials { .. })
        ));
    }
}
