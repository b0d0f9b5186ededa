//! Installed-app authorization
//!
//! Runs when no usable credentials file exists yet. The user opens the
//! printed consent URL, Google redirects the browser to a one-shot listener
//! on `127.0.0.1`, and the authorization code is exchanged for tokens:
//!
//! ```text
//!   client_secret.json ──► consent URL (PKCE, state) ──► browser
//!                                                          │
//!   credentials.json ◄── token exchange ◄── loopback redirect (?code=..)
//! ```

use crate::drive::auth::{StoredCredentials, DEFAULT_TOKEN_URI};
use crate::drive::types::DRIVE_METADATA_SCOPE;
use crate::error::{AuthError, AuthResult};
use console::{style, Term};
use oauth2::basic::BasicClient;
use oauth2::url::Url;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge, RedirectUrl,
    Scope, TokenResponse, TokenUrl,
};
use serde::Deserialize;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Google OAuth 2.0 consent endpoint
pub const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";

const REDIRECT_REPLY: &str = "Authorization received. You can close this window.\n";

/// OAuth client registration, as downloaded from the Cloud console
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,

    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,

    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// The console wraps the registration in `installed` or `web`
#[derive(Debug, Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Read a `client_secret.json` file
    pub fn load(path: &Path) -> AuthResult<Self> {
        let invalid = |reason: String| AuthError::InvalidClientSecret {
            path: path.to_path_buf(),
            reason,
        };

        let raw = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let file: ClientSecretsFile =
            serde_json::from_str(&raw).map_err(|e| invalid(e.to_string()))?;

        file.installed
            .or(file.web)
            .ok_or_else(|| invalid("expected an 'installed' or 'web' section".to_string()))
    }
}

/// Ask the user for consent and return the resulting credentials
///
/// Blocks until the browser hits the loopback redirect.
pub fn authorize(secrets: &ClientSecrets, timeout: Duration) -> AuthResult<StoredCredentials> {
    let consent_err = |e: &dyn std::fmt::Display| AuthError::ConsentFailed(e.to_string());

    let listener = TcpListener::bind("127.0.0.1:0").map_err(|e| consent_err(&e))?;
    let port = listener.local_addr().map_err(|e| consent_err(&e))?.port();

    let client = BasicClient::new(ClientId::new(secrets.client_id.clone()))
        .set_client_secret(ClientSecret::new(secrets.client_secret.clone()))
        .set_auth_uri(AuthUrl::new(secrets.auth_uri.clone()).map_err(|e| consent_err(&e))?)
        .set_token_uri(TokenUrl::new(secrets.token_uri.clone()).map_err(|e| consent_err(&e))?)
        .set_redirect_uri(
            RedirectUrl::new(format!("http://127.0.0.1:{port}")).map_err(|e| consent_err(&e))?,
        );

    let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
    let (consent_url, state) = client
        .authorize_url(CsrfToken::new_random)
        .add_scope(Scope::new(DRIVE_METADATA_SCOPE.to_string()))
        // Ask for a refresh token so later runs need no browser
        .add_extra_param("access_type", "offline")
        .add_extra_param("prompt", "consent")
        .set_pkce_challenge(pkce_challenge)
        .url();

    let term = Term::stderr();
    let _ = term.write_line(&format!(
        "{} open this URL in a browser to grant read access to Drive metadata:",
        style("Authorization required:").yellow().bold()
    ));
    let _ = term.write_line(&format!("\n  {}\n", consent_url));

    let code = receive_code(&listener, state.secret())?;
    debug!("Received authorization code");

    let http = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| consent_err(&e))?;

    let token = client
        .exchange_code(AuthorizationCode::new(code))
        .set_pkce_verifier(pkce_verifier)
        .request(&http)
        .map_err(|e| consent_err(&e))?;

    info!("Authorization granted");
    Ok(StoredCredentials {
        client_id: Some(secrets.client_id.clone()),
        client_secret: Some(secrets.client_secret.clone()),
        refresh_token: token.refresh_token().map(|t| t.secret().clone()),
        access_token: Some(token.access_token().secret().clone()),
        token_uri: Some(secrets.token_uri.clone()),
        scopes: Some(vec![DRIVE_METADATA_SCOPE.to_string()]),
    })
}

/// Wait for the consent redirect and pull the code out of it
pub(crate) fn receive_code(listener: &TcpListener, expected_state: &str) -> AuthResult<String> {
    let (mut stream, _) = listener
        .accept()
        .map_err(|e| AuthError::ConsentFailed(e.to_string()))?;

    // Request line: GET /?state=..&code=.. HTTP/1.1
    let mut request_line = String::new();
    {
        let mut reader = BufReader::new(&stream);
        reader
            .read_line(&mut request_line)
            .map_err(|e| AuthError::ConsentFailed(e.to_string()))?;

        // Drain the headers so the reply is not cut off by a reset
        let mut header = String::new();
        loop {
            header.clear();
            match reader.read_line(&mut header) {
                Ok(0) | Err(_) => break,
                Ok(_) if header.trim().is_empty() => break,
                Ok(_) => {}
            }
        }
    }

    let target = request_line.split_whitespace().nth(1).unwrap_or("/");
    let url = Url::parse(&format!("http://127.0.0.1{target}"))
        .map_err(|e| AuthError::ConsentFailed(format!("bad redirect '{}': {}", target, e)))?;

    let _ = write!(
        stream,
        "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        REDIRECT_REPLY.len(),
        REDIRECT_REPLY
    );

    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    };

    if let Some(error) = param("error") {
        return Err(AuthError::ConsentFailed(format!("consent denied: {}", error)));
    }
    if param("state").as_deref() != Some(expected_state) {
        return Err(AuthError::ConsentFailed("state mismatch in redirect".to_string()));
    }
    param("code").ok_or_else(|| AuthError::ConsentFailed("redirect carried no code".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpStream;
    use std::thread;
    use tempfile::tempdir;

    /// Play the browser side of the redirect; returns the reply body
    fn redirect(listener: &TcpListener, target: &'static str) -> thread::JoinHandle<String> {
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            let request = format!("GET {target} HTTP/1.1\r\nHost: {addr}\r\n\r\n");
            stream.write_all(request.as_bytes()).unwrap();
            let mut reply = String::new();
            stream.read_to_string(&mut reply).unwrap();
            reply
        })
    }

    #[test]
    fn test_receive_code() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let browser = redirect(&listener, "/?state=s1&code=4%2F0Abc&scope=x");

        assert_eq!(receive_code(&listener, "s1").unwrap(), "4/0Abc");
        assert!(browser.join().unwrap().ends_with(REDIRECT_REPLY));
    }

    #[test]
    fn test_receive_code_state_mismatch() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let browser = redirect(&listener, "/?state=forged&code=abc");

        assert!(matches!(
            receive_code(&listener, "s1"),
            Err(AuthError::ConsentFailed(_))
        ));
        browser.join().unwrap();
    }

    #[test]
    fn test_receive_code_denied() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let browser = redirect(&listener, "/?error=access_denied&state=s1");

        match receive_code(&listener, "s1") {
            Err(AuthError::ConsentFailed(reason)) => assert!(reason.contains("access_denied")),
            other => panic!("unexpected result: {other:?}"),
        }
        browser.join().unwrap();
    }

    #[test]
    fn test_load_installed_client_secrets() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("client_secret.json");
        std::fs::write(
            &path,
            r#"{"installed": {
                "client_id": "id.apps.googleusercontent.com",
                "project_id": "perm-audit",
                "client_secret": "secret",
                "redirect_uris": ["http://localhost"]
            }}"#,
        )
        .unwrap();

        let secrets = ClientSecrets::load(&path).unwrap();
        assert_eq!(secrets.client_id, "id.apps.googleusercontent.com");
        assert_eq!(secrets.auth_uri, DEFAULT_AUTH_URI);
        assert_eq!(secrets.token_uri, DEFAULT_TOKEN_URI);
    }

    #[test]
    fn test_client_secrets_without_section() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("client_secret.json");
        std::fs::write(&path, r#"{"client_id": "id"}"#).unwrap();

        assert!(matches!(
            ClientSecrets::load(&path),
            Err(AuthError::InvalidClientSecret { .. })
        ));
    }
}
