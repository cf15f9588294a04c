//! Persisted OAuth session: token storage, expiry and refresh.
//!
//! The session lives in ~/.config/gcal/session.toml and is loaded once per
//! process. An expired access token is refreshed transparently on load; a
//! missing session means the user has to run `gcal auth` first.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::config::{base_dir, Credentials};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

pub struct Session {
    data: SessionData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Token endpoint response for both the auth-code and refresh grants.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: i64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl Session {
    pub fn new(data: SessionData) -> Self {
        Session { data }
    }

    /// Build session data from a token endpoint response.
    pub fn from_token_response(tokens: TokenResponse) -> Self {
        Session {
            data: SessionData {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token.unwrap_or_default(),
                expires_at: Utc::now() + Duration::seconds(tokens.expires_in),
            },
        }
    }

    pub fn access_token(&self) -> &str {
        &self.data.access_token
    }

    fn path() -> Result<PathBuf> {
        Ok(base_dir()?.join("session.toml"))
    }

    /// Load the stored session, refreshing it first if it has expired.
    pub async fn load_valid(creds: &Credentials) -> Result<Self> {
        let mut session = Self::load()?;

        if session.is_expired() {
            session.refresh(creds).await?;
            session.save()?;
        }

        Ok(session)
    }

    fn load() -> Result<Self> {
        let path = Self::path()?;

        if !path.exists() {
            anyhow::bail!("No stored session found. Run `gcal auth` first.");
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read session from {}", path.display()))?;

        let data: SessionData = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse session from {}", path.display()))?;

        Ok(Session { data })
    }

    pub fn save(&self) -> Result<()> {
        let contents = toml::to_string_pretty(&self.data).context("Failed to serialize session")?;

        let path = Self::path()?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write session to {}", path.display()))?;

        // Owner-only (0600) since the file contains OAuth tokens:
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
        }

        Ok(())
    }

    fn is_expired(&self) -> bool {
        Utc::now() >= self.data.expires_at
    }

    async fn refresh(&mut self, creds: &Credentials) -> Result<()> {
        tracing::info!("access token expired, refreshing");

        let client = reqwest::Client::new();
        let response = client
            .post(TOKEN_URL)
            .form(&[
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret.as_str()),
                ("refresh_token", self.data.refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .context("Failed to send token refresh request")?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Failed to refresh access token: {}", error_text);
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .context("Failed to parse token refresh response")?;

        self.data.access_token = tokens.access_token;
        self.data.expires_at = Utc::now() + Duration::seconds(tokens.expires_in);

        // Google usually omits the refresh token on refresh; keep the old one.
        if let Some(refresh_token) = tokens.refresh_token {
            self.data.refresh_token = refresh_token;
        }

        Ok(())
    }
}

/// Exchange an authorization code for tokens. Used by `gcal auth`.
pub async fn exchange_code(creds: &Credentials, code: &str, redirect_uri: &str) -> Result<Session> {
    let client = reqwest::Client::new();
    let response = client
        .post(TOKEN_URL)
        .form(&[
            ("client_id", creds.client_id.as_str()),
            ("client_secret", creds.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ])
        .send()
        .await
        .context("Failed to exchange authorization code for tokens")?;

    if !response.status().is_success() {
        let error_text = response.text().await.unwrap_or_default();
        anyhow::bail!("Token exchange failed: {}", error_text);
    }

    let tokens: TokenResponse = response
        .json()
        .await
        .context("Failed to parse token exchange response")?;

    Ok(Session::from_token_response(tokens))
}
