use std::path::PathBuf;

use chrono::{Duration, Utc};
use reqwest::Client;
use tracing::{debug, info};

use shared_config::AppConfig;

use crate::models::{CachedToken, CalendarError, ClientSecrets, TokenGrant};

// If modifying the scope, delete the cached token file.
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar.events";

// Refresh slightly early so a token never expires mid-batch.
const EXPIRY_MARGIN_SECONDS: i64 = 60;

/// Local OAuth credential cache: the client secret lives in
/// `credentials.json`, the user token in `token.json`, both in the working
/// directory unless configured otherwise.
pub struct TokenStore {
    credentials_path: PathBuf,
    token_path: PathBuf,
    http_client: Client,
}

impl TokenStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            credentials_path: PathBuf::from(&config.google_credentials_path),
            token_path: PathBuf::from(&config.google_token_path),
            http_client: Client::new(),
        }
    }

    /// A missing secrets file is a terminal setup error; nothing network-side
    /// happens before this check.
    pub fn load_secrets(&self) -> Result<ClientSecrets, CalendarError> {
        if !self.credentials_path.exists() {
            return Err(CalendarError::MissingCredentials(
                self.credentials_path.display().to_string(),
            ));
        }

        let raw = std::fs::read_to_string(&self.credentials_path)
            .map_err(|e| CalendarError::TokenCache(e.to_string()))?;
        serde_json::from_str(&raw).map_err(|e| CalendarError::TokenCache(e.to_string()))
    }

    fn load_cached(&self) -> Result<Option<CachedToken>, CalendarError> {
        if !self.token_path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(&self.token_path)
            .map_err(|e| CalendarError::TokenCache(e.to_string()))?;
        let token = serde_json::from_str(&raw)
            .map_err(|e| CalendarError::TokenCache(e.to_string()))?;
        Ok(Some(token))
    }

    fn store_token(&self, token: &CachedToken) -> Result<(), CalendarError> {
        let raw = serde_json::to_string_pretty(token)
            .map_err(|e| CalendarError::TokenCache(e.to_string()))?;
        std::fs::write(&self.token_path, raw)
            .map_err(|e| CalendarError::TokenCache(e.to_string()))
    }

    /// Returns a usable access token: the cached one if still valid, a
    /// refreshed one (rewriting the cache) if expired, or an error telling
    /// the user to authorize first.
    pub async fn access_token(&self) -> Result<String, CalendarError> {
        let secrets = self.load_secrets()?;

        match self.load_cached()? {
            Some(token) if !token.is_expired(Utc::now()) => {
                debug!("Using cached calendar token");
                Ok(token.access_token)
            }
            Some(token) => match token.refresh_token {
                Some(refresh_token) => self.refresh(&secrets, refresh_token).await,
                None => Err(CalendarError::NotAuthorized),
            },
            None => Err(CalendarError::NotAuthorized),
        }
    }

    async fn refresh(
        &self,
        secrets: &ClientSecrets,
        refresh_token: String,
    ) -> Result<String, CalendarError> {
        debug!("Refreshing expired calendar token");

        let params = [
            ("client_id", secrets.installed.client_id.as_str()),
            ("client_secret", secrets.installed.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http_client
            .post(&secrets.installed.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| CalendarError::TokenRefresh(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unreadable error body".to_string());
            return Err(CalendarError::TokenRefresh(error_text));
        }

        let grant: TokenGrant = response
            .json()
            .await
            .map_err(|e| CalendarError::TokenRefresh(e.to_string()))?;

        let token = CachedToken {
            access_token: grant.access_token.clone(),
            // Google omits the refresh token on refresh grants; keep the old one
            refresh_token: grant.refresh_token.or(Some(refresh_token)),
            expiry: Some(
                Utc::now() + Duration::seconds(grant.expires_in - EXPIRY_MARGIN_SECONDS),
            ),
        };
        self.store_token(&token)?;

        Ok(token.access_token)
    }

    /// Consent URL the user opens in a browser to authorize calendar access.
    pub fn authorization_url(&self, redirect_uri: &str) -> Result<String, CalendarError> {
        let secrets = self.load_secrets()?;

        Ok(format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            secrets.installed.auth_uri,
            urlencoding::encode(&secrets.installed.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(CALENDAR_SCOPE),
        ))
    }

    /// Trades the authorization code for a token and seeds the cache.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<(), CalendarError> {
        let secrets = self.load_secrets()?;

        let params = [
            ("client_id", secrets.installed.client_id.as_str()),
            ("client_secret", secrets.installed.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http_client
            .post(&secrets.installed.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| CalendarError::TokenRefresh(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "unreadable error body".to_string());
            return Err(CalendarError::TokenRefresh(error_text));
        }

        let grant: TokenGrant = response
            .json()
            .await
            .map_err(|e| CalendarError::TokenRefresh(e.to_string()))?;

        let token = CachedToken {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expiry: Some(
                Utc::now() + Duration::seconds(grant.expires_in - EXPIRY_MARGIN_SECONDS),
            ),
        };
        self.store_token(&token)?;

        info!("Calendar authorization complete, token cached");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn token_expiry_checks() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();

        let fresh = CachedToken {
            access_token: "t".to_string(),
            refresh_token: None,
            expiry: Some(now + Duration::hours(1)),
        };
        assert!(!fresh.is_expired(now));

        let stale = CachedToken {
            access_token: "t".to_string(),
            refresh_token: None,
            expiry: Some(now - Duration::seconds(1)),
        };
        assert!(stale.is_expired(now));

        let unknown = CachedToken {
            access_token: "t".to_string(),
            refresh_token: None,
            expiry: None,
        };
        assert!(unknown.is_expired(now));
    }
}
