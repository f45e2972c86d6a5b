//! Per-provider identity exchange backends
//!
//! Each backend knows two things: how to build the provider's authorization
//! redirect URL, and how to turn a callback code into a verified
//! [`ProviderProfile`] (code -> access token -> profile document). The
//! handshake cryptography itself lives with the provider; this module only
//! drives the two HTTP legs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::form_urlencoded;

use crate::config::ProviderConfig;
use crate::error::AuthError;
use crate::oauth::profile::ProviderProfile;
use crate::AuthResult;

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

const GITHUB_AUTHORIZE_URL: &str = "https://github.com/login/oauth/authorize";
const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_USER_URL: &str = "https://api.github.com/user";
const GITHUB_EMAILS_URL: &str = "https://api.github.com/user/emails";

const FACEBOOK_AUTHORIZE_URL: &str = "https://www.facebook.com/v12.0/dialog/oauth";
const FACEBOOK_TOKEN_URL: &str = "https://graph.facebook.com/v12.0/oauth/access_token";
const FACEBOOK_USERINFO_URL: &str = "https://graph.facebook.com/me";

const DISCORD_AUTHORIZE_URL: &str = "https://discord.com/api/oauth2/authorize";
const DISCORD_TOKEN_URL: &str = "https://discord.com/api/oauth2/token";
const DISCORD_USER_URL: &str = "https://discord.com/api/users/@me";

const USER_AGENT: &str = concat!("tollgate/", env!("CARGO_PKG_VERSION"));

/// A provider's two-legged identity exchange
#[async_trait]
pub trait IdentityExchange: Send + Sync {
    /// Provider name this backend serves
    fn provider(&self) -> &'static str;

    /// Authorization redirect URL for the login leg
    fn authorization_url(&self, state: &str) -> String;

    /// Exchange a callback code for the verified profile
    async fn exchange_code(&self, code: &str) -> AuthResult<ProviderProfile>;
}

fn query_string(params: &[(&str, &str)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

fn exchange_failed(stage: &str, err: impl std::fmt::Display) -> AuthError {
    tracing::warn!(stage = stage, error = %err, "identity exchange failed");
    AuthError::handshake(format!("{}: {}", stage, err))
}

fn raw_of<T: Serialize>(document: &T) -> Map<String, Value> {
    match serde_json::to_value(document) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AccessTokenResponse {
    access_token: String,
}

/// Google identity exchange
pub struct GoogleExchange {
    client_id: String,
    client_secret: String,
    callback_url: String,
    scopes: Vec<String>,
    http: reqwest::Client,
}

#[derive(Debug, Serialize, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

impl GoogleExchange {
    pub fn new(config: &ProviderConfig, http: reqwest::Client) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            callback_url: config.callback_url.clone(),
            scopes: config
                .scopes
                .clone()
                .unwrap_or_else(|| vec!["openid".into(), "email".into(), "profile".into()]),
            http,
        }
    }
}

#[async_trait]
impl IdentityExchange for GoogleExchange {
    fn provider(&self) -> &'static str {
        "google"
    }

    fn authorization_url(&self, state: &str) -> String {
        let scope = self.scopes.join(" ");
        let query = query_string(&[
            ("client_id", &self.client_id),
            ("redirect_uri", &self.callback_url),
            ("response_type", "code"),
            ("scope", &scope),
            ("state", state),
            ("access_type", "offline"),
        ]);
        format!("{}?{}", GOOGLE_AUTHORIZE_URL, query)
    }

    async fn exchange_code(&self, code: &str) -> AuthResult<ProviderProfile> {
        let token: AccessTokenResponse = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.callback_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| exchange_failed("google code exchange", e))?
            .json()
            .await
            .map_err(|e| exchange_failed("google token response", e))?;

        let user: GoogleUserInfo = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| exchange_failed("google profile fetch", e))?
            .json()
            .await
            .map_err(|e| exchange_failed("google profile response", e))?;

        let mut profile = ProviderProfile::new(user.sub.clone()).with_raw(raw_of(&user));
        if let Some(name) = user.name {
            profile = profile.with_display_name(name);
        }
        if let Some(email) = user.email {
            profile = profile.with_email(email);
        }
        Ok(profile)
    }
}

/// GitHub identity exchange
pub struct GitHubExchange {
    client_id: String,
    client_secret: String,
    callback_url: String,
    scopes: Vec<String>,
    http: reqwest::Client,
}

#[derive(Debug, Serialize, Deserialize)]
struct GitHubUserInfo {
    id: i64,
    login: String,
    name: Option<String>,
    email: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GitHubEmail {
    email: String,
    primary: bool,
}

impl GitHubExchange {
    pub fn new(config: &ProviderConfig, http: reqwest::Client) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            callback_url: config.callback_url.clone(),
            scopes: config
                .scopes
                .clone()
                .unwrap_or_else(|| vec!["user:email".into(), "read:user".into()]),
            http,
        }
    }
}

#[async_trait]
impl IdentityExchange for GitHubExchange {
    fn provider(&self) -> &'static str {
        "github"
    }

    fn authorization_url(&self, state: &str) -> String {
        let scope = self.scopes.join(" ");
        let query = query_string(&[
            ("client_id", &self.client_id),
            ("redirect_uri", &self.callback_url),
            ("scope", &scope),
            ("state", state),
        ]);
        format!("{}?{}", GITHUB_AUTHORIZE_URL, query)
    }

    async fn exchange_code(&self, code: &str) -> AuthResult<ProviderProfile> {
        let token: AccessTokenResponse = self
            .http
            .post(GITHUB_TOKEN_URL)
            .header("Accept", "application/json")
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.callback_url.as_str()),
            ])
            .send()
            .await
            .map_err(|e| exchange_failed("github code exchange", e))?
            .json()
            .await
            .map_err(|e| exchange_failed("github token response", e))?;

        let user: GitHubUserInfo = self
            .http
            .get(GITHUB_USER_URL)
            .header("User-Agent", USER_AGENT)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| exchange_failed("github profile fetch", e))?
            .json()
            .await
            .map_err(|e| exchange_failed("github profile response", e))?;

        // GitHub may omit the email on the user document; fall back to the
        // primary address from the emails endpoint
        let email = match &user.email {
            Some(email) => Some(email.clone()),
            None => {
                let emails: Vec<GitHubEmail> = self
                    .http
                    .get(GITHUB_EMAILS_URL)
                    .header("User-Agent", USER_AGENT)
                    .bearer_auth(&token.access_token)
                    .send()
                    .await
                    .map_err(|e| exchange_failed("github emails fetch", e))?
                    .json()
                    .await
                    .map_err(|e| exchange_failed("github emails response", e))?;
                emails.into_iter().find(|e| e.primary).map(|e| e.email)
            }
        };

        let display_name = user.name.clone().unwrap_or_else(|| user.login.clone());
        let mut profile = ProviderProfile::new(user.id.to_string())
            .with_username(user.login.clone())
            .with_display_name(display_name)
            .with_raw(raw_of(&user));
        if let Some(email) = email {
            profile = profile.with_email(email);
        }
        Ok(profile)
    }
}

/// Facebook identity exchange
pub struct FacebookExchange {
    client_id: String,
    client_secret: String,
    callback_url: String,
    scopes: Vec<String>,
    http: reqwest::Client,
}

#[derive(Debug, Serialize, Deserialize)]
struct FacebookUserInfo {
    id: String,
    name: Option<String>,
    email: Option<String>,
}

impl FacebookExchange {
    pub fn new(config: &ProviderConfig, http: reqwest::Client) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            callback_url: config.callback_url.clone(),
            scopes: config
                .scopes
                .clone()
                .unwrap_or_else(|| vec!["email".into(), "public_profile".into()]),
            http,
        }
    }
}

#[async_trait]
impl IdentityExchange for FacebookExchange {
    fn provider(&self) -> &'static str {
        "facebook"
    }

    fn authorization_url(&self, state: &str) -> String {
        let scope = self.scopes.join(",");
        let query = query_string(&[
            ("client_id", &self.client_id),
            ("redirect_uri", &self.callback_url),
            ("response_type", "code"),
            ("scope", &scope),
            ("state", state),
        ]);
        format!("{}?{}", FACEBOOK_AUTHORIZE_URL, query)
    }

    async fn exchange_code(&self, code: &str) -> AuthResult<ProviderProfile> {
        let token: AccessTokenResponse = self
            .http
            .get(FACEBOOK_TOKEN_URL)
            .query(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.callback_url.as_str()),
            ])
            .send()
            .await
            .map_err(|e| exchange_failed("facebook code exchange", e))?
            .json()
            .await
            .map_err(|e| exchange_failed("facebook token response", e))?;

        let user: FacebookUserInfo = self
            .http
            .get(FACEBOOK_USERINFO_URL)
            .query(&[
                ("fields", "id,name,email"),
                ("access_token", token.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| exchange_failed("facebook profile fetch", e))?
            .json()
            .await
            .map_err(|e| exchange_failed("facebook profile response", e))?;

        let mut profile = ProviderProfile::new(user.id.clone()).with_raw(raw_of(&user));
        if let Some(name) = user.name {
            profile = profile.with_display_name(name);
        }
        if let Some(email) = user.email {
            profile = profile.with_email(email);
        }
        Ok(profile)
    }
}

/// Discord identity exchange
pub struct DiscordExchange {
    client_id: String,
    client_secret: String,
    callback_url: String,
    scopes: Vec<String>,
    http: reqwest::Client,
}

#[derive(Debug, Serialize, Deserialize)]
struct DiscordUserInfo {
    id: String,
    username: String,
    global_name: Option<String>,
    email: Option<String>,
}

impl DiscordExchange {
    pub fn new(config: &ProviderConfig, http: reqwest::Client) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            callback_url: config.callback_url.clone(),
            scopes: config
                .scopes
                .clone()
                .unwrap_or_else(|| vec!["identify".into(), "email".into()]),
            http,
        }
    }
}

#[async_trait]
impl IdentityExchange for DiscordExchange {
    fn provider(&self) -> &'static str {
        "discord"
    }

    fn authorization_url(&self, state: &str) -> String {
        let scope = self.scopes.join(" ");
        let query = query_string(&[
            ("client_id", &self.client_id),
            ("redirect_uri", &self.callback_url),
            ("response_type", "code"),
            ("scope", &scope),
            ("state", state),
        ]);
        format!("{}?{}", DISCORD_AUTHORIZE_URL, query)
    }

    async fn exchange_code(&self, code: &str) -> AuthResult<ProviderProfile> {
        let token: AccessTokenResponse = self
            .http
            .post(DISCORD_TOKEN_URL)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.callback_url.as_str()),
            ])
            .send()
            .await
            .map_err(|e| exchange_failed("discord code exchange", e))?
            .json()
            .await
            .map_err(|e| exchange_failed("discord token response", e))?;

        let user: DiscordUserInfo = self
            .http
            .get(DISCORD_USER_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| exchange_failed("discord profile fetch", e))?
            .json()
            .await
            .map_err(|e| exchange_failed("discord profile response", e))?;

        let display_name = user
            .global_name
            .clone()
            .unwrap_or_else(|| user.username.clone());
        let mut profile = ProviderProfile::new(user.id.clone())
            .with_username(user.username.clone())
            .with_display_name(display_name)
            .with_raw(raw_of(&user));
        if let Some(email) = user.email {
            profile = profile.with_email(email);
        }
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderMode;

    fn config(provider: &str) -> ProviderConfig {
        ProviderConfig::new(
            provider,
            "the-client-id",
            "the-client-secret",
            "https://app.example.com/auth/callback",
            ProviderMode::Stateless,
        )
    }

    #[test]
    fn test_google_authorization_url() {
        let exchange = GoogleExchange::new(&config("google"), reqwest::Client::new());
        let url = exchange.authorization_url("nonce-1");

        assert!(url.starts_with(GOOGLE_AUTHORIZE_URL));
        assert!(url.contains("client_id=the-client-id"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fapp.example.com%2Fauth%2Fcallback"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=openid+email+profile"));
        assert!(url.contains("state=nonce-1"));
    }

    #[test]
    fn test_github_authorization_url() {
        let exchange = GitHubExchange::new(&config("github"), reqwest::Client::new());
        let url = exchange.authorization_url("nonce-2");

        assert!(url.starts_with(GITHUB_AUTHORIZE_URL));
        assert!(url.contains("scope=user%3Aemail+read%3Auser"));
        assert!(url.contains("state=nonce-2"));
    }

    #[test]
    fn test_discord_authorization_url_default_scopes() {
        let exchange = DiscordExchange::new(&config("discord"), reqwest::Client::new());
        let url = exchange.authorization_url("nonce-3");

        assert!(url.starts_with(DISCORD_AUTHORIZE_URL));
        assert!(url.contains("scope=identify+email"));
    }

    #[test]
    fn test_scope_override_is_respected() {
        let config = config("facebook").with_scopes(["email"]);
        let exchange = FacebookExchange::new(&config, reqwest::Client::new());
        let url = exchange.authorization_url("nonce-4");

        assert!(url.contains("scope=email"));
        assert!(!url.contains("public_profile"));
    }
}
