//! OAuth 2.0 token handling for Google Calendar.
//!
//! Tokens are stored in the "authorized user" JSON shape written by
//! Google's own client libraries, so an existing `token.json` can be
//! reused as-is.

use crate::error::{GymError, Result};
use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Router,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex, Notify};
use tracing::{debug, info};
use url::Url;

/// Scope granting read/write access to calendars.
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar";

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Tokens this close to expiry are refreshed before use.
const EXPIRY_MARGIN_SECS: i64 = 60;

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

/// Saved user credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizedUser {
    /// Current access token.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

impl AuthorizedUser {
    /// Whether the access token can be used at `now` without refreshing.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        match (&self.token, self.expiry) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(_), Some(expiry)) => expiry - now > Duration::seconds(EXPIRY_MARGIN_SECS),
        }
    }

    /// Read a token file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write a token file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    fn apply(&mut self, response: TokenResponse, now: DateTime<Utc>) {
        self.token = Some(response.access_token);
        self.expiry = response.expires_in.map(|secs| now + Duration::seconds(secs));
        if let Some(refresh) = response.refresh_token {
            self.refresh_token = Some(refresh);
        }
        if let Some(scope) = response.scope {
            self.scopes = scope.split_whitespace().map(str::to_string).collect();
        }
    }
}

/// OAuth client registration from the Cloud Console.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Deserialize)]
struct ClientSecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Read a downloaded `credentials.json`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GymError::Auth(format!(
                "credentials.json not found at {}. Download it from the Google Cloud Console.",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let file: ClientSecretsFile = serde_json::from_str(content)?;
        file.installed.or(file.web).ok_or_else(|| {
            GymError::Auth("credentials file has neither an 'installed' nor a 'web' client".to_string())
        })
    }

    /// Consent-screen URL for the loopback flow.
    pub fn authorization_url(&self, redirect_uri: &str, state: &str) -> Result<Url> {
        Url::parse_with_params(
            &self.auth_uri,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", CALENDAR_SCOPE),
                ("access_type", "offline"),
                ("prompt", "consent"),
                ("state", state),
            ],
        )
        .map_err(|e| GymError::Config(format!("Invalid auth_uri '{}': {}", self.auth_uri, e)))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

async fn request_token(
    http: &reqwest::Client,
    token_uri: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse> {
    let response = http.post(token_uri).form(form).send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GymError::Auth(format!("token endpoint returned {}: {}", status, body)));
    }
    Ok(response.json().await?)
}

/// Loads, refreshes and persists the access token.
pub struct TokenManager {
    path: PathBuf,
    http: reqwest::Client,
    current: Mutex<Option<AuthorizedUser>>,
}

impl TokenManager {
    pub fn new(path: PathBuf, http: reqwest::Client) -> Self {
        Self {
            path,
            http,
            current: Mutex::new(None),
        }
    }

    /// Return a usable access token, refreshing it if needed.
    pub async fn access_token(&self) -> Result<String> {
        let mut current = self.current.lock().await;

        if current.is_none() {
            if !self.path.exists() {
                return Err(GymError::Auth(format!(
                    "no token at {}. Run 'gymbot calendar auth' first.",
                    self.path.display()
                )));
            }
            *current = Some(AuthorizedUser::load(&self.path)?);
        }

        let Some(user) = current.as_mut() else {
            return Err(GymError::Auth("token unavailable".to_string()));
        };

        let now = Utc::now();
        if !user.is_fresh(now) {
            let refresh_token = user.refresh_token.clone().ok_or_else(|| {
                GymError::Auth(
                    "token expired and no refresh token is stored. Run 'gymbot calendar auth'."
                        .to_string(),
                )
            })?;

            debug!("Refreshing calendar access token");
            let response = request_token(
                &self.http,
                &user.token_uri,
                &[
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token.as_str()),
                    ("client_id", user.client_id.as_str()),
                    ("client_secret", user.client_secret.as_str()),
                ],
            )
            .await?;
            user.apply(response, now);
            user.save(&self.path)?;
            info!("Calendar access token refreshed");
        }

        user.token
            .clone()
            .ok_or_else(|| GymError::Auth("token endpoint returned no access token".to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

#[derive(Clone)]
struct CallbackState {
    sender: Arc<Mutex<Option<oneshot::Sender<CallbackParams>>>>,
}

async fn oauth_callback(
    State(state): State<CallbackState>,
    Query(params): Query<CallbackParams>,
) -> Html<&'static str> {
    if let Some(sender) = state.sender.lock().await.take() {
        let _ = sender.send(params);
    }
    Html("<h3>gymbot: authorization received. You can close this window.</h3>")
}

/// Run the installed-app loopback flow and return fresh credentials.
///
/// `on_url` is handed the consent URL to show to the user.
pub async fn authorize_installed(
    secrets: &ClientSecrets,
    http: &reqwest::Client,
    on_url: impl FnOnce(&Url),
) -> Result<AuthorizedUser> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let redirect_uri = format!("http://127.0.0.1:{}/", listener.local_addr()?.port());
    let expected_state = uuid::Uuid::new_v4().to_string();

    let (sender, receiver) = oneshot::channel();
    let app = Router::new()
        .route("/", get(oauth_callback))
        .with_state(CallbackState {
            sender: Arc::new(Mutex::new(Some(sender))),
        });

    let shutdown = Arc::new(Notify::new());
    let server = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.notified().await })
                .await
        })
    };

    on_url(&secrets.authorization_url(&redirect_uri, &expected_state)?);

    let params = receiver
        .await
        .map_err(|_| GymError::Auth("authorization callback was not received".to_string()));
    shutdown.notify_one();
    let _ = server.await;
    let params = params?;

    if let Some(error) = params.error {
        return Err(GymError::Auth(format!("authorization denied: {}", error)));
    }
    if params.state.as_deref() != Some(expected_state.as_str()) {
        return Err(GymError::Auth("state mismatch in authorization callback".to_string()));
    }
    let code = params
        .code
        .ok_or_else(|| GymError::Auth("callback carried no authorization code".to_string()))?;

    let response = request_token(
        http,
        &secrets.token_uri,
        &[
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
        ],
    )
    .await?;

    let mut user = AuthorizedUser {
        token: None,
        refresh_token: None,
        token_uri: secrets.token_uri.clone(),
        client_id: secrets.client_id.clone(),
        client_secret: secrets.client_secret.clone(),
        scopes: vec![CALENDAR_SCOPE.to_string()],
        expiry: None,
    };
    user.apply(response, Utc::now());
    Ok(user)
}
