//! Telegram Bot API destination
//!
//! Sends artifacts as documents to a channel via `sendDocument`.

use reqwest::blocking::multipart::Form;
use reqwest::blocking::{Client, Response};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use super::{Destination, DispatchError};
use crate::capture::Artifact;

const API_BASE: &str = "https://api.telegram.org";

pub struct TelegramDestination {
    bot_token: String,
    channel_id: i64,
    api_base: String,
}

/// Envelope every Bot API method answers with
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    result: Option<serde_json::Value>,
}

impl TelegramDestination {
    pub fn new(bot_token: String, channel_id: i64) -> Self {
        Self {
            bot_token,
            channel_id,
            api_base: API_BASE.to_string(),
        }
    }

    /// Point at a different Bot API server
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }

    fn client() -> Result<Client, DispatchError> {
        // Uploads can be large; no overall request timeout
        Client::builder()
            .timeout(Option::<Duration>::None)
            .build()
            .map_err(|e| DispatchError::Transport(format!("Failed to create HTTP client: {}", e)))
    }

    /// Validate the token with `getMe`
    fn authenticate(&self, client: &Client) -> Result<(), DispatchError> {
        let response = client.get(self.method_url("getMe")).send()?;
        match read_response(response)? {
            Ok(result) => {
                let username = result
                    .as_ref()
                    .and_then(|r| r.get("username"))
                    .and_then(|u| u.as_str())
                    .unwrap_or("unknown");
                debug!("Authenticated as bot @{}", username);
                Ok(())
            }
            Err((_, description)) => Err(DispatchError::Authentication(description)),
        }
    }

    fn send_document(&self, client: &Client, artifact: &Artifact) -> Result<(), DispatchError> {
        let form = Form::new()
            .text("chat_id", self.channel_id.to_string())
            .file("document", &artifact.path)
            .map_err(|e| DispatchError::io(&artifact.path, e))?;

        let response = client
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()?;

        match read_response(response)? {
            Ok(_) => Ok(()),
            Err((status, description)) => Err(classify_api_error(status, &description)),
        }
    }
}

impl Destination for TelegramDestination {
    fn name(&self) -> &str {
        "telegram"
    }

    fn deliver(&self, artifact: &Artifact) -> Result<(), DispatchError> {
        let client = Self::client()?;
        self.authenticate(&client)?;
        self.send_document(&client, artifact)?;

        info!(
            "Sent {} to Telegram channel {}",
            artifact.file_name(),
            self.channel_id
        );
        Ok(())
    }
}

/// Split a Bot API answer into its result or `(status, description)`
fn read_response(
    response: Response,
) -> Result<Result<Option<serde_json::Value>, (u16, String)>, DispatchError> {
    let status = response.status();
    let body = response.text()?;

    match serde_json::from_str::<ApiResponse>(&body) {
        Ok(api) if api.ok && status.is_success() => Ok(Ok(api.result)),
        Ok(api) => Ok(Err((
            status.as_u16(),
            api.description.unwrap_or_else(|| status.to_string()),
        ))),
        // Proxies in front of the API answer with HTML, e.g. 413 for oversized uploads
        Err(_) => Ok(Err((status.as_u16(), format!("{}: {}", status, body.trim())))),
    }
}

/// Map a failed Bot API call to a dispatch error kind
fn classify_api_error(status: u16, description: &str) -> DispatchError {
    let lowered = description.to_lowercase();
    match status {
        // An unknown token yields 404 on every method
        401 | 404 => DispatchError::Authentication(description.to_string()),
        400 if lowered.contains("chat not found") => DispatchError::NotFound(description.to_string()),
        _ => DispatchError::Rejected(description.to_string()),
    }
}
