//! Google Drive destination
//!
//! Authenticates with a service-account key (JWT bearer grant) and uploads the
//! artifact into a folder through a resumable upload session.

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::blocking::{Body, Client};
use reqwest::header::LOCATION;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use super::{Destination, DispatchError};
use crate::capture::Artifact;
use crate::config::expand_tilde;

const UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3/files";
const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

pub struct GoogleDriveDestination {
    credentials_file: PathBuf,
    folder_id: String,
    upload_base: String,
}

/// Fields used from a service-account JSON key
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Serialize)]
struct FileMetadata<'a> {
    name: &'a str,
    parents: [&'a str; 1],
}

impl GoogleDriveDestination {
    pub fn new(credentials_file: PathBuf, folder_id: String) -> Self {
        Self {
            credentials_file,
            folder_id,
            upload_base: UPLOAD_BASE.to_string(),
        }
    }

    /// Point at a different upload endpoint
    pub fn with_upload_base(mut self, upload_base: impl Into<String>) -> Self {
        self.upload_base = upload_base.into();
        self
    }

    fn read_key(&self) -> Result<ServiceAccountKey, DispatchError> {
        let path = expand_tilde(&self.credentials_file);
        let contents = fs::read_to_string(&path).map_err(|e| {
            DispatchError::Credentials(format!("failed to read {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            DispatchError::Credentials(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    fn access_token(&self, client: &Client, key: &ServiceAccountKey) -> Result<String, DispatchError> {
        let assertion = sign_assertion(key, Utc::now().timestamp())?;

        let response = client
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(match status {
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    DispatchError::Authentication(format!("{}: {}", status, body.trim()))
                }
                _ => DispatchError::Transport(format!("token endpoint returned {}", status)),
            });
        }

        let token: TokenResponse = response.json().map_err(|e| {
            DispatchError::Authentication(format!("unexpected token response: {}", e))
        })?;
        debug!("Obtained access token for {}", key.client_email);
        Ok(token.access_token)
    }

    /// Open a resumable session and return its URI
    fn start_session(
        &self,
        client: &Client,
        token: &str,
        name: &str,
        size: u64,
    ) -> Result<String, DispatchError> {
        let response = client
            .post(&self.upload_base)
            .query(&[("uploadType", "resumable"), ("supportsAllDrives", "true")])
            .bearer_auth(token)
            .header("X-Upload-Content-Type", "application/octet-stream")
            .header("X-Upload-Content-Length", size.to_string())
            .json(&FileMetadata {
                name,
                parents: [self.folder_id.as_str()],
            })
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(classify_status(status, &self.folder_id, &body));
        }

        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .ok_or_else(|| DispatchError::Rejected("upload session URI missing".to_string()))
    }

    fn upload(&self, client: &Client, token: &str, artifact: &Artifact) -> Result<(), DispatchError> {
        let size = fs::metadata(&artifact.path)
            .map_err(|e| DispatchError::io(&artifact.path, e))?
            .len();
        let session = self.start_session(client, token, &artifact.file_name(), size)?;

        let file = File::open(&artifact.path).map_err(|e| DispatchError::io(&artifact.path, e))?;
        let response = client
            .put(session)
            .bearer_auth(token)
            .header("Content-Type", "application/octet-stream")
            .body(Body::sized(file, size))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(classify_status(status, &self.folder_id, &body));
        }

        Ok(())
    }
}

impl Destination for GoogleDriveDestination {
    fn name(&self) -> &str {
        "google_drive"
    }

    fn deliver(&self, artifact: &Artifact) -> Result<(), DispatchError> {
        let key = self.read_key()?;

        // No overall timeout so large uploads are not cut off
        let client = Client::builder()
            .timeout(Option::<Duration>::None)
            .build()
            .map_err(|e| DispatchError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        let token = self.access_token(&client, &key)?;
        self.upload(&client, &token, artifact)?;

        info!(
            "Uploaded {} to Google Drive folder {}",
            artifact.file_name(),
            self.folder_id
        );
        Ok(())
    }
}

/// Build the RS256-signed JWT assertion for the token exchange
fn sign_assertion(key: &ServiceAccountKey, now: i64) -> Result<String, DispatchError> {
    let claims = Claims {
        iss: &key.client_email,
        scope: DRIVE_SCOPE,
        aud: &key.token_uri,
        iat: now,
        exp: now + 3600,
    };

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| DispatchError::Credentials(format!("invalid private key: {}", e)))?;

    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .map_err(|e| DispatchError::Credentials(format!("failed to sign assertion: {}", e)))
}

fn classify_status(status: StatusCode, folder_id: &str, body: &str) -> DispatchError {
    match status {
        StatusCode::NOT_FOUND => DispatchError::NotFound(format!("folder {}", folder_id)),
        StatusCode::UNAUTHORIZED => DispatchError::Authentication(body.trim().to_string()),
        _ => DispatchError::Rejected(format!("{}: {}", status, body.trim())),
    }
}
