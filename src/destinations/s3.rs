use aws_config::BehaviorVersion;
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::Client;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use super::{Destination, DispatchError};
use crate::capture::Artifact;

/// Files up to this size go up in a single PutObject; larger ones are split
/// into parts of this size.
pub const DEFAULT_PART_SIZE: usize = 8 * 1024 * 1024;

/// S3 rejects uploads with more parts than this
const MAX_PARTS: u64 = 10_000;

/// Uploads artifacts to an S3 bucket with a static key pair
pub struct S3Destination {
    bucket: String,
    region: String,
    access_key: String,
    secret_key: String,
    /// Custom endpoint for S3-compatible providers
    endpoint: Option<String>,
    part_size: usize,
}

impl S3Destination {
    pub fn new(bucket: String, region: String, access_key: String, secret_key: String) -> Self {
        Self {
            bucket,
            region,
            access_key,
            secret_key,
            endpoint: None,
            part_size: DEFAULT_PART_SIZE,
        }
    }

    /// Change the multipart threshold and part size.
    ///
    /// S3 requires every part except the last to be at least 5 MiB; smaller
    /// values only work against servers that do not enforce it.
    pub fn with_part_size(mut self, part_size: usize) -> Self {
        self.part_size = part_size.max(1);
        self
    }

    pub fn with_endpoint(mut self, endpoint: Option<String>) -> Self {
        self.endpoint = endpoint.filter(|e| !e.trim().is_empty());
        self
    }

    async fn client(&self) -> Client {
        let credentials = Credentials::new(
            self.access_key.clone(),
            self.secret_key.clone(),
            None,
            None,
            "backup-app",
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()))
            .credentials_provider(SharedCredentialsProvider::new(credentials));

        if let Some(ref endpoint) = self.endpoint {
            loader = loader.endpoint_url(endpoint.clone());
        }

        let sdk_config = loader.load().await;
        let mut s3_config = aws_sdk_s3::config::Builder::from(&sdk_config);
        if self.endpoint.is_some() {
            s3_config = s3_config.force_path_style(true);
        }

        Client::from_conf(s3_config.build())
    }

    async fn upload(&self, artifact: &Artifact) -> Result<(), DispatchError> {
        let key = artifact.file_name();
        let size = tokio::fs::metadata(&artifact.path)
            .await
            .map_err(|e| DispatchError::io(&artifact.path, e))?
            .len();
        let client = self.client().await;

        if size <= self.part_size as u64 {
            self.put_object(&client, artifact, &key).await
        } else {
            self.multipart_upload(&client, artifact, &key, size).await
        }
    }

    async fn put_object(
        &self,
        client: &Client,
        artifact: &Artifact,
        key: &str,
    ) -> Result<(), DispatchError> {
        let body = ByteStream::from_path(&artifact.path).await.map_err(|e| {
            DispatchError::io(
                &artifact.path,
                std::io::Error::new(std::io::ErrorKind::Other, e),
            )
        })?;

        debug!("PutObject s3://{}/{}", self.bucket, key);

        client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        Ok(())
    }

    async fn multipart_upload(
        &self,
        client: &Client,
        artifact: &Artifact,
        key: &str,
        size: u64,
    ) -> Result<(), DispatchError> {
        let part_size = part_size_for(size, self.part_size);
        debug!(
            "Initiating multipart upload: s3://{}/{} ({} bytes, {} byte parts)",
            self.bucket, key, size, part_size
        );

        let created = client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;
        let upload_id = created
            .upload_id()
            .map(str::to_string)
            .ok_or_else(|| {
                DispatchError::Rejected("No upload id returned for multipart upload".to_string())
            })?;

        let result = self
            .upload_parts(client, artifact, key, &upload_id, part_size)
            .await;

        if let Err(ref e) = result {
            warn!("Multipart upload of {} failed, aborting: {}", key, e);
            if let Err(abort_err) = client
                .abort_multipart_upload()
                .bucket(&self.bucket)
                .key(key)
                .upload_id(&upload_id)
                .send()
                .await
            {
                warn!(
                    "Failed to abort multipart upload {}: {}",
                    upload_id,
                    DisplayErrorContext(abort_err)
                );
            }
        }

        result
    }

    async fn upload_parts(
        &self,
        client: &Client,
        artifact: &Artifact,
        key: &str,
        upload_id: &str,
        part_size: usize,
    ) -> Result<(), DispatchError> {
        let mut file = tokio::fs::File::open(&artifact.path)
            .await
            .map_err(|e| DispatchError::io(&artifact.path, e))?;

        let mut parts = Vec::new();
        let mut part_number = 1;
        loop {
            let chunk = read_part(&mut file, part_size)
                .await
                .map_err(|e| DispatchError::io(&artifact.path, e))?;
            if chunk.is_empty() {
                break;
            }
            let is_last_part = chunk.len() < part_size;

            debug!("Uploading part {} ({} bytes)", part_number, chunk.len());
            let uploaded = client
                .upload_part()
                .bucket(&self.bucket)
                .key(key)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(ByteStream::from(chunk))
                .send()
                .await
                .map_err(|e| classify_sdk_error(&e))?;

            parts.push(
                CompletedPart::builder()
                    .set_e_tag(uploaded.e_tag().map(str::to_string))
                    .part_number(part_number)
                    .build(),
            );
            part_number += 1;

            if is_last_part {
                break;
            }
        }

        client
            .complete_multipart_upload()
            .bucket(&self.bucket)
            .key(key)
            .upload_id(upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(parts))
                    .build(),
            )
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e))?;

        debug!("Multipart upload completed: s3://{}/{}", self.bucket, key);
        Ok(())
    }
}

impl Destination for S3Destination {
    fn name(&self) -> &str {
        "s3"
    }

    fn deliver(&self, artifact: &Artifact) -> Result<(), DispatchError> {
        // The SDK is async; the rest of the program is not
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| DispatchError::Transport(format!("Failed to start runtime: {}", e)))?;

        runtime.block_on(self.upload(artifact))?;

        info!(
            "Uploaded {} to s3://{}/{}",
            artifact.file_name(),
            self.bucket,
            artifact.file_name()
        );
        Ok(())
    }
}

/// Part size for a file of `size` bytes, grown so the upload stays within the part limit
fn part_size_for(size: u64, preferred: usize) -> usize {
    let minimum = (size + MAX_PARTS - 1) / MAX_PARTS;
    (preferred as u64).max(minimum) as usize
}

/// Read up to `part_size` bytes; a short result means end of file
async fn read_part(file: &mut tokio::fs::File, part_size: usize) -> std::io::Result<Vec<u8>> {
    let mut buf = vec![0u8; part_size];
    let mut filled = 0;
    while filled < part_size {
        let n = file.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    buf.truncate(filled);
    Ok(buf)
}

fn classify_sdk_error<E, R>(err: &SdkError<E, R>) -> DispatchError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match err.as_service_error() {
        Some(service_error) => classify_error_code(service_error.code(), service_error.message()),
        None => DispatchError::Transport(DisplayErrorContext(err).to_string()),
    }
}

/// Map an S3 error code to a dispatch error kind
fn classify_error_code(code: Option<&str>, message: Option<&str>) -> DispatchError {
    let code = code.unwrap_or("Unknown");
    let detail = match message {
        Some(message) => format!("{}: {}", code, message),
        None => code.to_string(),
    };

    match code {
        "NoSuchBucket" => DispatchError::NotFound(detail),
        "InvalidAccessKeyId" | "SignatureDoesNotMatch" | "AccessDenied" | "ExpiredToken"
        | "InvalidToken" => DispatchError::Authentication(detail),
        _ => DispatchError::Rejected(detail),
    }
}
