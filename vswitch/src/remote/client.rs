//! Blocking HTTP client for the version archive.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::StatusCode;
use tracing::{debug, trace};

use super::credentials::Credentials;
use super::error::{RemoteError, RemoteResult};
use super::manifest::{manifest_lines, CHECKSUMS_MANIFEST, FILES_MANIFEST, VERSIONS_MANIFEST};
use super::traits::{ManifestSource, VariantProbe};
use crate::download::HttpDownloader;
use crate::version::{TrackedFile, VersionList, VersionedVariant};

/// Archive used when the configuration does not name one.
pub const DEFAULT_ARCHIVE_URL: &str = match option_env!("VSWITCH_ARCHIVE_URL") {
    Some(url) => url,
    None => "http://localhost:8080",
};

/// Timeout for establishing a connection.
const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Timeout for a complete existence probe or manifest fetch.
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Authenticated client for one archive.
///
/// Cloning is cheap: the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ArchiveClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
    request_timeout: Duration,
}

impl ArchiveClient {
    /// Create a client for the archive rooted at `base_url`.
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> RemoteResult<Self> {
        // Probes and manifests set their own timeout; downloads run unbounded.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| RemoteError::ClientBuild(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            credentials,
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        })
    }

    /// Override the timeout applied to probes and manifest fetches.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Archive root URL without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL of an archive-relative path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// A downloader sharing this client's connection pool and credentials.
    pub fn downloader(&self) -> HttpDownloader {
        HttpDownloader::new(
            self.client.clone(),
            self.base_url.clone(),
            self.credentials.clone(),
        )
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .basic_auth(self.credentials.user(), Some(self.credentials.password()))
            .timeout(self.request_timeout)
    }

    /// Fetch a text manifest, failing on anything but 200.
    pub fn get_text(&self, path: &str) -> RemoteResult<String> {
        let url = self.url_for(path);
        let timeout_secs = self.request_timeout.as_secs();
        debug!(url = %url, "Fetching manifest");

        let response = self
            .authed(self.client.get(&url))
            .send()
            .map_err(|e| RemoteError::from_reqwest(&url, timeout_secs, e))?;

        if response.status() != StatusCode::OK {
            return Err(RemoteError::Status {
                url,
                status: response.status().as_u16(),
            });
        }

        response
            .text()
            .map_err(|e| RemoteError::from_reqwest(&url, timeout_secs, e))
    }
}

impl VariantProbe for ArchiveClient {
    fn exists(&self, variant: &VersionedVariant) -> RemoteResult<bool> {
        let url = self.url_for(&variant.remote_path());
        let response = self
            .authed(self.client.head(&url))
            .send()
            .map_err(|e| RemoteError::from_reqwest(&url, self.request_timeout.as_secs(), e))?;

        if response.status() != StatusCode::OK {
            trace!(url = %url, status = response.status().as_u16(), "Variant not published");
            return Ok(false);
        }

        // A missing header counts as present; only an explicit zero length
        // marks a placeholder.
        let empty = response
            .headers()
            .get(reqwest::header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|len| len.trim() == "0");

        trace!(url = %url, exists = !empty, "Probed variant");
        Ok(!empty)
    }
}

impl ManifestSource for ArchiveClient {
    fn versions(&self) -> RemoteResult<VersionList> {
        Ok(VersionList::from_manifest(&self.get_text(VERSIONS_MANIFEST)?))
    }

    fn tracked_files(&self) -> RemoteResult<Vec<TrackedFile>> {
        let body = self.get_text(FILES_MANIFEST)?;
        Ok(manifest_lines(&body)
            .into_iter()
            .map(TrackedFile::new)
            .collect())
    }

    fn checksum_lines(&self) -> RemoteResult<Vec<String>> {
        let body = self.get_text(CHECKSUMS_MANIFEST)?;
        Ok(body.replace("\r\n", "\n").lines().map(str::to_string).collect())
    }
}
