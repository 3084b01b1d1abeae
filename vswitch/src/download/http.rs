//! Authenticated single-file HTTP downloads.
//!
//! Both transports share this downloader so they target the same URL
//! convention and present the same credentials.

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use reqwest::blocking::{Client, Response};
use reqwest::StatusCode;

use super::error::{DownloadError, DownloadResult};
use super::progress::ProgressCallback;
use crate::remote::Credentials;

/// Buffer size for reading/writing during downloads (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Downloads archive objects to local files.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl HttpDownloader {
    /// Create a downloader for the archive rooted at `base_url`.
    pub fn new(client: Client, base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Full URL of an archive-relative path.
    pub fn url_for(&self, remote_path: &str) -> String {
        format!("{}/{}", self.base_url, remote_path.trim_start_matches('/'))
    }

    /// Download `remote_path` to `dest` in one go.
    ///
    /// Returns the number of bytes written.
    pub fn download(&self, remote_path: &str, dest: &Path) -> DownloadResult<u64> {
        let url = self.url_for(remote_path);
        let mut response = self.start(&url)?;
        let mut writer = BufWriter::new(prepare_destination(dest)?);

        let written = response
            .copy_to(&mut writer)
            .map_err(|e| DownloadError::Request {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        writer.flush().map_err(|e| DownloadError::WriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })?;

        Ok(written)
    }

    /// Download `remote_path` to `dest`, reporting progress as bytes arrive.
    pub fn download_with_progress(
        &self,
        remote_path: &str,
        dest: &Path,
        on_progress: ProgressCallback,
    ) -> DownloadResult<u64> {
        let url = self.url_for(remote_path);
        let response = self.start(&url)?;
        let total_size = response.content_length().unwrap_or(0);
        let file = prepare_destination(dest)?;

        self.stream_download(&url, response, file, dest, total_size, on_progress)
    }

    /// Send the authenticated GET and check its status.
    fn start(&self, url: &str) -> DownloadResult<Response> {
        let response = self
            .client
            .get(url)
            .basic_auth(self.credentials.user(), Some(self.credentials.password()))
            .send()
            .map_err(|e| DownloadError::Request {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        if response.status() != StatusCode::OK {
            return Err(DownloadError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response)
    }

    /// Stream the response body to the destination file.
    fn stream_download(
        &self,
        url: &str,
        mut response: Response,
        file: File,
        dest: &Path,
        total_size: u64,
        on_progress: ProgressCallback,
    ) -> DownloadResult<u64> {
        let mut writer = BufWriter::new(file);
        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut downloaded = 0u64;

        on_progress(0, total_size);

        loop {
            let bytes_read = match response.read(&mut buffer) {
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(DownloadError::Request {
                        url: url.to_string(),
                        reason: format!("Read error: {}", e),
                    })
                }
            };

            if bytes_read == 0 {
                break;
            }

            writer
                .write_all(&buffer[..bytes_read])
                .map_err(|e| DownloadError::WriteFailed {
                    path: dest.to_path_buf(),
                    source: e,
                })?;

            downloaded += bytes_read as u64;
            on_progress(downloaded, total_size);
        }

        writer.flush().map_err(|e| DownloadError::WriteFailed {
            path: dest.to_path_buf(),
            source: e,
        })?;

        Ok(downloaded)
    }
}

/// Create (or truncate) the destination file, creating parent directories.
fn prepare_destination(dest: &Path) -> DownloadResult<File> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| DownloadError::CreateDirFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    File::create(dest).map_err(|e| DownloadError::WriteFailed {
        path: dest.to_path_buf(),
        source: e,
    })
}
