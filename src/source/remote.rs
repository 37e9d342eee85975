// src/source/remote.rs

//! HTTP package source
//!
//! Layout under the base URI:
//! - `specs/<full_name>.toml`: specification metadata
//! - `packages/<full_name>.pkg`: package archive
//!
//! Transfers stream to a temporary file and are renamed into place once
//! complete, so an interrupted download never leaves a truncated archive.

use crate::error::{Error, Result};
use crate::paths;
use crate::spec::{Platform, SpecMetadata, Specification};
use crate::version::Version;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::{Source, archive_name, metadata_name};

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of attempts for a failed request
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds, multiplied by the attempt number
const RETRY_DELAY_MS: u64 = 1000;

/// Buffer size for streaming downloads (8 KB)
const STREAM_BUFFER_SIZE: usize = 8192;

/// Package source served over HTTP(S)
pub struct RemoteSource {
    base: Url,
    client: Client,
    max_retries: u32,
    show_progress: bool,
}

impl RemoteSource {
    /// Create a source with default timeout and retry settings
    pub fn new(uri: &str) -> Result<Self> {
        Self::with_settings(uri, Duration::from_secs(DEFAULT_TIMEOUT_SECS), DEFAULT_MAX_RETRIES)
    }

    pub fn with_settings(uri: &str, timeout: Duration, max_retries: u32) -> Result<Self> {
        let mut base = Url::parse(uri)
            .map_err(|e| Error::ConfigError(format!("Invalid source URI '{uri}': {e}")))?;

        // Url::join replaces the last segment unless the path ends in '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            base,
            client,
            max_retries: max_retries.max(1),
            show_progress: false,
        })
    }

    /// Show a progress bar while downloading archives
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| Error::ConfigError(format!("Invalid path '{path}' for {}: {e}", self.base)))
    }

    /// Send a GET request, retrying transport failures
    ///
    /// HTTP error statuses are returned to the caller, not retried.
    fn get(&self, url: &Url) -> Result<Response> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.get(url.clone()).send() {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if attempt >= self.max_retries {
                        return Err(Error::DownloadError(format!(
                            "Failed to fetch {url} after {attempt} attempts: {e}"
                        )));
                    }
                    warn!("Request to {} failed (attempt {}): {}, retrying...", url, attempt, e);
                    std::thread::sleep(Duration::from_millis(RETRY_DELAY_MS * attempt as u64));
                }
            }
        }
    }
}

impl Source for RemoteSource {
    fn uri(&self) -> &str {
        self.base.as_str()
    }

    fn fetch_spec(
        &self,
        name: &str,
        version: &Version,
        platform: &Platform,
    ) -> Result<Option<Specification>> {
        let url = self.endpoint(&format!("specs/{}", metadata_name(name, version, platform)))?;
        debug!("Fetching specification metadata from {}", url);

        let response = self.get(&url)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Error::DownloadError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let body = response
            .text()
            .map_err(|e| Error::DownloadError(format!("Failed to read response from {url}: {e}")))?;

        SpecMetadata::from_toml(&body)?.into_specification().map(Some)
    }

    fn download(&self, spec: &Specification, dest: &Path) -> Result<PathBuf> {
        let file_name = archive_name(spec);
        let url = self.endpoint(&format!("packages/{file_name}"))?;
        let cache_dir = paths::cache_dir(dest);
        let dest_path = cache_dir.join(&file_name);

        info!("Downloading {} to {}", url, dest_path.display());

        fs::create_dir_all(&cache_dir).map_err(|e| {
            Error::IoError(format!("Failed to create directory {}: {e}", cache_dir.display()))
        })?;

        let response = self.get(&url)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFoundError(format!(
                "{} not found at {}",
                spec.full_name(),
                self.uri()
            )));
        }
        if !response.status().is_success() {
            return Err(Error::DownloadError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let progress = self
            .show_progress
            .then(|| create_progress_bar(response.content_length().unwrap_or(0), &spec.full_name()));

        let temp_path = dest_path.with_extension("tmp");
        let mut file = File::create(&temp_path).map_err(|e| {
            Error::IoError(format!("Failed to create file {}: {e}", temp_path.display()))
        })?;

        let streamed = stream_response_to_file(response, &mut file, progress.as_ref());
        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        let written = match streamed {
            Ok(n) => n,
            Err(e) => {
                let _ = fs::remove_file(&temp_path);
                return Err(e);
            }
        };

        fs::rename(&temp_path, &dest_path).map_err(|e| {
            Error::IoError(format!(
                "Failed to move {} to {}: {e}",
                temp_path.display(),
                dest_path.display()
            ))
        })?;

        debug!("Wrote {} bytes to {}", written, dest_path.display());
        Ok(dest_path)
    }
}

/// Create a styled progress bar for package downloads
fn create_progress_bar(size: u64, name: &str) -> ProgressBar {
    let pb = ProgressBar::new(size);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(name.to_string());
    pb
}

/// Stream an HTTP response to a file in fixed-size chunks
fn stream_response_to_file(
    mut response: Response,
    file: &mut File,
    progress_bar: Option<&ProgressBar>,
) -> Result<u64> {
    let mut downloaded: u64 = 0;
    let mut buffer = [0u8; STREAM_BUFFER_SIZE];

    loop {
        let bytes_read = response
            .read(&mut buffer)
            .map_err(|e| Error::DownloadError(format!("Failed to read response: {e}")))?;

        if bytes_read == 0 {
            break;
        }

        file.write_all(&buffer[..bytes_read])
            .map_err(|e| Error::IoError(format!("Failed to write data: {e}")))?;

        downloaded += bytes_read as u64;

        if let Some(pb) = progress_bar {
            pb.set_position(downloaded);
        }
    }

    Ok(downloaded)
}
