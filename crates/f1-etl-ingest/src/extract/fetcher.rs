//! HTTP download of a single file

use crate::error::FetchError;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("f1-etl/", env!("CARGO_PKG_VERSION"));

/// Fetches bytes over HTTP and persists them, classifying failures
///
/// There are no retries; a failure is returned as a [`FetchError`] value so
/// the caller can carry on with other files.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    show_progress: bool,
}

impl Fetcher {
    pub fn new(show_progress: bool) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_client(client, show_progress))
    }

    pub fn with_client(client: reqwest::Client, show_progress: bool) -> Self {
        Self {
            client,
            show_progress,
        }
    }

    /// Download `url` to `dest` within `timeout`
    ///
    /// The body is streamed into a temporary file next to `dest`, which is
    /// renamed over `dest` only once the whole body has arrived.
    pub async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        timeout: Duration,
    ) -> Result<PathBuf, FetchError> {
        info!(url, dest = %dest.display(), "Downloading");

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| FetchError::from_reqwest(url, timeout, e))?;

        let parent = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(parent).map_err(|e| FetchError::unexpected(url, e))?;

        let pb = self.progress_bar(response.content_length(), dest);
        let mut downloaded = 0u64;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::from_reqwest(url, timeout, e))?;
            tmp.write_all(&chunk)
                .map_err(|e| FetchError::unexpected(url, e))?;
            downloaded += chunk.len() as u64;
            pb.set_position(downloaded);
        }

        tmp.flush().map_err(|e| FetchError::unexpected(url, e))?;
        tmp.persist(dest)
            .map_err(|e| FetchError::unexpected(url, e.error))?;
        pb.finish_and_clear();

        debug!(url, bytes = downloaded, "Download complete");
        Ok(dest.to_path_buf())
    }

    /// GET a small text body, such as the checksum manifest
    pub async fn fetch_text(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| FetchError::from_reqwest(url, timeout, e))?;

        response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, timeout, e))
    }

    fn progress_bar(&self, total: Option<u64>, dest: &Path) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total.unwrap_or(0));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{msg} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        let name = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        pb.set_message(name);
        pb
    }
}
