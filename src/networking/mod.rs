use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use futures_util::future::BoxFuture;
use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::services::LauncherRemote;
use crate::updater::{self, UpdateStatus};
use crate::util::{cancel_requested, format_speed};

const PROBE_URL: &str = "https://cdn.flarial.xyz/200";
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
pub const CANCELLED: &str = "Download cancelled";

#[derive(Clone)]
pub struct NetworkClient {
    client: Client,
}

impl Default for NetworkClient {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkClient {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("flarial-launcher/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|err| {
                warn!("network client: falling back to default HTTP client configuration ({err})");
                Client::new()
            });
        Self { client }
    }

    /// `true` when `url` answers with a success status within a few seconds.
    pub async fn probe(&self, url: &str) -> bool {
        match self.client.head(url).timeout(PROBE_TIMEOUT).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(err) => {
                debug!("probe {url} failed: {err}");
                false
            }
        }
    }

    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, String> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("GET {url} failed: {e}"))?
            .error_for_status()
            .map_err(|e| format!("GET {url} returned an error: {e}"))?
            .json()
            .await
            .map_err(|e| format!("GET {url} returned invalid JSON: {e}"))
    }

    /// Download a file to `dest`, calling `progress` with (downloaded, total, speed_text).
    /// A raised `cancel` flag removes the partial file and fails with [`CANCELLED`].
    pub async fn download_to_path<F>(
        &self,
        url: &str,
        dest: &Path,
        cancel: Option<&Arc<AtomicBool>>,
        mut progress: F,
    ) -> Result<(), String>
    where
        F: FnMut(u64, Option<u64>, &str),
    {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("download request failed: {e}"))?
            .error_for_status()
            .map_err(|e| format!("download status error: {e}"))?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| format!("failed to create download dir: {e}"))?;
        }
        let mut file = File::create(dest)
            .await
            .map_err(|e| format!("failed to create file: {e}"))?;

        let total = response.content_length();
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;
        let mut last_tick = Instant::now();
        let mut last_bytes = 0u64;

        while let Some(chunk) = stream.next().await {
            if cancel_requested(cancel) {
                drop(file);
                if let Err(err) = tokio::fs::remove_file(dest).await {
                    warn!("download: unable to remove partial {}: {err}", dest.display());
                }
                return Err(CANCELLED.into());
            }
            let chunk = chunk.map_err(|e| format!("stream error: {e}"))?;
            file.write_all(&chunk)
                .await
                .map_err(|e| format!("write error: {e}"))?;
            downloaded += chunk.len() as u64;

            let since = last_tick.elapsed().as_secs_f32();
            if since > 0.2 {
                let speed = (downloaded - last_bytes) as f32 / since;
                progress(downloaded, total, &format_speed(speed));
                last_tick = Instant::now();
                last_bytes = downloaded;
            }
        }

        progress(downloaded, total, "0 B/s");

        file.flush()
            .await
            .map_err(|e| format!("flush error: {e}"))?;

        if let Some(total) = total
            && downloaded < total
        {
            return Err(format!(
                "download incomplete: received {downloaded} of {total} bytes"
            ));
        }

        Ok(())
    }
}

impl LauncherRemote for NetworkClient {
    fn is_available(&self) -> BoxFuture<'_, bool> {
        Box::pin(self.probe(PROBE_URL))
    }

    fn check_for_updates<'a>(&'a self, current_version: &'a str) -> BoxFuture<'a, Result<UpdateStatus, String>> {
        Box::pin(updater::check_for_updates(&self.client, current_version))
    }
}
