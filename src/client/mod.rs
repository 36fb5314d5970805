use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use futures_util::future::BoxFuture;
use log::{debug, info, warn};

use crate::env;
use crate::networking::NetworkClient;
use crate::process::ProcessLauncher;
use crate::services::{ClientBuild, ClientService, PercentFn};
use crate::util::{progress_percent, verify_sha256};

const CDN: &str = "https://cdn.flarial.xyz";

/// Client library downloads, verified against the published SHA-256 list.
pub struct FlarialClient {
    network: NetworkClient,
    launcher: ProcessLauncher,
    dir: PathBuf,
}

impl FlarialClient {
    pub fn new(network: NetworkClient, launcher: ProcessLauncher) -> Self {
        Self {
            network,
            launcher,
            dir: env::client_dir(),
        }
    }

    pub fn library_path(&self, build: ClientBuild) -> PathBuf {
        self.dir.join(format!("Flarial.Client.{}.dll", build.name()))
    }

    async fn expected_hash(&self, build: ClientBuild) -> Result<String, String> {
        let hashes: HashMap<String, String> = self
            .network
            .get_json(&format!("{CDN}/dll_hashes.json"))
            .await?;
        hashes
            .get(build.name())
            .cloned()
            .ok_or_else(|| format!("no published hash for the {} build", build.name()))
    }

    async fn update(&self, build: ClientBuild, mut progress: PercentFn) -> Result<(), String> {
        let expected = self.expected_hash(build).await?;
        let path = self.library_path(build);
        if path.is_file() && verify_sha256(&path, &expected).is_ok() {
            debug!("client: {} build is current", build.name());
            return Ok(());
        }

        let url = format!("{CDN}/dll/{}.dll", build.name().to_lowercase());
        info!("client: downloading {} build from {url}", build.name());
        self.network
            .download_to_path(&url, &path, None, |done, total, speed| {
                debug!("client: {done} bytes ({speed})");
                progress(progress_percent(done, total));
            })
            .await
            .map_err(|e| format!("client download failed: {e}"))?;

        if let Err(err) = verify_sha256(&path, &expected) {
            warn!("client: downloaded {} build failed verification", build.name());
            if let Err(remove_err) = fs::remove_file(&path) {
                warn!("client: unable to remove {}: {remove_err}", path.display());
            }
            return Err(err);
        }
        Ok(())
    }
}

impl ClientService for FlarialClient {
    fn download(&self, build: ClientBuild, progress: PercentFn) -> BoxFuture<'_, Result<(), String>> {
        Box::pin(self.update(build, progress))
    }

    fn launch(&self, build: ClientBuild, wait_for_initialization: bool) -> BoxFuture<'_, Result<(), String>> {
        Box::pin(async move {
            let library = self.library_path(build);
            self.launcher.launch(&library, wait_for_initialization).await
        })
    }

    fn launch_custom<'a>(&'a self, library: &'a Path, wait_for_initialization: bool) -> BoxFuture<'a, Result<(), String>> {
        Box::pin(self.launcher.launch(library, wait_for_initialization))
    }

    fn is_valid_library(&self, library: &Path) -> bool {
        is_library(library)
    }
}

/// An existing `.dll` file starting with the PE `MZ` signature.
fn is_library(path: &Path) -> bool {
    let has_extension = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("dll"));
    if !has_extension || !path.is_file() {
        return false;
    }
    let mut magic = [0u8; 2];
    fs::File::open(path)
        .and_then(|mut file| file.read_exact(&mut magic))
        .is_ok_and(|()| &magic == b"MZ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn library_validation_checks_extension_and_signature() {
        let dir = std::env::temp_dir().join(format!("flarial-client-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let good = dir.join("good.DLL");
        let text = dir.join("notes.dll");
        let wrong_ext = dir.join("good.exe");
        fs::write(&good, b"MZ\x90\x00").unwrap();
        fs::write(&text, b"hello").unwrap();
        fs::write(&wrong_ext, b"MZ").unwrap();

        assert!(is_library(&good));
        assert!(!is_library(&text));
        assert!(!is_library(&wrong_ext));
        assert!(!is_library(&dir.join("missing.dll")));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn builds_have_distinct_paths() {
        let client = FlarialClient::new(NetworkClient::new(), ProcessLauncher::new("game.exe"));
        assert_ne!(
            client.library_path(ClientBuild::Release),
            client.library_path(ClientBuild::Beta)
        );
    }
}
