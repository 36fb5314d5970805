use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use futures_util::future::BoxFuture;
use log::{debug, info, warn};
use zip::read::ZipArchive;

use crate::env;
use crate::networking::{CANCELLED, NetworkClient};
use crate::progress::{Phase, ProgressReporter};
use crate::services::{Catalog, InstallRequest, Installer, VersionCatalog, VersionEntry};
use crate::util::progress_percent;

const CATALOG_URL: &str = "https://cdn.flarial.xyz/launcher/versions.json";

pub struct RemoteCatalog {
    network: NetworkClient,
    url: String,
}

impl RemoteCatalog {
    pub fn new(network: NetworkClient) -> Self {
        Self {
            network,
            url: CATALOG_URL.into(),
        }
    }

    async fn fetch(&self) -> Result<Catalog, String> {
        let catalog: Catalog = self
            .network
            .get_json(&self.url)
            .await
            .map_err(|e| format!("unable to load version catalog: {e}"))?;
        info!(
            "catalog: {} versions, {} supported",
            catalog.entries.len(),
            catalog.supported.len()
        );
        Ok(catalog)
    }
}

impl VersionCatalog for RemoteCatalog {
    fn load(&self) -> BoxFuture<'_, Result<Catalog, String>> {
        Box::pin(self.fetch())
    }
}

/// Downloads a version's zip package and unpacks it over the game folder.
/// The download can be cancelled; the unpack cannot.
pub struct PackageInstaller {
    network: NetworkClient,
    game_dir: PathBuf,
    cache_dir: PathBuf,
}

impl PackageInstaller {
    pub fn new(network: NetworkClient) -> Self {
        Self {
            network,
            game_dir: env::game_dir(),
            cache_dir: env::cache_dir(),
        }
    }

    async fn run(
        &self,
        entry: &VersionEntry,
        progress: ProgressReporter,
        request: InstallRequest,
    ) -> Result<bool, String> {
        let url = entry
            .package_url
            .as_deref()
            .ok_or_else(|| format!("version {} has no package", entry.version))?;
        let archive = self.cache_dir.join(format!("{}.zip", entry.version));
        info!("install: {} from {url}", entry.version);

        request.set_cancellable(true);
        let flag = request.flag();
        let downloaded = self
            .network
            .download_to_path(url, &archive, Some(&flag), |done, total, _| {
                progress.report(Phase::Downloading, progress_percent(done, total).floor());
            })
            .await;
        request.set_cancellable(false);
        match downloaded {
            Err(err) if err == CANCELLED => {
                warn!("install: {} cancelled during download", entry.version);
                return Ok(false);
            }
            Err(err) => return Err(format!("package download failed: {err}")),
            Ok(()) => {}
        }

        let target = self.game_dir.clone();
        let reporter = progress.clone();
        let source = archive.clone();
        tokio::task::spawn_blocking(move || {
            extract_package(&source, &target, |percent| reporter.report(Phase::Installing, percent))
        })
        .await
        .map_err(|e| format!("install task failed: {e}"))??;

        if let Err(err) = tokio::fs::remove_file(&archive).await {
            warn!("install: unable to remove {}: {err}", archive.display());
        }
        info!("install: {} installed", entry.version);
        Ok(true)
    }
}

impl Installer for PackageInstaller {
    fn install<'a>(
        &'a self,
        entry: &'a VersionEntry,
        progress: ProgressReporter,
        request: InstallRequest,
    ) -> BoxFuture<'a, Result<bool, String>> {
        Box::pin(self.run(entry, progress, request))
    }
}

/// Unpack `archive` into `dest`, reporting whole percentages as entries land.
fn extract_package(archive: &Path, dest: &Path, mut progress: impl FnMut(f32)) -> Result<(), String> {
    let file = fs::File::open(archive).map_err(|e| format!("zip open error: {e}"))?;
    let mut archive = ZipArchive::new(file).map_err(|e| format!("zip parse error: {e}"))?;
    let count = archive.len();
    let mut last = -1.0;
    for i in 0..count {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| format!("zip entry error: {e}"))?;
        let out_path = dest.join(entry.mangled_name());
        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| format!("zip dir create error: {e}"))?;
        } else {
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent).map_err(|e| format!("zip parent dir error: {e}"))?;
            }
            let mut out_file =
                fs::File::create(&out_path).map_err(|e| format!("zip create file error: {e}"))?;
            io::copy(&mut entry, &mut out_file).map_err(|e| format!("zip write error: {e}"))?;
        }
        let percent = progress_percent(i as u64 + 1, Some(count as u64)).floor();
        if percent > last {
            debug!("install: unpacked {}/{count}", i + 1);
            progress(percent);
            last = percent;
        }
    }
    Ok(())
}
