//! Seams between the launcher flows and the outside world. The engine only
//! talks to these traits; the concrete implementations live in `game`,
//! `client`, `catalog`, `networking` and `storage`.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};

use crate::config::Configuration;
use crate::progress::ProgressReporter;
use crate::updater::UpdateStatus;

/// What is known about the local game install.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GameInfo {
    pub installed: bool,
    pub signed: bool,
    pub packaged: bool,
    pub development_kit: bool,
    pub version: Option<String>,
}

pub trait GameInstallation: Send + Sync {
    fn inspect(&self) -> GameInfo;
}

/// Downloadable client library builds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClientBuild {
    Release,
    Beta,
}

impl ClientBuild {
    pub fn name(self) -> &'static str {
        match self {
            ClientBuild::Release => "Release",
            ClientBuild::Beta => "Beta",
        }
    }
}

/// Called with a download percentage in `[0, 100]`.
pub type PercentFn = Box<dyn FnMut(f32) + Send>;

pub trait ClientService: Send + Sync {
    /// Bring the local copy of `build` up to date. Reports percentages only
    /// when a download is actually needed.
    fn download(&self, build: ClientBuild, progress: PercentFn) -> BoxFuture<'_, Result<(), String>>;

    fn launch(&self, build: ClientBuild, wait_for_initialization: bool) -> BoxFuture<'_, Result<(), String>>;

    fn launch_custom<'a>(&'a self, library: &'a Path, wait_for_initialization: bool) -> BoxFuture<'a, Result<(), String>>;

    /// Whether `library` looks like a loadable library.
    fn is_valid_library(&self, library: &Path) -> bool;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version: String,
    /// Missing for versions that are listed but cannot be installed.
    #[serde(default)]
    pub package_url: Option<String>,
}

/// Known game versions, newest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub entries: Vec<VersionEntry>,
    #[serde(default)]
    pub supported: Vec<String>,
}

impl Catalog {
    pub fn is_supported(&self, version: &str) -> bool {
        self.supported.iter().any(|supported| supported == version)
    }

    /// Newest supported version, falling back to the newest entry.
    pub fn latest_supported(&self) -> Option<&str> {
        self.supported
            .first()
            .or_else(|| self.entries.first().map(|entry| &entry.version))
            .map(String::as_str)
    }

    pub fn entry(&self, version: &str) -> Option<&VersionEntry> {
        self.entries.iter().find(|entry| entry.version == version)
    }

    /// Entries that can be installed, in catalog order.
    pub fn installable(&self) -> impl Iterator<Item = &VersionEntry> {
        self.entries.iter().filter(|entry| entry.package_url.is_some())
    }
}

pub trait VersionCatalog: Send + Sync {
    fn load(&self) -> BoxFuture<'_, Result<Catalog, String>>;
}

/// Cancellation handle shared between an install and whoever wants to stop
/// it. Cancelling is only honoured while the install says it may be.
#[derive(Clone, Debug, Default)]
pub struct InstallRequest {
    cancelled: Arc<AtomicBool>,
    cancellable: Arc<AtomicBool>,
}

impl InstallRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the install to stop. Returns whether the request was honoured.
    pub fn cancel(&self) -> bool {
        if !self.cancellable.load(Ordering::SeqCst) {
            return false;
        }
        self.cancelled.store(true, Ordering::SeqCst);
        true
    }

    pub fn set_cancellable(&self, cancellable: bool) {
        self.cancellable.store(cancellable, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// The raw flag, for helpers that poll an `Option<Arc<AtomicBool>>`.
    pub fn flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }
}

pub trait Installer: Send + Sync {
    /// Install `entry`, reporting phases through `progress`. `Ok(false)`
    /// means the install was cancelled or refused.
    fn install<'a>(
        &'a self,
        entry: &'a VersionEntry,
        progress: ProgressReporter,
        request: InstallRequest,
    ) -> BoxFuture<'a, Result<bool, String>>;
}

pub trait ConfigStore: Send + Sync {
    fn load(&self) -> BoxFuture<'_, Result<Configuration, String>>;
    fn save<'a>(&'a self, config: &'a Configuration) -> BoxFuture<'a, Result<(), String>>;
}

/// Startup checks against remote services.
pub trait LauncherRemote: Send + Sync {
    fn is_available(&self) -> BoxFuture<'_, bool>;
    fn check_for_updates<'a>(&'a self, current_version: &'a str) -> BoxFuture<'a, Result<UpdateStatus, String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(version: &str, url: Option<&str>) -> VersionEntry {
        VersionEntry {
            version: version.into(),
            package_url: url.map(str::to_owned),
        }
    }

    #[test]
    fn catalog_lookups() {
        let catalog = Catalog {
            entries: vec![
                entry("1.21.60", Some("https://example.invalid/a.zip")),
                entry("1.21.50", None),
                entry("1.21.40", Some("https://example.invalid/b.zip")),
            ],
            supported: vec!["1.21.50".into()],
        };
        assert!(catalog.is_supported("1.21.50"));
        assert!(!catalog.is_supported("1.21.60"));
        assert_eq!(catalog.latest_supported(), Some("1.21.50"));
        let installable: Vec<_> = catalog.installable().map(|e| e.version.as_str()).collect();
        assert_eq!(installable, vec!["1.21.60", "1.21.40"]);
        assert!(catalog.entry("1.21.40").is_some());
    }

    #[test]
    fn latest_supported_falls_back_to_newest_entry() {
        let catalog = Catalog {
            entries: vec![entry("1.21.60", None)],
            supported: Vec::new(),
        };
        assert_eq!(catalog.latest_supported(), Some("1.21.60"));
        assert_eq!(Catalog::default().latest_supported(), None);
    }

    #[test]
    fn cancel_is_refused_until_cancellable() {
        let request = InstallRequest::new();
        assert!(!request.cancel());
        assert!(!request.is_cancelled());
        request.set_cancellable(true);
        assert!(request.cancel());
        assert!(request.clone().is_cancelled());
    }
}
