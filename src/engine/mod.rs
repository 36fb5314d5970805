use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, error, info, warn};
use tokio::sync::mpsc;

use crate::config::{Configuration, DllBuild, PreflightPolicy};
use crate::dialog::{DialogContent, DialogService};
use crate::engine::state::{AppState, UserAction};
use crate::progress::{Phase, ProgressReporter};
use crate::services::{
    Catalog, ClientBuild, ClientService, GameInfo, GameInstallation, InstallRequest, Installer,
    LauncherRemote, VersionCatalog,
};
use crate::updater::UpdateStatus;

pub mod state;

/// External collaborators of the launcher flows.
#[derive(Clone)]
pub struct Services {
    pub game: Arc<dyn GameInstallation>,
    pub client: Arc<dyn ClientService>,
    pub catalog: Arc<dyn VersionCatalog>,
    pub installer: Arc<dyn Installer>,
    pub remote: Arc<dyn LauncherRemote>,
}

/// Progress channels of the pages that show activity.
#[derive(Clone)]
pub struct Reporters {
    pub home: ProgressReporter,
    pub versions: ProgressReporter,
}

pub struct LauncherEngine {
    services: Services,
    dialogs: DialogService,
    reporters: Reporters,
    catalog: Mutex<Catalog>,
    install: Mutex<Option<InstallRequest>>,
}

impl LauncherEngine {
    pub fn new(services: Services, dialogs: DialogService, reporters: Reporters) -> Self {
        Self {
            services,
            dialogs,
            reporters,
            catalog: Mutex::new(Catalog::default()),
            install: Mutex::new(None),
        }
    }

    pub async fn handle_action(&self, action: UserAction, updates: &mpsc::UnboundedSender<AppState>) {
        match action {
            UserAction::Startup => {
                info!("action: Startup");
                self.startup(updates).await;
            }
            UserAction::Play(config) => {
                info!("action: Play ({:?} build)", config.dll_build);
                self.play(&config).await;
            }
            UserAction::Install { version, preflight } => {
                info!("action: Install {version}");
                self.install(&version, preflight, updates).await;
            }
        }
    }

    /// Connectivity, launcher update and catalog, in that order.
    pub async fn startup(&self, updates: &mpsc::UnboundedSender<AppState>) {
        if !self.services.remote.is_available().await {
            warn!("startup: remote services unreachable");
            if !self.dialogs.show_content(&DialogContent::ConnectionFailure).await {
                info!("startup: user chose to exit");
                updates.send(AppState::Exit).ok();
                return;
            }
        }

        match self
            .services
            .remote
            .check_for_updates(env!("CARGO_PKG_VERSION"))
            .await
        {
            Ok(UpdateStatus::UpdateAvailable {
                latest_version,
                url,
            }) => {
                let content = DialogContent::LauncherUpdateAvailable {
                    version: latest_version,
                };
                if self.dialogs.show_content(&content).await {
                    info!("startup: opening {url}");
                    if let Err(err) = open::that(&url) {
                        error!("startup: unable to open release page: {err}");
                    }
                    updates.send(AppState::Exit).ok();
                    return;
                }
            }
            Ok(UpdateStatus::UpToDate) => debug!("startup: launcher is up to date"),
            Err(err) => warn!("startup: update check failed: {err}"),
        }

        match self.services.catalog.load().await {
            Ok(catalog) => {
                let installed = self.services.game.inspect().version;
                *lock(&self.catalog) = catalog.clone();
                info!("startup: ready (installed {:?})", installed);
                updates.send(AppState::Ready { catalog, installed }).ok();
            }
            Err(err) => {
                error!("startup: {err}");
                updates.send(AppState::LoadFailed(err.clone())).ok();
                let details = format!("Load error: {err}");
                self.dialogs
                    .show_content(&DialogContent::LoadError { details })
                    .await;
            }
        }
    }

    /// The Play button. The home page is busy from `started` to `finished`
    /// whatever happens in between.
    pub async fn play(&self, config: &Configuration) {
        let progress = &self.reporters.home;
        progress.started();
        self.run_play(config, progress).await;
        progress.finished();
        info!("play: flow finished");
    }

    async fn run_play(&self, config: &Configuration, progress: &ProgressReporter) {
        let game = self.services.game.inspect();
        if let Some(refusal) = preflight(&game, config.preflight) {
            self.refuse(refusal).await;
            return;
        }

        let custom = config.dll_build == DllBuild::Custom;
        let mut beta = config.dll_build == DllBuild::Beta;
        if config.preflight == PreflightPolicy::Signed {
            beta |= game.development_kit;
        }
        let build = if beta {
            ClientBuild::Beta
        } else {
            ClientBuild::Release
        };

        if !custom && !beta {
            let catalog = lock(&self.catalog).clone();
            let installed = game.version.clone().unwrap_or_default();
            if !catalog.is_supported(&installed) {
                self.refuse(DialogContent::UnsupportedVersion {
                    installed,
                    supported: catalog.latest_supported().unwrap_or("unknown").to_owned(),
                })
                .await;
                return;
            }
        }

        if custom {
            let client = &self.services.client;
            let Some(library) = config
                .custom_path()
                .filter(|path| client.is_valid_library(path))
            else {
                self.refuse(DialogContent::InvalidCustomDll).await;
                return;
            };
            progress.status("Launching...", true);
            if let Err(err) = client
                .launch_custom(library, config.wait_for_initialization)
                .await
            {
                error!("play: custom launch failed: {err}");
                self.dialogs.show_content(&DialogContent::LaunchFailure).await;
            }
            return;
        }

        if config.preflight == PreflightPolicy::Packaged && beta && self.beta_declined().await {
            return;
        }

        progress.status("Verifying...", true);
        let reporter = progress.clone();
        let download = self
            .services
            .client
            .download(build, Box::new(move |percent: f32| reporter.report(Phase::Downloading, percent)))
            .await;
        if let Err(err) = download {
            error!("play: client update failed: {err}");
            self.dialogs
                .show_content(&DialogContent::ClientUpdateFailure)
                .await;
            return;
        }

        progress.status("Launching...", true);
        if config.preflight == PreflightPolicy::Signed && beta && self.beta_declined().await {
            return;
        }

        if let Err(err) = self
            .services
            .client
            .launch(build, config.wait_for_initialization)
            .await
        {
            error!("play: launch failed: {err}");
            self.dialogs.show_content(&DialogContent::LaunchFailure).await;
            return;
        }
        info!("play: {} build launched", build.name());
    }

    /// Install the catalog entry for `version` through the versions page.
    pub async fn install(
        &self,
        version: &str,
        policy: PreflightPolicy,
        updates: &mpsc::UnboundedSender<AppState>,
    ) {
        let progress = &self.reporters.versions;
        progress.started();
        self.run_install(version, policy, progress, updates).await;
        progress.finished();
        info!("install: flow finished");
    }

    async fn run_install(
        &self,
        version: &str,
        policy: PreflightPolicy,
        progress: &ProgressReporter,
        updates: &mpsc::UnboundedSender<AppState>,
    ) {
        let game = self.services.game.inspect();
        if let Some(refusal) = install_preflight(&game, policy) {
            self.refuse(refusal).await;
            return;
        }

        let Some(entry) = lock(&self.catalog).entry(version).cloned() else {
            warn!("install: {version} is not in the catalog");
            return;
        };

        let request = InstallRequest::new();
        *lock(&self.install) = Some(request.clone());
        let result = self
            .services
            .installer
            .install(&entry, progress.clone(), request.clone())
            .await;
        *lock(&self.install) = None;

        match result {
            Ok(true) => {
                info!("install: {version} installed");
                updates
                    .send(AppState::Installed {
                        version: version.to_owned(),
                    })
                    .ok();
            }
            Ok(false) => {
                warn!("install: {version} did not complete; closing");
                updates.send(AppState::Exit).ok();
            }
            // Nobody is looking at the window once a close has cancelled the install.
            Err(err) if request.is_cancelled() => {
                warn!("install: {version} failed after cancellation: {err}; closing");
                updates.send(AppState::Exit).ok();
            }
            Err(err) => {
                error!("install: {version} failed: {err}");
                self.dialogs
                    .show_content(&DialogContent::InstallFailure { details: err })
                    .await;
            }
        }
    }

    /// Cancel the running install. Returns whether the installer honoured it.
    pub fn cancel_install(&self) -> bool {
        let honoured = lock(&self.install)
            .as_ref()
            .is_some_and(InstallRequest::cancel);
        if honoured {
            warn!("install: cancellation requested");
        }
        honoured
    }

    async fn refuse(&self, content: DialogContent) {
        warn!("preflight: {}", content.title());
        self.dialogs.show_content(&content).await;
    }

    /// `true` when the user backs out of the beta prompt.
    async fn beta_declined(&self) -> bool {
        self.dialogs.show_content(&DialogContent::BetaDllEnabled).await
    }
}

/// Installation check for the Play flow.
fn preflight(game: &GameInfo, policy: PreflightPolicy) -> Option<DialogContent> {
    if !game.installed {
        return Some(DialogContent::NotInstalled);
    }
    match policy {
        PreflightPolicy::Signed if !game.signed => Some(DialogContent::NotSigned),
        PreflightPolicy::Packaged if game.development_kit && !game.packaged => {
            Some(DialogContent::UnsignedInstallation)
        }
        _ => None,
    }
}

/// Installation check for the Install flow; packaged mode requires a
/// packaged install whatever its origin.
fn install_preflight(game: &GameInfo, policy: PreflightPolicy) -> Option<DialogContent> {
    if !game.installed {
        return Some(DialogContent::NotInstalled);
    }
    match policy {
        PreflightPolicy::Signed if !game.signed => Some(DialogContent::NotSigned),
        PreflightPolicy::Packaged if !game.packaged => Some(DialogContent::UnsignedInstallation),
        _ => None,
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
