//! Single-flight modal dialogs.
//!
//! A [`DialogService`] owns one visible-dialog slot guarded by a one-permit
//! semaphore. Callers on any task `await` [`DialogService::show`]; the second
//! caller waits until the first dialog has been answered. The UI thread
//! reads the slot each frame and answers through [`DialogService::respond`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use eframe::egui;
use log::{debug, warn};
use tokio::sync::{Semaphore, oneshot};

/// The fixed set of messages the launcher shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogContent {
    NotInstalled,
    NotSigned,
    UnsignedInstallation,
    InvalidCustomDll,
    UnsupportedVersion { installed: String, supported: String },
    ClientUpdateFailure,
    LaunchFailure,
    ConnectionFailure,
    LauncherUpdateAvailable { version: String },
    BetaDllEnabled,
    InstallFailure { details: String },
    LoadError { details: String },
}

impl DialogContent {
    pub fn title(&self) -> &'static str {
        match self {
            DialogContent::NotInstalled => "Minecraft Not Installed",
            DialogContent::NotSigned | DialogContent::UnsignedInstallation => "Unsigned Installation",
            DialogContent::InvalidCustomDll => "Invalid Custom DLL",
            DialogContent::UnsupportedVersion { .. } => "Unsupported Version",
            DialogContent::ClientUpdateFailure => "Update Failed",
            DialogContent::LaunchFailure => "Launch Failed",
            DialogContent::ConnectionFailure => "Connection Failure",
            DialogContent::LauncherUpdateAvailable { .. } => "Launcher Update Available",
            DialogContent::BetaDllEnabled => "Beta DLL Enabled",
            DialogContent::InstallFailure { .. } => "Install Failed",
            DialogContent::LoadError { .. } => "Load Error",
        }
    }

    pub fn message(&self) -> String {
        match self {
            DialogContent::NotInstalled => {
                "Minecraft doesn't seem to be installed.\n\nPlease install Minecraft from the Versions page or the Microsoft Store, then try again.".into()
            }
            DialogContent::NotSigned => {
                "This Minecraft installation isn't signed.\n\nFlarial Client only supports signed installations. Please reinstall Minecraft and try again.".into()
            }
            DialogContent::UnsignedInstallation => {
                "This Minecraft installation isn't packaged.\n\nDevelopment kit installs must be packaged to be used with Flarial Client.".into()
            }
            DialogContent::InvalidCustomDll => {
                "The custom DLL path is empty or doesn't point to a valid library.\n\nPick a valid DLL on the Settings page.".into()
            }
            DialogContent::UnsupportedVersion {
                installed,
                supported,
            } => format!(
                "Minecraft {installed} isn't compatible with Flarial Client.\n\nPlease switch to Minecraft {supported} for the best experience.\nYou may switch versions by going to the Versions page in the launcher.\n\nIf you need help, join our Discord."
            ),
            DialogContent::ClientUpdateFailure => {
                "Flarial Client couldn't be downloaded or verified.\n\nCheck your internet connection and try again.".into()
            }
            DialogContent::LaunchFailure => {
                "Minecraft couldn't be launched with Flarial Client.\n\nMake sure the game isn't already running and try again.".into()
            }
            DialogContent::ConnectionFailure => {
                "The launcher couldn't reach Flarial's servers.\n\nYou can continue offline, but downloads and updates won't work.".into()
            }
            DialogContent::LauncherUpdateAvailable { version } => format!(
                "Launcher {version} is available.\n\nWould you like to open the download page now?"
            ),
            DialogContent::BetaDllEnabled => {
                "You're about to launch the beta build of Flarial Client.\n\nBeta builds may be unstable. Go back to cancel or continue to launch anyway.".into()
            }
            DialogContent::InstallFailure { details } => format!(
                "The selected version couldn't be installed.\n\n{details}"
            ),
            DialogContent::LoadError { details } => details.clone(),
        }
    }

    pub fn primary(&self) -> &'static str {
        match self {
            DialogContent::ConnectionFailure => "Continue",
            DialogContent::LauncherUpdateAvailable { .. } => "Update",
            DialogContent::InstallFailure { .. } | DialogContent::LoadError { .. } => "OK",
            _ => "Back",
        }
    }

    pub fn secondary(&self) -> Option<&'static str> {
        match self {
            DialogContent::ConnectionFailure => Some("Exit"),
            DialogContent::LauncherUpdateAvailable { .. } => Some("Later"),
            DialogContent::BetaDllEnabled => Some("Continue"),
            _ => None,
        }
    }
}

/// The dialog currently on screen, as read by the UI thread.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DialogView {
    pub id: u64,
    pub title: String,
    pub message: String,
    pub primary: String,
    pub secondary: Option<String>,
}

struct Pending {
    view: DialogView,
    reply: oneshot::Sender<bool>,
}

#[derive(Clone)]
pub struct DialogService {
    permit: Arc<Semaphore>,
    slot: Arc<Mutex<Option<Pending>>>,
    next_id: Arc<AtomicU64>,
    repaint: Option<egui::Context>,
}

impl Default for DialogService {
    fn default() -> Self {
        Self::new()
    }
}

impl DialogService {
    pub fn new() -> Self {
        Self {
            permit: Arc::new(Semaphore::new(1)),
            slot: Arc::new(Mutex::new(None)),
            next_id: Arc::new(AtomicU64::new(1)),
            repaint: None,
        }
    }

    #[must_use]
    pub fn with_repaint(mut self, ctx: egui::Context) -> Self {
        self.repaint = Some(ctx);
        self
    }

    /// Show a dialog and wait for the answer: `true` for the primary button,
    /// `false` for the secondary one. Waits for any earlier dialog first.
    pub async fn show(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
        primary: impl Into<String>,
        secondary: Option<String>,
    ) -> bool {
        let Ok(_permit) = self.permit.acquire().await else {
            warn!("dialog: semaphore closed; treating as dismissed");
            return false;
        };
        let (reply, answer) = oneshot::channel();
        let view = DialogView {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            title: title.into(),
            message: message.into(),
            primary: primary.into(),
            secondary,
        };
        debug!("dialog: showing '{}' (#{})", view.title, view.id);
        *self.lock() = Some(Pending { view, reply });
        if let Some(ctx) = &self.repaint {
            ctx.request_repaint();
        }
        answer.await.unwrap_or(false)
    }

    pub async fn show_content(&self, content: &DialogContent) -> bool {
        self.show(
            content.title(),
            content.message(),
            content.primary(),
            content.secondary().map(str::to_owned),
        )
        .await
    }

    /// Snapshot of the visible dialog.
    pub fn current(&self) -> Option<DialogView> {
        self.lock().as_ref().map(|pending| pending.view.clone())
    }

    /// Answer the visible dialog and free the slot for the next caller.
    pub fn respond(&self, result: bool) {
        let pending = self.lock().take();
        match pending {
            Some(pending) => {
                debug!("dialog: #{} answered {}", pending.view.id, result);
                let _ = pending.reply.send(result);
            }
            None => warn!("dialog: respond called with no dialog visible"),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Pending>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    async fn wait_for_dialog(service: &DialogService, title: &str) -> DialogView {
        for _ in 0..200 {
            if let Some(view) = service.current()
                && view.title == title
            {
                return view;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("dialog '{title}' never appeared");
    }

    #[tokio::test]
    async fn concurrent_dialogs_are_serialized() {
        let service = DialogService::new();
        let first = tokio::spawn({
            let service = service.clone();
            async move { service.show("First", "one", "OK", None).await }
        });
        let shown = wait_for_dialog(&service, "First").await;

        let second = tokio::spawn({
            let service = service.clone();
            async move {
                service
                    .show("Second", "two", "Yes", Some("No".into()))
                    .await
            }
        });
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(service.current().map(|v| v.id), Some(shown.id));
        assert_eq!(service.permit.available_permits(), 0);

        service.respond(true);
        assert!(first.await.unwrap());

        let next = wait_for_dialog(&service, "Second").await;
        assert_eq!(next.secondary.as_deref(), Some("No"));
        service.respond(false);
        assert!(!second.await.unwrap());
        assert_eq!(service.permit.available_permits(), 1);
        assert!(service.current().is_none());
    }

    #[tokio::test]
    async fn content_supplies_buttons() {
        let service = DialogService::new();
        let task = tokio::spawn({
            let service = service.clone();
            async move { service.show_content(&DialogContent::ConnectionFailure).await }
        });
        let view = wait_for_dialog(&service, "Connection Failure").await;
        assert_eq!(view.primary, "Continue");
        assert_eq!(view.secondary.as_deref(), Some("Exit"));
        service.respond(false);
        assert!(!task.await.unwrap());
    }

    #[test]
    fn unsupported_version_names_both_versions() {
        let content = DialogContent::UnsupportedVersion {
            installed: "1.20.0".into(),
            supported: "1.21.50".into(),
        };
        let message = content.message();
        assert!(message.contains("1.20.0"));
        assert!(message.contains("1.21.50"));
    }
}
