use std::sync::Arc;
use std::time::Duration;

use eframe::egui::{
    self, Align, Frame, Layout, Pos2, Rect, UiBuilder, ViewportCommand, pos2, vec2,
};
use log::{error, info, warn};
use tokio::runtime::{Builder, Runtime};
use tokio::sync::mpsc;

use crate::anim::spinner::{DOTS, Spinner};
use crate::catalog::{PackageInstaller, RemoteCatalog};
use crate::client::FlarialClient;
use crate::config::Configuration;
use crate::dialog::DialogService;
use crate::engine::state::{AppState, UserAction};
use crate::engine::{LauncherEngine, Reporters, Services};
use crate::game::LocalGame;
use crate::networking::NetworkClient;
use crate::process::ProcessLauncher;
use crate::progress::{ProgressReporter, StatusStyle};
use crate::services::ConfigStore;
use crate::storage::run_settings_writer;

pub mod chrome;
pub mod controls;
pub mod dialog_host;
pub mod navigation;
pub mod pages;
pub mod theme;

use self::chrome::{TitleAction, WindowChrome};
use self::dialog_host::DialogHost;
use self::navigation::{Navigator, Page};
use self::pages::home::{HomeAction, HomePage, PROJECT_URL};
use self::pages::settings::SettingsPage;
use self::pages::versions::VersionsPage;
use self::pages::show_page;
use self::theme::{NAV_RAIL_WIDTH, PALETTE, SPACING_SM, apply_theme, fade};

const SPINNER_DOT: f32 = 5.0;
const SPINNER_GAP: f32 = 18.0;

pub fn build_runtime() -> Arc<Runtime> {
    match Runtime::new() {
        Ok(rt) => Arc::new(rt),
        Err(err) => {
            warn!(
                "ui: failed to create multithreaded runtime ({}); trying single-threaded runtime",
                err
            );
            match Builder::new_current_thread().enable_all().build() {
                Ok(rt) => Arc::new(rt),
                Err(fallback_err) => {
                    error!(
                        "ui: failed to create any Tokio runtime ({}); terminating launcher",
                        fallback_err
                    );
                    std::process::exit(1);
                }
            }
        }
    }
}

/// Which parts of the window accept input this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Surface {
    nav: bool,
    home: bool,
    versions: bool,
    settings: bool,
}

/// The whole surface is off while loading; a running play or install
/// locks the other action page too.
fn surface(loading: bool, playing: bool, installing: bool) -> Surface {
    let ready = !loading;
    let idle = !playing && !installing;
    Surface {
        nav: ready,
        home: ready && idle,
        versions: ready && idle,
        settings: ready && idle,
    }
}

pub struct LauncherApp {
    runtime: Arc<Runtime>,
    engine: Arc<LauncherEngine>,
    settings_queue: mpsc::UnboundedSender<Configuration>,
    dialogs: DialogService,
    updates_rx: mpsc::UnboundedReceiver<AppState>,
    updates_tx: mpsc::UnboundedSender<AppState>,
    loading: bool,
    spinner: Spinner,
    chrome: WindowChrome,
    navigator: Navigator,
    dialog_host: DialogHost,
    home: HomePage,
    versions: VersionsPage,
    settings: SettingsPage,
    close_after_install: bool,
    close_allowed: bool,
}

impl LauncherApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        runtime: Arc<Runtime>,
        store: Arc<dyn ConfigStore>,
        config: Configuration,
    ) -> Self {
        let ctx = cc.egui_ctx.clone();
        apply_theme(&ctx);

        let dialogs = DialogService::new().with_repaint(ctx.clone());
        let (home_reporter, home_sink) = ProgressReporter::channel(StatusStyle::Plain);
        let (versions_reporter, versions_sink) = ProgressReporter::channel(StatusStyle::WithPercent);

        let network = NetworkClient::new();
        let game = LocalGame::default();
        let launcher = ProcessLauncher::new(game.executable());
        let services = Services {
            game: Arc::new(game),
            client: Arc::new(FlarialClient::new(network.clone(), launcher)),
            catalog: Arc::new(RemoteCatalog::new(network.clone())),
            installer: Arc::new(PackageInstaller::new(network.clone())),
            remote: Arc::new(network),
        };
        let reporters = Reporters {
            home: home_reporter.with_repaint(ctx.clone()),
            versions: versions_reporter.with_repaint(ctx),
        };
        let engine = Arc::new(LauncherEngine::new(services, dialogs.clone(), reporters));
        let (tx, rx) = mpsc::unbounded_channel();
        let (settings_queue, pending_settings) = mpsc::unbounded_channel();
        runtime.spawn(run_settings_writer(store, pending_settings));

        let mut spinner = Spinner::new();
        spinner.start();
        let mut chrome = WindowChrome::new("Flarial Launcher");
        chrome.appear();

        let app = Self {
            runtime,
            engine,
            settings_queue,
            dialogs,
            updates_rx: rx,
            updates_tx: tx,
            loading: true,
            spinner,
            chrome,
            navigator: Navigator::new(),
            dialog_host: DialogHost::new(),
            home: HomePage::new(home_sink),
            versions: VersionsPage::new(versions_sink),
            settings: SettingsPage::new(config),
            close_after_install: false,
            close_allowed: false,
        };
        app.trigger_action(UserAction::Startup);
        app
    }

    fn trigger_action(&self, action: UserAction) {
        let engine = self.engine.clone();
        let tx = self.updates_tx.clone();
        let rt = self.runtime.clone();
        rt.spawn(async move {
            engine.handle_action(action, &tx).await;
        });
    }

    fn save_settings(&self, config: Configuration) {
        if self.settings_queue.send(config).is_err() {
            warn!("settings: writer has stopped; change not saved");
        }
    }

    fn sync_state(&mut self, ctx: &egui::Context) {
        while let Ok(state) = self.updates_rx.try_recv() {
            match state {
                AppState::Ready { catalog, installed } => {
                    self.versions.populate(&catalog, installed.as_deref());
                    self.loading = false;
                    self.spinner.stop();
                    self.navigator.show_initial();
                    self.home.reveal();
                }
                AppState::LoadFailed(err) => {
                    // The surface stays locked behind the spinner.
                    error!("ui: launcher failed to load: {err}");
                }
                AppState::Installed { version } => {
                    self.versions.mark_installed(&version);
                }
                AppState::Exit => {
                    if self.close_after_install {
                        self.close_now(ctx);
                    } else {
                        self.chrome.begin_close();
                    }
                }
            }
        }
        self.home.sync();
        self.versions.sync();
        if self.close_after_install && !self.versions.is_busy() {
            self.close_now(ctx);
        }
    }

    /// Close requested by the user. A cancellable install keeps the process
    /// alive with the window hidden until the install has wound down.
    fn request_close(&mut self, ctx: &egui::Context) {
        if self.close_after_install || self.chrome.is_closing() {
            return;
        }
        if self.engine.cancel_install() {
            info!("ui: hiding the window until the install stops");
            self.close_after_install = true;
            ctx.send_viewport_cmd(ViewportCommand::Visible(false));
            return;
        }
        self.chrome.begin_close();
    }

    fn close_now(&mut self, ctx: &egui::Context) {
        if self.close_allowed {
            return;
        }
        info!("ui: closing");
        self.close_allowed = true;
        ctx.send_viewport_cmd(ViewportCommand::Close);
    }

    fn handle_close_request(&mut self, ctx: &egui::Context) {
        if self.close_allowed {
            return;
        }
        if ctx.input(|i| i.viewport().close_requested()) {
            ctx.send_viewport_cmd(ViewportCommand::CancelClose);
            self.request_close(ctx);
        }
    }

    fn tick(&mut self, ctx: &egui::Context) {
        let dt = Duration::from_secs_f32(ctx.input(|i| i.stable_dt).clamp(0.0, 0.1));
        let mut animating = self.navigator.tick(dt);
        if self.spinner.is_running() {
            self.spinner.tick(dt);
            animating = true;
        }
        if self.chrome.tick(dt) {
            self.close_now(ctx);
        }
        if animating || self.chrome.is_animating() {
            ctx.request_repaint();
        }
    }

    fn render(&mut self, ctx: &egui::Context) {
        let surface = surface(self.loading, self.home.is_busy(), self.versions.is_busy());
        let mut title_action = None;
        let mut home_action = None;
        let mut install = None;
        let mut settings_changed = None;

        egui::CentralPanel::default()
            .frame(Frame::NONE)
            .show(ctx, |ui| {
                ui.set_opacity(self.chrome.opacity());
                let rect = self.chrome.content_rect(ui.max_rect());
                ui.painter().rect_filled(rect, 0.0, PALETTE.bg_dark);
                let mut root = ui.new_child(
                    UiBuilder::new()
                        .max_rect(rect)
                        .layout(Layout::top_down(Align::Min)),
                );
                title_action = self.chrome.show_title_bar(&mut root);

                let body = root.available_rect_before_wrap();
                let rail = Rect::from_min_size(body.min, vec2(NAV_RAIL_WIDTH, body.height()));
                let content = Rect::from_min_max(pos2(rail.right(), body.top()), body.max);
                root.painter().rect_filled(rail, 0.0, PALETTE.bg_medium);

                let mut rail_ui = root.new_child(UiBuilder::new().max_rect(rail.shrink(SPACING_SM)));
                let picked = rail_ui
                    .add_enabled_ui(surface.nav, |ui| self.navigator.show_rail(ui))
                    .inner;
                if let Some(page) = picked.filter(|_| surface.nav) {
                    self.navigator.navigate(page);
                }

                if self.loading {
                    paint_spinner(&root, content.center(), &self.spinner);
                    return;
                }
                let visible: Vec<Page> = self.navigator.visible_pages().collect();
                for page in visible {
                    let visual = self.navigator.visual(page);
                    show_page(&mut root, page, content, visual, |ui| match page {
                        Page::Home => home_action = self.home.show(ui, surface.home),
                        Page::Versions => install = self.versions.show(ui, surface.versions),
                        Page::Settings => {
                            settings_changed = self.settings.show(ui, surface.settings);
                        }
                    });
                }
            });

        self.dialog_host.show(ctx, &self.dialogs);

        match title_action {
            Some(TitleAction::Minimize) => ctx.send_viewport_cmd(ViewportCommand::Minimized(true)),
            Some(TitleAction::Close) => self.request_close(ctx),
            None => {}
        }
        match home_action {
            Some(HomeAction::Play) => {
                self.trigger_action(UserAction::Play(self.settings.config().clone()));
            }
            Some(HomeAction::OpenProject) => {
                if let Err(err) = open::that(PROJECT_URL) {
                    warn!("ui: unable to open {PROJECT_URL}: {err}");
                }
            }
            None => {}
        }
        if let Some(version) = install {
            let preflight = self.settings.config().preflight;
            self.trigger_action(UserAction::Install { version, preflight });
        }
        if let Some(config) = settings_changed {
            self.save_settings(config);
        }
    }
}

fn paint_spinner(ui: &egui::Ui, center: Pos2, spinner: &Spinner) {
    let painter = ui.painter();
    let first = center.x - SPINNER_GAP * (DOTS as f32 - 1.0) / 2.0;
    for index in 0..DOTS {
        let (scale, lift) = spinner.dot(index);
        let x = first + SPINNER_GAP * index as f32;
        painter.circle_filled(
            pos2(x, center.y + lift),
            SPINNER_DOT / 2.0 * scale,
            fade(PALETTE.accent, 0.9),
        );
    }
}

impl eframe::App for LauncherApp {
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        [0.0; 4]
    }

    fn update(&mut self, ctx: &eframe::egui::Context, _frame: &mut eframe::Frame) {
        self.handle_close_request(ctx);
        self.sync_state(ctx);
        self.tick(ctx);
        self.render(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_locks_everything() {
        let locked = surface(true, false, false);
        assert!(!locked.nav && !locked.home && !locked.versions && !locked.settings);
    }

    #[test]
    fn a_running_action_locks_the_pages_but_not_navigation() {
        let playing = surface(false, true, false);
        assert!(playing.nav);
        assert!(!playing.home);
        assert!(!playing.versions);
        let idle = surface(false, false, false);
        assert!(idle.home && idle.versions && idle.settings);
    }

    #[test]
    fn fallback_runtime_is_usable() {
        let runtime = build_runtime();
        assert_eq!(runtime.block_on(async { 2 + 2 }), 4);
    }
}
