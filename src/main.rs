use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use env_logger::Env;
use log::{info, warn};

mod anim;
mod catalog;
mod client;
mod config;
mod dialog;
mod engine;
mod env;
mod game;
mod networking;
mod process;
mod progress;
mod services;
mod storage;
mod ui;
mod updater;
mod util;

use crate::config::Configuration;
use crate::services::ConfigStore;
use crate::storage::StorageManager;

const WINDOW_SIZE: [f32; 2] = [960.0, 540.0];

#[derive(Parser, Debug)]
#[command(
    name = "Flarial Launcher",
    author,
    version,
    about = "Launcher for the Flarial Minecraft Bedrock client"
)]
struct Cli {
    /// Print launcher version and exit without starting the UI.
    #[arg(long)]
    version_only: bool,

    /// Read and write settings at this path instead of the default location.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if cli.version_only {
        println!("Flarial Launcher {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let runtime = ui::build_runtime();
    let storage = StorageManager::new(cli.config);
    let config = runtime
        .block_on(storage.load())
        .unwrap_or_else(|err| {
            warn!("settings: {err}; using defaults");
            Configuration::default()
        });
    info!("settings: loaded from {}", storage.settings_path().display());

    let hardware_acceleration = if config.hardware_acceleration {
        eframe::HardwareAcceleration::Preferred
    } else {
        eframe::HardwareAcceleration::Off
    };
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_icon(default_icon())
            .with_decorations(false)
            .with_resizable(false)
            .with_transparent(true)
            .with_inner_size(eframe::egui::vec2(WINDOW_SIZE[0], WINDOW_SIZE[1])),
        hardware_acceleration,
        centered: true,
        ..Default::default()
    };
    eframe::run_native(
        "Flarial Launcher",
        options,
        Box::new(move |cc| {
            Ok(Box::new(ui::LauncherApp::new(
                cc,
                runtime,
                Arc::new(storage),
                config,
            )))
        }),
    )
}

fn default_icon() -> eframe::egui::IconData {
    // 2x2 icon: dark background with the red accent.
    let rgba: Vec<u8> = vec![
        13, 13, 13, 255, 255, 36, 56, 255, //
        255, 36, 56, 255, 13, 13, 13, 255,
    ];
    eframe::egui::IconData {
        rgba,
        width: 2,
        height: 2,
    }
}
