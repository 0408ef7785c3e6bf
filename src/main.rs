mod actions;
mod app;
mod color;
mod config;
mod data;
mod error;
mod render;
mod state;
mod ui;

use std::path::Path;

use anyhow::Context;
use app::LrViewerApp;
use config::{CONFIG_FILE, ViewerConfig};
use data::store::DatasetStore;
use eframe::egui;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // Everything is loaded before the window opens; any failure is fatal.
    let config = ViewerConfig::load_or_default(Path::new(CONFIG_FILE))?;
    let store = DatasetStore::load(&config.dataset_paths(), &config.interactions_key)
        .inspect_err(|e| log::error!("{e}"))?;

    if store.is_empty() {
        log::warn!("No datasets configured; the dataset menu will be empty");
    } else {
        log::info!("{} datasets ready", store.len());
    }

    let mut known = config.source_labels.clone();
    known.extend(config.target_labels.iter().cloned());
    for (dataset, label) in store.unlisted_labels(&config.interactions_key, &known) {
        log::warn!("{dataset}: cell type '{label}' is not offered in the menus");
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Ligand-Receptor Interactions",
        options,
        Box::new(|cc| {
            // Install image loaders so egui can decode the dot plot PNG.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(LrViewerApp::new(config, store)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
    .context("running the viewer window")
}
