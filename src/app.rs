use eframe::egui;

use crate::actions;
use crate::config::ViewerConfig;
use crate::data::store::DatasetStore;
use crate::state::{AppState, Figure, SelectionOptions};
use crate::ui::panels::{self, Action};
use crate::ui::plot;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct LrViewerApp {
    config: ViewerConfig,
    store: DatasetStore,
    state: AppState,
}

impl LrViewerApp {
    /// Takes ownership of the already-loaded store for the whole session.
    pub fn new(config: ViewerConfig, store: DatasetStore) -> Self {
        let state = AppState::new(SelectionOptions::new(&config, &store));
        Self {
            config,
            store,
            state,
        }
    }

    fn dispatch(&mut self, ctx: &egui::Context, action: Action) {
        match action {
            Action::GenerateHeatmap => {
                let result = actions::generate_heatmap(&mut self.store, &self.state.selection, &self.config);
                self.state.show_heatmap(result);
            }
            Action::GenerateDotplot => {
                if let Some(Figure::Dotplot { uri, .. }) = &self.state.figure {
                    ctx.forget_image(uri);
                }
                let max_side = ctx.input(|i| i.max_texture_side).min(u32::MAX as usize) as u32;
                let result =
                    actions::generate_dotplot(&mut self.store, &self.state.selection, &self.config, max_side);
                self.state.show_dotplot(result);
            }
        }
    }
}

impl eframe::App for LrViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Selection: menus and buttons ----
        let action = egui::TopBottomPanel::top("selection_panel")
            .show(ctx, |ui| panels::selection_panel(ui, &mut self.state))
            .inner;
        if let Some(action) = action {
            self.dispatch(ctx, action);
        }

        // ---- Bottom panel: weight distribution ----
        if self.state.show_distribution {
            let table = self
                .store
                .get(&self.state.selection.dataset)
                .and_then(|d| d.table(&self.config.interactions_key));
            if let Some(table) = table {
                egui::TopBottomPanel::bottom("distribution_panel")
                    .resizable(true)
                    .show(ctx, |ui| {
                        plot::weight_distribution(ui, table, &self.config);
                    });
            }
        }

        // ---- Central panel: figure ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::figure_view(ui, &self.state);
        });
    }
}
