use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::{AppState, Figure};

/// Button presses reported back to the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    GenerateHeatmap,
    GenerateDotplot,
}

// ---------------------------------------------------------------------------
// Selection panel – three menus and two buttons
// ---------------------------------------------------------------------------

fn choice(ui: &mut Ui, id: &str, caption: &str, options: &[String], current: &mut String) {
    ui.strong(caption);
    egui::ComboBox::from_id_salt(id)
        .selected_text(current.as_str())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for option in options {
                ui.selectable_value(current, option.clone(), option.as_str());
            }
        });
}

/// Render the title, the three menus and the action buttons.
pub fn selection_panel(ui: &mut Ui, state: &mut AppState) -> Option<Action> {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(RichText::new("Ligand-Receptor Interactions").size(24.0));
    });
    ui.add_space(6.0);

    let AppState {
        options, selection, ..
    } = state;

    ui.columns(3, |cols: &mut [Ui]| {
        choice(&mut cols[0], "source_cell", "Select Source Cell Type", &options.sources, &mut selection.source);
        choice(&mut cols[1], "target_cell", "Select Target Cell Type", &options.targets, &mut selection.target);
        choice(&mut cols[2], "dataset", "Select Dataset", &options.datasets, &mut selection.dataset);
    });
    ui.add_space(6.0);

    let mut action = None;
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Generate Heatmap").clicked() {
            action = Some(Action::GenerateHeatmap);
        }
        if ui.button("Generate Dotplot").clicked() {
            action = Some(Action::GenerateDotplot);
        }
    });
    ui.add_space(4.0);
    action
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            let exportable = matches!(state.figure, Some(Figure::Heatmap(_) | Figure::Dotplot { .. }));
            if ui
                .add_enabled(exportable, egui::Button::new("Export figure…"))
                .clicked()
            {
                export_figure(state);
                ui.close_menu();
            }
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
            }
        });

        ui.separator();

        ui.label(format!(
            "{} datasets loaded, showing {}",
            state.options.datasets.len(),
            state.selection.dataset
        ));

        ui.separator();

        if ui
            .selectable_label(state.show_distribution, "Weight distribution")
            .clicked()
        {
            state.show_distribution = !state.show_distribution;
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Export dialog
// ---------------------------------------------------------------------------

/// Save the current figure: the dot plot as PNG, the heatmap matrix as CSV.
pub fn export_figure(state: &mut AppState) {
    let result = match &state.figure {
        Some(Figure::Dotplot { image, .. }) => rfd::FileDialog::new()
            .set_title("Save dot plot")
            .add_filter("PNG", &["png"])
            .set_file_name(format!("dotplot_{}.png", image.dataset))
            .save_file()
            .map(|path| {
                std::fs::write(&path, &image.png[..]).map(|_| path)
            }),
        Some(Figure::Heatmap(fig)) => rfd::FileDialog::new()
            .set_title("Save heatmap matrix")
            .add_filter("CSV", &["csv"])
            .set_file_name(format!("heatmap_{}_{}_{}.csv", fig.dataset, fig.source, fig.target))
            .save_file()
            .map(|path| {
                std::fs::File::create(&path)
                    .and_then(|file| fig.matrix.write_csv(file).map_err(std::io::Error::other))
                    .map(|_| path)
            }),
        _ => None,
    };

    match result {
        Some(Ok(path)) => {
            log::info!("Exported figure to {}", path.display());
            state.status_message = None;
        }
        Some(Err(e)) => {
            log::error!("Failed to export figure: {e}");
            state.status_message = Some(format!("Error: {e}"));
        }
        None => {}
    }
}
