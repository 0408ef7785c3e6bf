use crate::config::ViewerConfig;
use crate::data::store::DatasetStore;
use crate::error::RenderError;
use crate::render::Outcome;
use crate::render::dotplot::DotplotImage;
use crate::render::heatmap::HeatmapFigure;

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// The three menu choices of one interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub source: String,
    pub target: String,
    pub dataset: String,
}

/// The closed sets offered by the three menus.
#[derive(Debug, Clone)]
pub struct SelectionOptions {
    pub sources: Vec<String>,
    pub targets: Vec<String>,
    pub datasets: Vec<String>,
}

impl SelectionOptions {
    pub fn new(config: &ViewerConfig, store: &DatasetStore) -> Self {
        Self {
            sources: config.source_labels.clone(),
            targets: config.target_labels.clone(),
            datasets: store.names(),
        }
    }

    /// First entry of every menu.
    pub fn default_selection(&self) -> Selection {
        let first = |v: &[String]| v.first().cloned().unwrap_or_default();
        Selection {
            source: first(&self.sources),
            target: first(&self.targets),
            dataset: first(&self.datasets),
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// What the central panel currently shows.
#[derive(Debug, Clone)]
pub enum Figure {
    Heatmap(HeatmapFigure),
    Dotplot {
        image: DotplotImage,
        /// Unique per render so egui never shows a stale cached texture.
        uri: String,
    },
    Empty { message: String },
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub options: SelectionOptions,
    pub selection: Selection,

    /// Last generated figure (None until a button is pressed).
    pub figure: Option<Figure>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether the weight-distribution panel is open.
    pub show_distribution: bool,

    /// Number of dot plots rendered so far.
    generation: u64,
}

impl AppState {
    pub fn new(options: SelectionOptions) -> Self {
        let selection = options.default_selection();
        Self {
            options,
            selection,
            figure: None,
            status_message: None,
            show_distribution: false,
            generation: 0,
        }
    }

    /// Take the result of a "Generate Heatmap" request.
    pub fn show_heatmap(&mut self, result: Result<Outcome<HeatmapFigure>, RenderError>) {
        match result {
            Ok(Outcome::Ready(fig)) => self.set_figure(Figure::Heatmap(fig)),
            Ok(Outcome::Empty { message }) => self.set_figure(Figure::Empty { message }),
            Err(e) => self.fail(e),
        }
    }

    /// Take the result of a "Generate Dotplot" request.
    pub fn show_dotplot(&mut self, result: Result<Outcome<DotplotImage>, RenderError>) {
        match result {
            Ok(Outcome::Ready(image)) => {
                self.generation += 1;
                let uri = format!("bytes://dotplot-{}.png", self.generation);
                self.set_figure(Figure::Dotplot { image, uri });
            }
            Ok(Outcome::Empty { message }) => self.set_figure(Figure::Empty { message }),
            Err(e) => self.fail(e),
        }
    }

    fn set_figure(&mut self, figure: Figure) {
        self.figure = Some(figure);
        self.status_message = None;
    }

    /// Keep the previous figure; only report the error.
    fn fail(&mut self, error: RenderError) {
        log::error!("Render failed: {error}");
        self.status_message = Some(format!("Error: {error}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::heatmap::HeatmapMatrix;

    fn options() -> SelectionOptions {
        SelectionOptions {
            sources: vec!["Adipocytes".into(), "SMCs".into()],
            targets: vec!["Fibroblasts".into()],
            datasets: vec!["8w_ctrl_male".into(), "8w_hf_male".into()],
        }
    }

    #[test]
    fn first_entries_are_the_default() {
        let state = AppState::new(options());
        assert_eq!(
            state.selection,
            Selection {
                source: "Adipocytes".into(),
                target: "Fibroblasts".into(),
                dataset: "8w_ctrl_male".into(),
            }
        );
        assert!(state.figure.is_none());
    }

    #[test]
    fn menus_follow_config_and_store_order() {
        let config = ViewerConfig::default();
        let store = DatasetStore::from_datasets(vec![
            crate::data::model::Dataset::new("24w_hf_female"),
            crate::data::model::Dataset::new("8w_ctrl_male"),
        ]);
        let opts = SelectionOptions::new(&config, &store);
        assert_eq!(opts.datasets, vec!["24w_hf_female", "8w_ctrl_male"]);
        assert_eq!(opts.sources, config.source_labels);
    }

    #[test]
    fn error_keeps_previous_figure_and_next_success_clears_it() {
        let mut state = AppState::new(options());
        state.show_heatmap(Ok(Outcome::Ready(HeatmapFigure {
            dataset: "8w_ctrl_male".into(),
            source: "Adipocytes".into(),
            target: "Fibroblasts".into(),
            matrix: HeatmapMatrix {
                ligands: vec!["A".into()],
                receptors: vec!["B".into()],
                values: vec![vec![1.5]],
            },
            row_count: 1,
        })));

        state.show_dotplot(Err(RenderError::UnknownField("lr_means".into())));
        assert!(matches!(state.figure, Some(Figure::Heatmap(_))));
        assert!(state.status_message.as_deref().unwrap().contains("lr_means"));

        state.show_heatmap(Ok(Outcome::Empty {
            message: "nothing".into(),
        }));
        assert!(matches!(state.figure, Some(Figure::Empty { .. })));
        assert!(state.status_message.is_none());
    }
}
