//! One function per button: take the store and the current selection,
//! return what to show.

use crate::config::ViewerConfig;
use crate::data::filter::above_weight;
use crate::data::model::InteractionTable;
use crate::data::store::DatasetStore;
use crate::error::RenderError;
use crate::render::Outcome;
use crate::render::dotplot::{DotplotImage, DotplotSpec, render_dotplot};
use crate::render::heatmap::{HeatmapFigure, build_heatmap};
use crate::state::Selection;

/// Numeric column driving both dot colour and dot size.
const DOTPLOT_FIELD: &str = "weight";

/// Filter the selected dataset's interactions at both thresholds.  The dot
/// plot view is cached into the dataset under `filtered_key`, replacing the
/// previous one; the heatmap view is returned.
pub fn refresh_views(
    store: &mut DatasetStore,
    selection: &Selection,
    config: &ViewerConfig,
) -> Result<InteractionTable, RenderError> {
    let dataset = store
        .get_mut(&selection.dataset)
        .ok_or_else(|| RenderError::UnknownDataset(selection.dataset.clone()))?;
    let raw = dataset
        .table(&config.interactions_key)
        .ok_or_else(|| RenderError::MissingTable {
            dataset: selection.dataset.clone(),
            key: config.interactions_key.clone(),
        })?;

    let heatmap_view = above_weight(raw, config.heatmap_threshold);
    let dotplot_view = above_weight(raw, config.dotplot_threshold);
    log::debug!(
        "{}: {} of {} rows above {}, {} above {}",
        selection.dataset,
        heatmap_view.len(),
        raw.len(),
        config.heatmap_threshold,
        dotplot_view.len(),
        config.dotplot_threshold
    );

    dataset.put_table(&config.filtered_key, dotplot_view);
    Ok(heatmap_view)
}

/// "Generate Heatmap".
pub fn generate_heatmap(
    store: &mut DatasetStore,
    selection: &Selection,
    config: &ViewerConfig,
) -> Result<Outcome<HeatmapFigure>, RenderError> {
    let view = refresh_views(store, selection, config)?;
    let outcome = build_heatmap(&selection.dataset, &view, &selection.source, &selection.target);

    match &outcome {
        Outcome::Ready(fig) => log::info!(
            "Heatmap {} -> {} on {}: {} ligands x {} receptors",
            fig.source,
            fig.target,
            fig.dataset,
            fig.matrix.ligands.len(),
            fig.matrix.receptors.len()
        ),
        Outcome::Empty { message } => log::warn!("{message}"),
    }
    Ok(outcome)
}

/// "Generate Dotplot".  `max_side` bounds the raster, normally the largest
/// texture the renderer accepts.
pub fn generate_dotplot(
    store: &mut DatasetStore,
    selection: &Selection,
    config: &ViewerConfig,
    max_side: u32,
) -> Result<Outcome<DotplotImage>, RenderError> {
    refresh_views(store, selection, config)?;
    let dataset = store
        .get(&selection.dataset)
        .ok_or_else(|| RenderError::UnknownDataset(selection.dataset.clone()))?;

    let spec = DotplotSpec {
        colour: DOTPLOT_FIELD,
        size: DOTPLOT_FIELD,
        source_labels: &config.source_labels,
        target_labels: &config.target_labels,
        uns_key: &config.filtered_key,
        max_side,
    };
    let outcome = render_dotplot(dataset, &spec)?;

    match &outcome {
        Outcome::Ready(img) => log::info!(
            "Dot plot for {}: {} dots, {}x{} px",
            img.dataset,
            img.dot_count,
            img.width,
            img.height
        ),
        Outcome::Empty { message } => log::warn!("{message}"),
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{mixed_table, row};
    use crate::data::model::Dataset;

    const SIDE: u32 = 16_384;

    fn store_with(table: InteractionTable) -> (DatasetStore, ViewerConfig) {
        let config = ViewerConfig::default();
        let mut ds = Dataset::new("8w_ctrl_male");
        ds.put_table(&config.interactions_key, table);
        (DatasetStore::from_datasets(vec![ds]), config)
    }

    fn selection(source: &str, target: &str) -> Selection {
        Selection {
            source: source.to_string(),
            target: target.to_string(),
            dataset: "8w_ctrl_male".to_string(),
        }
    }

    #[test]
    fn heatmap_scenario_from_the_store() {
        let (mut store, config) = store_with(InteractionTable::new(vec![
            row("Adipocytes", "Fibroblasts", "A", "B", 1.5),
            row("Adipocytes", "Fibroblasts", "A", "B", 0.5),
        ]));
        let out = generate_heatmap(&mut store, &selection("Adipocytes", "Fibroblasts"), &config).unwrap();
        let Outcome::Ready(fig) = out else {
            panic!("expected a heatmap");
        };
        assert_eq!(fig.matrix.values, vec![vec![1.5]]);
    }

    #[test]
    fn every_request_caches_the_dotplot_view() {
        let (mut store, config) = store_with(mixed_table());
        generate_heatmap(&mut store, &selection("Adipocytes", "Fibroblasts"), &config).unwrap();

        let cached = store
            .get("8w_ctrl_male")
            .unwrap()
            .table(&config.filtered_key)
            .unwrap()
            .clone();
        assert_eq!(cached.len(), 2);
        assert!(cached.iter().all(|r| r.weight > 1.25));

        // A second request overwrites with the same content.
        refresh_views(&mut store, &selection("SMCs", "SMCs"), &config).unwrap();
        let again = store.get("8w_ctrl_male").unwrap().table(&config.filtered_key).unwrap();
        assert_eq!(again, &cached);
    }

    #[test]
    fn raw_table_is_left_alone() {
        let (mut store, config) = store_with(mixed_table());
        generate_dotplot(&mut store, &selection("Adipocytes", "Fibroblasts"), &config, SIDE).unwrap();
        let raw = store.get("8w_ctrl_male").unwrap().table(&config.interactions_key).unwrap();
        assert_eq!(raw, &mixed_table());
    }

    #[test]
    fn nothing_above_dotplot_threshold_is_empty_state() {
        let (mut store, config) = store_with(InteractionTable::new(vec![
            row("Adipocytes", "Fibroblasts", "A", "B", 1.0),
            row("Pericytes", "SMCs", "C", "D", 1.25),
        ]));
        let out = generate_dotplot(&mut store, &selection("Adipocytes", "Fibroblasts"), &config, SIDE).unwrap();
        assert!(matches!(out, Outcome::Empty { .. }));
        let cached = store.get("8w_ctrl_male").unwrap().table(&config.filtered_key).unwrap();
        assert!(cached.is_empty());
    }

    #[test]
    fn dotplot_renders_from_cached_view() {
        let (mut store, config) = store_with(mixed_table());
        let out = generate_dotplot(&mut store, &selection("Adipocytes", "Fibroblasts"), &config, SIDE).unwrap();
        let Outcome::Ready(img) = out else {
            panic!("expected an image");
        };
        // Lep -> Lepr (1.9) and Cxcl12 -> Cxcr4 (1.3) only.
        assert_eq!(img.dot_count, 2);
        assert!(!img.artifact.exists());
    }

    #[test]
    fn hundreds_of_interactions_fit_one_figure() {
        let table: InteractionTable = (0..700)
            .map(|i| row("Adipocytes", "Fibroblasts", &format!("L{i}"), &format!("R{i}"), 2.0))
            .collect();
        let (mut store, config) = store_with(table);
        let out = generate_dotplot(&mut store, &selection("Adipocytes", "Fibroblasts"), &config, SIDE).unwrap();
        let Outcome::Ready(img) = out else {
            panic!("expected an image");
        };
        assert_eq!(img.dot_count, 700);
        assert!(img.width <= SIDE && img.height <= SIDE);
    }

    #[test]
    fn unselectable_pair_gives_empty_heatmap() {
        let (mut store, config) = store_with(mixed_table());
        let out = generate_heatmap(&mut store, &selection("Neuronal_Cells", "Adipocytes"), &config).unwrap();
        assert!(matches!(out, Outcome::Empty { .. }));
    }

    #[test]
    fn unknown_dataset_is_reported() {
        let (mut store, config) = store_with(mixed_table());
        let mut sel = selection("Adipocytes", "Fibroblasts");
        sel.dataset = "12w_ctrl_male".to_string();
        let err = generate_heatmap(&mut store, &sel, &config).unwrap_err();
        assert!(matches!(err, RenderError::UnknownDataset(name) if name == "12w_ctrl_male"));
    }
}
