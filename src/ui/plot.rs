use std::f32::consts::{FRAC_1_SQRT_2, FRAC_PI_2, FRAC_PI_4};
use std::sync::Arc;

use eframe::egui::epaint::TextShape;
use eframe::egui::{self, Color32, FontId, Galley, Painter, Pos2, Rect, Sense, Ui, pos2, vec2};
use egui_plot::{Bar, BarChart, Legend, Plot, VLine};

use crate::color::{SequentialMap, annotation_color};
use crate::config::ViewerConfig;
use crate::data::model::InteractionTable;
use crate::render::dotplot::{DotplotImage, LabelKind, PlacedLabel};
use crate::render::heatmap::{HeatmapFigure, TITLE, X_LABEL, Y_LABEL};
use crate::render::histogram::WeightHistogram;
use crate::state::{AppState, Figure};

// Heatmap geometry, in points.
const CELL_W: f32 = 90.0;
const CELL_H: f32 = 40.0;
const ANNOT_SIZE: f32 = 14.0;
const TICK_SIZE: f32 = 17.0;
const TITLE_SIZE: f32 = 18.0;
const AXIS_TITLE_SIZE: f32 = 15.0;
const COLOURBAR_W: f32 = 20.0;
const COLOURBAR_STEPS: usize = 64;

const DOT_LABEL_SIZE: f32 = 12.0;
const ROW_LABEL_SIZE: f32 = 16.0;
const PANEL_LABEL_SIZE: f32 = 16.0;

const HEATMAP_BLURB: &str = "The heatmap visualizes the ligand-receptor interaction strengths between \
    selected source and target cell types. Each cell represents the weight of interaction between a \
    ligand and a receptor.";
const DOTPLOT_BLURB: &str = "The dotplot illustrates the interactions between every source and \
    target cell type. Dot colour and size both encode the interaction weight.";

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render whatever figure the state currently holds.
pub fn figure_view(ui: &mut Ui, state: &AppState) {
    let Some(figure) = &state.figure else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Choose cell types and a dataset, then generate a figure");
        });
        return;
    };

    match figure {
        Figure::Empty { message } => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading(message);
            });
        }
        Figure::Heatmap(fig) => {
            ui.label(HEATMAP_BLURB);
            ui.label(format!(
                "{} → {} in {}: {} interactions",
                fig.source, fig.target, fig.dataset, fig.row_count
            ));
            ui.separator();
            egui::ScrollArea::both()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| heatmap_plot(ui, fig));
        }
        Figure::Dotplot { image, uri } => {
            ui.label(DOTPLOT_BLURB);
            ui.label(format!("{}: {} interactions plotted", image.dataset, image.dot_count));
            ui.separator();
            egui::ScrollArea::both()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| dotplot_view(ui, image, uri));
        }
    }
}

// -- text helpers --

fn layout(ui: &Ui, text: &str, size: f32, color: Color32) -> Arc<Galley> {
    ui.fonts(|f| f.layout_no_wrap(text.to_owned(), FontId::proportional(size), color))
}

/// Paint `galley` rotated 45° counter-clockwise so that its end sits at `end`.
fn paint_slanted(painter: &Painter, galley: Arc<Galley>, end: Pos2, color: Color32) {
    let w = galley.size().x;
    let h = galley.size().y;
    let start = pos2(
        end.x - w * FRAC_1_SQRT_2 - h * 0.5 * FRAC_1_SQRT_2,
        end.y + w * FRAC_1_SQRT_2 - h * 0.5 * FRAC_1_SQRT_2,
    );
    painter.add(TextShape::new(start, galley, color).with_angle(-FRAC_PI_4));
}

fn slanted_height(galleys: &[Arc<Galley>]) -> f32 {
    galleys
        .iter()
        .map(|g| (g.size().x + g.size().y) * FRAC_1_SQRT_2)
        .fold(0.0, f32::max)
}

fn max_width(galleys: &[Arc<Galley>]) -> f32 {
    galleys.iter().map(|g| g.size().x).fold(0.0, f32::max)
}

// ---------------------------------------------------------------------------
// Heatmap
// ---------------------------------------------------------------------------

/// Annotated ligand x receptor grid in the "Blues" palette.
pub fn heatmap_plot(ui: &mut Ui, fig: &HeatmapFigure) {
    let m = &fig.matrix;
    let text_color = ui.visuals().text_color();
    let palette = SequentialMap::blues();
    let (lo, hi) = m.value_range();

    let y_ticks: Vec<_> = m.ligands.iter().map(|l| layout(ui, l, TICK_SIZE, text_color)).collect();
    let x_ticks: Vec<_> = m.receptors.iter().map(|r| layout(ui, r, TICK_SIZE, text_color)).collect();
    let title = layout(ui, TITLE, TITLE_SIZE, text_color);
    let x_title = layout(ui, X_LABEL, AXIS_TITLE_SIZE, text_color);
    let y_title = layout(ui, Y_LABEL, AXIS_TITLE_SIZE, text_color);
    let hi_tick = layout(ui, &format!("{hi:.2}"), TICK_SIZE, text_color);
    let lo_tick = layout(ui, &format!("{lo:.2}"), TICK_SIZE, text_color);

    let grid_w = m.receptors.len() as f32 * CELL_W;
    let grid_h = m.ligands.len() as f32 * CELL_H;
    let left = y_title.size().y + 12.0 + max_width(&y_ticks) + 8.0;
    let top = title.size().y + 16.0;
    let bottom = 8.0 + slanted_height(&x_ticks) + 12.0 + x_title.size().y + 8.0;
    let right = 24.0 + COLOURBAR_W + 6.0 + hi_tick.size().x.max(lo_tick.size().x) + 8.0;

    let size = vec2(left + grid_w + right, top + grid_h + bottom);
    let (rect, _) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);
    let origin = rect.min + vec2(left, top);

    // Cells with their annotations.
    for (li, row) in m.values.iter().enumerate() {
        for (ri, &value) in row.iter().enumerate() {
            let cell = Rect::from_min_size(
                origin + vec2(ri as f32 * CELL_W, li as f32 * CELL_H),
                vec2(CELL_W, CELL_H),
            );
            let fill = palette.scaled(value, lo, hi);
            painter.rect_filled(cell, 0.0, fill);
            painter.text(
                cell.center(),
                egui::Align2::CENTER_CENTER,
                format!("{value:.2}"),
                FontId::proportional(ANNOT_SIZE),
                annotation_color(fill),
            );
        }
    }

    // Tick labels.
    for (li, galley) in y_ticks.into_iter().enumerate() {
        let cy = origin.y + (li as f32 + 0.5) * CELL_H;
        let pos = pos2(origin.x - 8.0 - galley.size().x, cy - galley.size().y / 2.0);
        painter.galley(pos, galley, text_color);
    }
    let slant_height = slanted_height(&x_ticks);
    for (ri, galley) in x_ticks.into_iter().enumerate() {
        let cx = origin.x + (ri as f32 + 0.5) * CELL_W;
        paint_slanted(&painter, galley, pos2(cx, origin.y + grid_h + 8.0), text_color);
    }

    // Titles.
    painter.galley(
        pos2(origin.x + grid_w / 2.0 - title.size().x / 2.0, rect.min.y + 4.0),
        title,
        text_color,
    );
    painter.galley(
        pos2(
            origin.x + grid_w / 2.0 - x_title.size().x / 2.0,
            origin.y + grid_h + 8.0 + slant_height + 12.0,
        ),
        x_title,
        text_color,
    );
    let y_title_w = y_title.size().x;
    painter.add(
        TextShape::new(
            pos2(rect.min.x + 4.0, origin.y + grid_h / 2.0 + y_title_w / 2.0),
            y_title,
            text_color,
        )
        .with_angle(-FRAC_PI_2),
    );

    // Colour bar, darkest at the top.
    let bar_x = origin.x + grid_w + 24.0;
    let step = grid_h / COLOURBAR_STEPS as f32;
    for i in 0..COLOURBAR_STEPS {
        let t = 1.0 - i as f32 / (COLOURBAR_STEPS - 1) as f32;
        let slice = Rect::from_min_size(
            pos2(bar_x, origin.y + i as f32 * step),
            vec2(COLOURBAR_W, step + 0.5),
        );
        painter.rect_filled(slice, 0.0, palette.at(t));
    }
    let tick_x = bar_x + COLOURBAR_W + 6.0;
    painter.galley(pos2(tick_x, origin.y), hi_tick, text_color);
    let lo_h = lo_tick.size().y;
    painter.galley(pos2(tick_x, origin.y + grid_h - lo_h), lo_tick, text_color);
}

// ---------------------------------------------------------------------------
// Dot plot
// ---------------------------------------------------------------------------

/// Font size for each kind of dot plot label.
fn label_size(kind: LabelKind) -> f32 {
    match kind {
        LabelKind::Row => ROW_LABEL_SIZE,
        LabelKind::Panel => PANEL_LABEL_SIZE,
        LabelKind::Column | LabelKind::Tick | LabelKind::Caption => DOT_LABEL_SIZE,
    }
}

/// The rasterised dot plot with its labels drawn around and over it.
pub fn dotplot_view(ui: &mut Ui, image: &DotplotImage, uri: &str) {
    let text_color = ui.visuals().text_color();

    let galleys: Vec<(Arc<Galley>, &PlacedLabel)> = image
        .labels
        .iter()
        .map(|label| {
            (layout(ui, &label.text, label_size(label.kind), text_color), label)
        })
        .collect();

    let of_kind = |kind: LabelKind| -> Vec<Arc<Galley>> {
        galleys
            .iter()
            .filter(|(_, l)| l.kind == kind)
            .map(|(g, _)| g.clone())
            .collect()
    };
    let rows = of_kind(LabelKind::Row);
    let columns = of_kind(LabelKind::Column);
    let panels = of_kind(LabelKind::Panel);
    let ticks = of_kind(LabelKind::Tick);

    let left = max_width(&rows) + 10.0;
    let top = panels.iter().map(|g| g.size().y).fold(0.0, f32::max) + 8.0;
    let bottom = slanted_height(&columns) + 12.0;
    let right = max_width(&ticks) + 8.0;

    let img_size = vec2(image.width as f32, image.height as f32);
    let (rect, _) = ui.allocate_exact_size(
        vec2(left + img_size.x + right, top + img_size.y + bottom),
        Sense::hover(),
    );
    let image_rect = Rect::from_min_size(rect.min + vec2(left, top), img_size);

    egui::Image::from_bytes(uri.to_owned(), image.png.clone()).paint_at(ui, image_rect);

    let painter = ui.painter_at(rect);
    for (galley, label) in galleys {
        let at = image_rect.min + vec2(label.anchor[0], label.anchor[1]);
        let (w, h) = (galley.size().x, galley.size().y);
        match label.kind {
            LabelKind::Row => painter.galley(pos2(at.x - 6.0 - w, at.y - h / 2.0), galley, text_color),
            LabelKind::Panel | LabelKind::Caption => {
                painter.galley(pos2(at.x - w / 2.0, at.y - h - 4.0), galley, text_color)
            }
            LabelKind::Tick => painter.galley(pos2(at.x, at.y - h / 2.0), galley, text_color),
            LabelKind::Column => paint_slanted(&painter, galley, pos2(at.x, at.y + 4.0), text_color),
        }
    }
}

// ---------------------------------------------------------------------------
// Weight distribution
// ---------------------------------------------------------------------------

/// Histogram of raw weights with both thresholds marked.
pub fn weight_distribution(ui: &mut Ui, table: &InteractionTable, config: &ViewerConfig) {
    let hist = WeightHistogram::from_table(table, 40);
    let bars: Vec<Bar> = hist
        .counts
        .iter()
        .enumerate()
        .map(|(i, &count)| Bar::new(hist.centre(i), count as f64).width(hist.bin_width))
        .collect();

    let kept = table.iter().filter(|r| r.weight > config.heatmap_threshold).count();
    ui.label(format!(
        "{} interactions, {} above {} (heatmap), {} above {} (dot plot)",
        hist.total(),
        kept,
        config.heatmap_threshold,
        table.iter().filter(|r| r.weight > config.dotplot_threshold).count(),
        config.dotplot_threshold
    ));

    Plot::new("weight_distribution")
        .height(160.0)
        .legend(Legend::default())
        .x_axis_label("weight")
        .y_axis_label("interactions")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .color(Color32::LIGHT_BLUE)
                    .name("interactions"),
            );
            plot_ui.vline(
                VLine::new(config.heatmap_threshold)
                    .color(Color32::from_rgb(0x21, 0x71, 0xb5))
                    .name("heatmap threshold"),
            );
            plot_ui.vline(
                VLine::new(config.dotplot_threshold)
                    .color(Color32::from_rgb(0x35, 0xb7, 0x79))
                    .name("dot plot threshold"),
            );
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interaction_labels_outsize_target_labels() {
        assert_eq!(label_size(LabelKind::Row), 16.0);
        assert_eq!(label_size(LabelKind::Column), 12.0);
        assert_eq!(label_size(LabelKind::Panel), 16.0);
    }
}
