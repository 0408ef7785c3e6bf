use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{ImageFormat, RgbaImage};

use crate::color::SequentialMap;
use crate::data::model::Dataset;
use crate::error::RenderError;

use super::Outcome;
use super::raster::{fill_circle, fill_rect, rgba};

// Figure geometry, in pixels.  Cells shrink below `CELL` when the grid
// would not otherwise fit inside the side limit.
const CELL: u32 = 26;
const PANEL_GAP: u32 = 14;
const PAD: u32 = 10;
const COLOURBAR_GAP: u32 = 30;
const COLOURBAR_WIDTH: u32 = 18;
const COLOURBAR_MIN_HEIGHT: u32 = 26;
const COLOURBAR_MAX_HEIGHT: u32 = 240;
/// Dot radii as a fraction of the smaller cell side.
const MIN_RADIUS: f32 = 0.12;
const MAX_RADIUS: f32 = 0.45;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// What to plot and where to find it.
#[derive(Debug, Clone, Copy)]
pub struct DotplotSpec<'a> {
    /// Numeric column mapped to dot colour.
    pub colour: &'a str,
    /// Numeric column mapped to dot radius.
    pub size: &'a str,
    pub source_labels: &'a [String],
    pub target_labels: &'a [String],
    /// `uns` key of the table to plot.
    pub uns_key: &'a str,
    /// Largest side, in pixels, the raster may have; usually the GPU's
    /// maximum texture side.
    pub max_side: u32,
}

// ---------------------------------------------------------------------------
// Data: which dot goes where
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Dot {
    pub panel: usize,
    pub row: usize,
    pub column: usize,
    pub colour_value: f64,
    pub size_value: f64,
}

/// One facet per source label, one column per target label, one row per
/// `ligand -> receptor` interaction.
#[derive(Debug, Clone)]
pub struct DotplotData {
    pub panels: Vec<String>,
    pub columns: Vec<String>,
    pub rows: Vec<String>,
    pub dots: Vec<Dot>,
    pub colour_range: (f64, f64),
    pub size_range: (f64, f64),
}

fn range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Gather dots from `dataset.uns[spec.uns_key]`.  `Ok(None)` when no row
/// falls inside the label sets.  Rows sharing a position are averaged.
pub fn collect_dots(dataset: &Dataset, spec: &DotplotSpec) -> Result<Option<DotplotData>, RenderError> {
    let table = dataset
        .table(spec.uns_key)
        .ok_or_else(|| RenderError::MissingTable {
            dataset: dataset.name.clone(),
            key: spec.uns_key.to_string(),
        })?;

    let mut cells: BTreeMap<(usize, String, usize), (f64, f64, usize)> = BTreeMap::new();
    for row in table.iter() {
        let Some(panel) = spec.source_labels.iter().position(|s| *s == row.source) else {
            continue;
        };
        let Some(column) = spec.target_labels.iter().position(|t| *t == row.target) else {
            continue;
        };
        let colour = row
            .numeric(spec.colour)
            .ok_or_else(|| RenderError::UnknownField(spec.colour.to_string()))?;
        let size = row
            .numeric(spec.size)
            .ok_or_else(|| RenderError::UnknownField(spec.size.to_string()))?;

        let cell = cells
            .entry((panel, row.interaction_label(), column))
            .or_insert((0.0, 0.0, 0));
        cell.0 += colour;
        cell.1 += size;
        cell.2 += 1;
    }

    if cells.is_empty() {
        return Ok(None);
    }

    let rows: Vec<String> = cells
        .keys()
        .map(|(_, label, _)| label.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let dots: Vec<Dot> = cells
        .into_iter()
        .map(|((panel, label, column), (c, s, n))| Dot {
            panel,
            row: rows.binary_search(&label).unwrap_or_default(),
            column,
            colour_value: c / n as f64,
            size_value: s / n as f64,
        })
        .collect();

    Ok(Some(DotplotData {
        panels: spec.source_labels.to_vec(),
        columns: spec.target_labels.to_vec(),
        colour_range: range(dots.iter().map(|d| d.colour_value)),
        size_range: range(dots.iter().map(|d| d.size_value)),
        rows,
        dots,
    }))
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    /// Interaction name; anchor is the left edge of the row, text goes left.
    Row,
    /// Target name; anchor is the bottom of the column, text rotated 45°.
    Column,
    /// Source name; anchor is the top centre of the panel.
    Panel,
    /// Colour-bar tick; anchor is just right of the bar.
    Tick,
    /// Colour-bar caption; anchor is the top of the bar.
    Caption,
}

/// A text label positioned in raster pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    pub text: String,
    pub anchor: [f32; 2],
    pub kind: LabelKind,
}

struct Layout {
    width: u32,
    height: u32,
    cell_w: u32,
    cell_h: u32,
    panel_width: u32,
    plot_height: u32,
    colourbar_x: u32,
    colourbar_height: u32,
}

/// Largest cell side, at most `CELL`, that fits `count` cells into `room`
/// pixels.  `None` when even one pixel per cell is too much.
fn fit_cell(room: u64, count: u64) -> Option<u32> {
    if count == 0 {
        return Some(CELL);
    }
    let side = (room / count).min(CELL as u64);
    (side >= 1).then_some(side as u32)
}

impl Layout {
    fn new(data: &DotplotData, max_side: u32) -> Result<Self, RenderError> {
        let n_panels = data.panels.len() as u64;
        let n_columns = n_panels * data.columns.len() as u64;
        let n_rows = data.rows.len() as u64;

        let fixed_w = PAD as u64
            + n_panels.saturating_sub(1) * PANEL_GAP as u64
            + (COLOURBAR_GAP + COLOURBAR_WIDTH + PAD) as u64;
        let fixed_h = 2 * PAD as u64;

        let too_large = || RenderError::FigureTooLarge {
            width: (fixed_w + n_columns).min(u32::MAX as u64) as u32,
            height: (fixed_h + n_rows).min(u32::MAX as u64) as u32,
        };
        let room_w = (max_side as u64).checked_sub(fixed_w).ok_or_else(too_large)?;
        let room_h = (max_side as u64).checked_sub(fixed_h).ok_or_else(too_large)?;
        let cell_w = fit_cell(room_w, n_columns).ok_or_else(too_large)?;
        let cell_h = fit_cell(room_h, n_rows).ok_or_else(too_large)?;

        let panel_width = data.columns.len() as u32 * cell_w;
        let plot_height = n_rows as u32 * cell_h;
        let plot_width = n_panels as u32 * panel_width + n_panels.saturating_sub(1) as u32 * PANEL_GAP;
        let colourbar_height = plot_height.clamp(COLOURBAR_MIN_HEIGHT, COLOURBAR_MAX_HEIGHT);

        Ok(Self {
            width: (fixed_w as u32) + n_columns as u32 * cell_w,
            height: (2 * PAD + plot_height.max(colourbar_height)).min(max_side),
            cell_w,
            cell_h,
            panel_width,
            plot_height,
            colourbar_x: PAD + plot_width + COLOURBAR_GAP,
            colourbar_height: colourbar_height.min(max_side.saturating_sub(2 * PAD)),
        })
    }

    fn panel_x(&self, panel: usize) -> u32 {
        PAD + panel as u32 * (self.panel_width + PANEL_GAP)
    }

    fn column_centre(&self, panel: usize, column: usize) -> f32 {
        (self.panel_x(panel) + column as u32 * self.cell_w) as f32 + self.cell_w as f32 / 2.0
    }

    fn row_centre(&self, row: usize) -> f32 {
        (PAD + row as u32 * self.cell_h) as f32 + self.cell_h as f32 / 2.0
    }

    fn max_radius(&self) -> f32 {
        self.cell_w.min(self.cell_h) as f32 * MAX_RADIUS
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// A rendered dot plot, read back from its transient PNG.
#[derive(Debug, Clone)]
pub struct DotplotImage {
    pub dataset: String,
    /// Encoded PNG, shared with the image loader.
    pub png: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
    pub labels: Vec<PlacedLabel>,
    pub dot_count: usize,
    /// Where the PNG lived while it was being written; gone by now.
    pub artifact: PathBuf,
}

/// Dot radius for `value`, scaled between the minimum and `max_radius`.
fn radius(value: f64, (lo, hi): (f64, f64), max_radius: f32) -> f32 {
    let span = hi - lo;
    if span.abs() < f64::EPSILON {
        return max_radius;
    }
    let min_radius = max_radius * MIN_RADIUS / MAX_RADIUS;
    let t = ((value - lo) / span) as f32;
    min_radius + t.clamp(0.0, 1.0) * (max_radius - min_radius)
}

fn rasterize(data: &DotplotData, layout: &Layout, palette: &SequentialMap) -> RgbaImage {
    let background = image::Rgba([255, 255, 255, 255]);
    let panel_fill = image::Rgba([235, 235, 235, 255]);
    let grid = image::Rgba([255, 255, 255, 255]);

    let mut img = RgbaImage::from_pixel(layout.width, layout.height, background);

    for panel in 0..data.panels.len() {
        let x0 = layout.panel_x(panel);
        let x1 = x0 + layout.panel_width;
        fill_rect(&mut img, x0, PAD, x1, PAD + layout.plot_height, panel_fill);

        // Grid lines would swallow cells only a few pixels wide.
        if layout.cell_w > 4 {
            for column in 0..data.columns.len() {
                let cx = layout.column_centre(panel, column) as u32;
                fill_rect(&mut img, cx, PAD, cx + 1, PAD + layout.plot_height, grid);
            }
        }
        if layout.cell_h > 4 {
            for row in 0..data.rows.len() {
                let cy = layout.row_centre(row) as u32;
                fill_rect(&mut img, x0, cy, x1, cy + 1, grid);
            }
        }
    }

    let (lo, hi) = data.colour_range;
    let max_radius = layout.max_radius();
    for dot in &data.dots {
        let cx = layout.column_centre(dot.panel, dot.column);
        let cy = layout.row_centre(dot.row);
        let colour = rgba(palette.scaled(dot.colour_value, lo, hi));
        fill_circle(&mut img, cx, cy, radius(dot.size_value, data.size_range, max_radius), colour);
    }

    // Colour bar, high end at the top.
    let bar_top = PAD;
    for y in 0..layout.colourbar_height {
        let t = 1.0 - y as f32 / (layout.colourbar_height - 1).max(1) as f32;
        let colour = rgba(palette.at(t));
        fill_rect(
            &mut img,
            layout.colourbar_x,
            bar_top + y,
            layout.colourbar_x + COLOURBAR_WIDTH,
            bar_top + y + 1,
            colour,
        );
    }

    img
}

fn place_labels(data: &DotplotData, layout: &Layout, colour_field: &str) -> Vec<PlacedLabel> {
    let mut labels = Vec::new();

    for (row, text) in data.rows.iter().enumerate() {
        labels.push(PlacedLabel {
            text: text.clone(),
            anchor: [PAD as f32, layout.row_centre(row)],
            kind: LabelKind::Row,
        });
    }

    let bottom = (PAD + layout.plot_height) as f32;
    for (panel, source) in data.panels.iter().enumerate() {
        let x0 = layout.panel_x(panel);
        labels.push(PlacedLabel {
            text: source.clone(),
            anchor: [x0 as f32 + layout.panel_width as f32 / 2.0, PAD as f32],
            kind: LabelKind::Panel,
        });
        for (column, target) in data.columns.iter().enumerate() {
            labels.push(PlacedLabel {
                text: target.clone(),
                anchor: [layout.column_centre(panel, column), bottom],
                kind: LabelKind::Column,
            });
        }
    }

    let bar_x = (layout.colourbar_x + COLOURBAR_WIDTH) as f32 + 4.0;
    let (lo, hi) = data.colour_range;
    labels.push(PlacedLabel {
        text: format!("{hi:.2}"),
        anchor: [bar_x, PAD as f32],
        kind: LabelKind::Tick,
    });
    labels.push(PlacedLabel {
        text: format!("{lo:.2}"),
        anchor: [bar_x, (PAD + layout.colourbar_height) as f32],
        kind: LabelKind::Tick,
    });
    labels.push(PlacedLabel {
        text: colour_field.to_string(),
        anchor: [
            layout.colourbar_x as f32 + COLOURBAR_WIDTH as f32 / 2.0,
            PAD as f32,
        ],
        kind: LabelKind::Caption,
    });

    labels
}

/// Run `write` against a fresh scoped temporary PNG path and read the result
/// back.  The file is removed when this returns, successfully or not.
fn through_transient_file<F>(write: F) -> Result<(Arc<[u8]>, PathBuf), RenderError>
where
    F: FnOnce(&Path) -> Result<(), RenderError>,
{
    let file = tempfile::Builder::new()
        .prefix("lr-dotplot-")
        .suffix(".png")
        .tempfile()
        .map_err(RenderError::TempFile)?;
    let path = file.path().to_path_buf();

    write(&path)?;
    let png = std::fs::read(&path).map_err(RenderError::TempFile)?;
    log::debug!("Wrote {} byte dot plot to {}", png.len(), path.display());

    Ok((Arc::from(png), path))
}

fn through_transient_png(img: &RgbaImage) -> Result<(Arc<[u8]>, PathBuf), RenderError> {
    through_transient_file(|path| Ok(img.save_with_format(path, ImageFormat::Png)?))
}

/// Render the dot plot for `dataset`, reading its table by `spec.uns_key`.
pub fn render_dotplot(dataset: &Dataset, spec: &DotplotSpec) -> Result<Outcome<DotplotImage>, RenderError> {
    let Some(data) = collect_dots(dataset, spec)? else {
        return Ok(Outcome::Empty {
            message: format!(
                "No interactions in '{}' of {} pass the dot plot threshold.",
                spec.uns_key, dataset.name
            ),
        });
    };

    let layout = Layout::new(&data, spec.max_side)?;
    if layout.cell_h < CELL || layout.cell_w < CELL {
        log::info!(
            "Dot plot cells shrunk to {}x{} px to fit {} rows",
            layout.cell_w,
            layout.cell_h,
            data.rows.len()
        );
    }
    let img = rasterize(&data, &layout, &SequentialMap::viridis());
    let (png, artifact) = through_transient_png(&img)?;

    Ok(Outcome::Ready(DotplotImage {
        dataset: dataset.name.clone(),
        png,
        width: layout.width,
        height: layout.height,
        labels: place_labels(&data, &layout, spec.colour),
        dot_count: data.dots.len(),
        artifact,
    }))
}
