/// Figure construction, independent of the window.
///
/// * `heatmap`   – pair restriction, ligand x receptor pivot
/// * `dotplot`   – faceted dot plot rasterised through a transient PNG
/// * `histogram` – weight distribution for the threshold overview
/// * `raster`    – pixel primitives used by `dotplot`

pub mod dotplot;
pub mod heatmap;
pub mod histogram;
pub mod raster;

/// Result of a render request that did not fail.
#[derive(Debug, Clone)]
pub enum Outcome<T> {
    Ready(T),
    /// Nothing passed the filters; `message` explains what was asked for.
    Empty { message: String },
}
