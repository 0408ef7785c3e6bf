use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Sequential colour maps
// ---------------------------------------------------------------------------

/// Matplotlib "Blues", light to dark.
const BLUES: [u32; 9] = [
    0xf7fbff, 0xdeebf7, 0xc6dbef, 0x9ecae1, 0x6baed6, 0x4292c6, 0x2171b5, 0x08519c, 0x08306b,
];

/// Matplotlib "viridis", sampled at ten stops.
const VIRIDIS: [u32; 10] = [
    0x440154, 0x482878, 0x3e4989, 0x31688e, 0x26828e, 0x1f9e89, 0x35b779, 0x6ece58, 0xb5de2b,
    0xfde725,
];

fn hex(rgb: u32) -> LinSrgb {
    Srgb::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
        .into_format::<f32>()
        .into_linear()
}

fn to_color32(c: LinSrgb) -> Color32 {
    let srgb: Srgb<u8> = Srgb::<f32>::from_linear(c).into_format();
    Color32::from_rgb(srgb.red, srgb.green, srgb.blue)
}

/// A colour gradient through evenly spaced stops, interpolated in linear RGB.
#[derive(Debug, Clone)]
pub struct SequentialMap {
    stops: Vec<LinSrgb>,
}

impl SequentialMap {
    pub fn blues() -> Self {
        Self {
            stops: BLUES.iter().map(|&c| hex(c)).collect(),
        }
    }

    pub fn viridis() -> Self {
        Self {
            stops: VIRIDIS.iter().map(|&c| hex(c)).collect(),
        }
    }

    /// Colour at position `t` in `[0, 1]`; out-of-range values are clamped.
    pub fn at(&self, t: f32) -> Color32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let span = (self.stops.len() - 1) as f32;
        let pos = t * span;
        let lo = (pos.floor() as usize).min(self.stops.len() - 2);
        let frac = pos - lo as f32;
        to_color32(self.stops[lo].mix(self.stops[lo + 1], frac))
    }

    /// Colour for `value` on the scale `[min, max]`.  A degenerate range maps
    /// every value to the high end of the map.
    pub fn scaled(&self, value: f64, min: f64, max: f64) -> Color32 {
        let range = max - min;
        if range.abs() < f64::EPSILON {
            return self.at(1.0);
        }
        self.at(((value - min) / range) as f32)
    }
}

/// Black or white, whichever reads better on `background`.
pub fn annotation_color(background: Color32) -> Color32 {
    let lin: LinSrgb = Srgb::new(background.r(), background.g(), background.b())
        .into_format::<f32>()
        .into_linear();
    let luminance = 0.2126 * lin.red + 0.7152 * lin.green + 0.0722 * lin.blue;
    if luminance > 0.408 {
        Color32::BLACK
    } else {
        Color32::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_hit_the_first_and_last_stop() {
        let blues = SequentialMap::blues();
        assert_eq!(blues.at(0.0), Color32::from_rgb(0xf7, 0xfb, 0xff));
        assert_eq!(blues.at(1.0), Color32::from_rgb(0x08, 0x30, 0x6b));
        assert_eq!(blues.at(7.0), blues.at(1.0));
        assert_eq!(blues.at(-1.0), blues.at(0.0));
    }

    #[test]
    fn blues_darken_monotonically() {
        let blues = SequentialMap::blues();
        let sums: Vec<u32> = (0..=10)
            .map(|i| blues.at(i as f32 / 10.0))
            .map(|c| c.r() as u32 + c.g() as u32 + c.b() as u32)
            .collect();
        assert!(sums.windows(2).all(|w| w[0] >= w[1]), "{sums:?}");
    }

    #[test]
    fn degenerate_range_takes_the_high_end() {
        let viridis = SequentialMap::viridis();
        assert_eq!(viridis.scaled(2.0, 2.0, 2.0), viridis.at(1.0));
        assert_eq!(viridis.at(1.0), Color32::from_rgb(0xfd, 0xe7, 0x25));
        assert_eq!(viridis.scaled(1.0, 1.0, 3.0), viridis.at(0.0));
    }

    #[test]
    fn annotation_contrasts_with_cell() {
        let blues = SequentialMap::blues();
        assert_eq!(annotation_color(blues.at(0.0)), Color32::BLACK);
        assert_eq!(annotation_color(blues.at(1.0)), Color32::WHITE);
    }
}
