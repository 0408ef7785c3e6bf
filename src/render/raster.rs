//! Minimal RGBA drawing primitives for figures rendered off-screen.

use eframe::egui::Color32;
use image::{Rgba, RgbaImage};

pub fn rgba(c: Color32) -> Rgba<u8> {
    Rgba([c.r(), c.g(), c.b(), 255])
}

/// Fill the axis-aligned rectangle `[x0, x1) x [y0, y1)`, clipped to the image.
pub fn fill_rect(img: &mut RgbaImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgba<u8>) {
    let (w, h) = img.dimensions();
    for y in y0.min(h)..y1.min(h) {
        for x in x0.min(w)..x1.min(w) {
            img.put_pixel(x, y, color);
        }
    }
}

/// Alpha-blend `color` over the pixel at `(x, y)` with coverage `alpha`.
fn blend(img: &mut RgbaImage, x: u32, y: u32, color: Rgba<u8>, alpha: f32) {
    let dst = img.get_pixel_mut(x, y);
    for c in 0..3 {
        let mixed = color.0[c] as f32 * alpha + dst.0[c] as f32 * (1.0 - alpha);
        dst.0[c] = mixed.round().clamp(0.0, 255.0) as u8;
    }
    dst.0[3] = 255;
}

/// Anti-aliased filled disc centred on `(cx, cy)`.
pub fn fill_circle(img: &mut RgbaImage, cx: f32, cy: f32, radius: f32, color: Rgba<u8>) {
    if radius <= 0.0 {
        return;
    }
    let (w, h) = img.dimensions();
    let x0 = (cx - radius - 1.0).floor().max(0.0) as u32;
    let y0 = (cy - radius - 1.0).floor().max(0.0) as u32;
    let x1 = ((cx + radius + 1.0).ceil() as u32).min(w);
    let y1 = ((cy + radius + 1.0).ceil() as u32).min(h);

    for y in y0..y1 {
        for x in x0..x1 {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let coverage = (radius + 0.5 - (dx * dx + dy * dy).sqrt()).clamp(0.0, 1.0);
            if coverage > 0.0 {
                blend(img, x, y, color, coverage);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_is_clipped() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        fill_rect(&mut img, 2, 2, 10, 10, Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(3, 3), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(1, 1), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn circle_covers_centre_not_corners() {
        let mut img = RgbaImage::from_pixel(21, 21, Rgba([255, 255, 255, 255]));
        fill_circle(&mut img, 10.5, 10.5, 6.0, Rgba([0, 0, 255, 255]));
        assert_eq!(img.get_pixel(10, 10), &Rgba([0, 0, 255, 255]));
        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
        assert_eq!(img.get_pixel(20, 20), &Rgba([255, 255, 255, 255]));
    }
}
