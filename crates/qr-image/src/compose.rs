//! Logo compositing: a centered logo on a white backing plate.

use image::{DynamicImage, ImageError, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use tracing::{debug, warn};

use crate::resize::{resize_to_fit, scale_symbol};

/// Logo edge length relative to the target size.
pub const LOGO_RATIO: f32 = 0.2;
/// Extra plate size around the logo box (10px per side).
pub const PLATE_PADDING: u32 = 20;
pub const PLATE_RADIUS: f32 = 8.0;
pub const PLATE_BORDER: f32 = 2.0;

const PLATE_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);
const PLATE_STROKE: Rgba<u8> = Rgba([0xe5, 0xe7, 0xeb, 255]);

/// Corner style of the backing plate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlateStyle {
    #[default]
    Rounded,
    Sharp,
}

/// Result of a composite. `logo_applied` is false when no logo was given
/// or the logo could not be decoded.
#[derive(Debug, Clone)]
pub struct CompositeImage {
    pub image: RgbaImage,
    pub logo_applied: bool,
}

impl CompositeImage {
    pub fn into_dynamic(self) -> DynamicImage {
        DynamicImage::ImageRgba8(self.image)
    }
}

/// Square plate geometry in canvas coordinates (may start off-canvas).
#[derive(Debug, Clone, Copy, PartialEq)]
struct Plate {
    x: f32,
    y: f32,
    side: f32,
}

impl Plate {
    fn centered(canvas: u32, side: u32) -> Self {
        let offset = (canvas as f32 - side as f32) / 2.0;
        Self {
            x: offset,
            y: offset,
            side: side as f32,
        }
    }
}

/// Composite an optional logo onto a rendered symbol.
pub fn composite(base: &RgbaImage, logo: Option<&[u8]>, target_size: u32) -> CompositeImage {
    composite_with(base, logo, target_size, PlateStyle::Rounded)
}

/// [`composite`] with an explicit plate style.
///
/// The plate is drawn before the logo is decoded, so an undecodable logo
/// leaves an empty plate on the scaled symbol.
pub fn composite_with(
    base: &RgbaImage,
    logo: Option<&[u8]>,
    target_size: u32,
    style: PlateStyle,
) -> CompositeImage {
    let Some(logo_bytes) = logo else {
        return CompositeImage {
            image: base.clone(),
            logo_applied: false,
        };
    };

    let mut canvas = scale_symbol(base, target_size);
    let logo_size = (target_size as f32 * LOGO_RATIO).floor() as u32;
    let plate = Plate::centered(target_size, logo_size + PLATE_PADDING);

    debug!(
        target_size,
        logo_size,
        plate_side = plate.side,
        "Compositing logo"
    );
    draw_plate(&mut canvas, plate, style);

    let logo_origin = (target_size as f32 - logo_size as f32) / 2.0;
    let logo_applied = match image::load_from_memory(logo_bytes) {
        Ok(logo) => {
            let (resized, fit) = resize_to_fit(&logo, logo_size);
            let x = (logo_origin + fit.offset_x).round().max(0.0) as u32;
            let y = (logo_origin + fit.offset_y).round().max(0.0) as u32;
            overlay(&mut canvas, &resized, x, y);
            true
        }
        Err(e) => {
            warn!(error = %e, "Logo could not be decoded, leaving empty plate");
            false
        }
    };

    CompositeImage {
        image: canvas,
        logo_applied,
    }
}

fn draw_plate(canvas: &mut RgbaImage, plate: Plate, style: PlateStyle) {
    let rounded = style == PlateStyle::Rounded && PLATE_RADIUS * 2.0 <= plate.side;
    if rounded {
        draw_rounded_plate(canvas, plate);
    } else {
        draw_sharp_plate(canvas, plate);
    }
}

fn draw_sharp_plate(canvas: &mut RgbaImage, plate: Plate) {
    let x = plate.x.round() as i32;
    let y = plate.y.round() as i32;
    let side = plate.side.round() as u32;

    draw_filled_rect_mut(canvas, Rect::at(x, y).of_size(side, side), PLATE_FILL);
    // Two 1px outlines straddling the edge give a 2px centered stroke.
    let outer = Rect::at(x - 1, y - 1).of_size(side + 2, side + 2);
    draw_hollow_rect_mut(canvas, outer, PLATE_STROKE);
    draw_hollow_rect_mut(canvas, Rect::at(x, y).of_size(side, side), PLATE_STROKE);
}

fn draw_rounded_plate(canvas: &mut RgbaImage, plate: Plate) {
    let half = plate.side / 2.0;
    let cx = plate.x + half;
    let cy = plate.y + half;
    let stroke = PLATE_BORDER / 2.0;

    let min_x = (plate.x - stroke).floor().max(0.0) as u32;
    let min_y = (plate.y - stroke).floor().max(0.0) as u32;
    let max_x = (plate.x + plate.side + stroke).ceil().max(0.0) as u32;
    let max_y = (plate.y + plate.side + stroke).ceil().max(0.0) as u32;
    let (max_x, max_y) = (max_x.min(canvas.width()), max_y.min(canvas.height()));

    for py in min_y..max_y {
        for px in min_x..max_x {
            let dx = px as f32 + 0.5 - cx;
            let dy = py as f32 + 0.5 - cy;
            let d = rounded_rect_distance(dx, dy, half, PLATE_RADIUS);
            if d.abs() <= stroke {
                canvas.put_pixel(px, py, PLATE_STROKE);
            } else if d < 0.0 {
                canvas.put_pixel(px, py, PLATE_FILL);
            }
        }
    }
}

/// Signed distance from a point (relative to the center) to a rounded square outline.
fn rounded_rect_distance(dx: f32, dy: f32, half: f32, radius: f32) -> f32 {
    let qx = dx.abs() - (half - radius);
    let qy = dy.abs() - (half - radius);
    let outside = qx.max(0.0).hypot(qy.max(0.0));
    let inside = qx.max(qy).min(0.0);
    outside + inside - radius
}

/// Overlay `top` image onto `base` at the given position.
///
/// The `top` image is alpha-composited over the base.
pub fn overlay(base: &mut RgbaImage, top: &DynamicImage, x: u32, y: u32) {
    let top_rgba = top.to_rgba8();
    for (dx, dy, pixel) in top_rgba.enumerate_pixels() {
        let target_x = x + dx;
        let target_y = y + dy;
        if target_x < base.width() && target_y < base.height() {
            let alpha = pixel[3] as f32 / 255.0;
            if alpha > 0.99 {
                base.put_pixel(target_x, target_y, *pixel);
            } else if alpha > 0.01 {
                let bg = base.get_pixel(target_x, target_y);
                let blended = blend_pixel(bg, pixel, alpha);
                base.put_pixel(target_x, target_y, blended);
            }
        }
    }
}

fn blend_pixel(bg: &Rgba<u8>, fg: &Rgba<u8>, alpha: f32) -> Rgba<u8> {
    let inv = 1.0 - alpha;
    Rgba([
        (fg[0] as f32 * alpha + bg[0] as f32 * inv) as u8,
        (fg[1] as f32 * alpha + bg[1] as f32 * inv) as u8,
        (fg[2] as f32 * alpha + bg[2] as f32 * inv) as u8,
        255,
    ])
}

/// Center-crop an encoded image to a square.
pub fn crop_to_square(bytes: &[u8]) -> Result<DynamicImage, ImageError> {
    let img = image::load_from_memory(bytes)?;
    let (w, h) = (img.width(), img.height());
    let side = w.min(h);
    debug!(w, h, side, "Cropping image to square");
    Ok(img.crop_imm((w - side) / 2, (h - side) / 2, side, side))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn black_base(side: u32) -> RgbaImage {
        RgbaImage::from_pixel(side, side, BLACK)
    }

    fn png_bytes(img: RgbaImage) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn no_logo_returns_base_unchanged() {
        let base = black_base(33);
        let result = composite(&base, None, 200);
        assert!(!result.logo_applied);
        assert_eq!(result.image, base);
    }

    #[test]
    fn logo_is_centered_on_white_plate() {
        let logo = png_bytes(RgbaImage::from_pixel(10, 10, RED));
        let result = composite(&black_base(50), Some(&logo), 200);
        assert!(result.logo_applied);
        assert_eq!(result.image.dimensions(), (200, 200));

        // logo_size = 40, plate = 60 → plate spans 70..130, logo 80..120.
        assert_eq!(result.image.get_pixel(100, 100), &RED);
        assert_eq!(result.image.get_pixel(80, 80), &RED);
        assert_eq!(result.image.get_pixel(75, 100), &PLATE_FILL);
        assert_eq!(result.image.get_pixel(70, 100), &PLATE_STROKE);
        assert_eq!(result.image.get_pixel(60, 100), &BLACK);
        // Rounded corner leaves the symbol visible.
        assert_eq!(result.image.get_pixel(70, 70), &BLACK);
    }

    #[test]
    fn wide_logo_is_letterboxed_not_stretched() {
        let logo = png_bytes(RgbaImage::from_pixel(40, 10, RED));
        let result = composite(&black_base(50), Some(&logo), 200);
        // Fitted to 40x10 inside the 40x40 box at (80, 80) → rows 95..105.
        assert_eq!(result.image.get_pixel(100, 100), &RED);
        assert_eq!(result.image.get_pixel(100, 85), &PLATE_FILL);
        assert_eq!(result.image.get_pixel(100, 115), &PLATE_FILL);
    }

    #[test]
    fn undecodable_logo_leaves_empty_plate() {
        let result = composite(&black_base(50), Some(b"not an image"), 200);
        assert!(!result.logo_applied);
        assert_eq!(result.image.dimensions(), (200, 200));
        assert_eq!(result.image.get_pixel(100, 100), &PLATE_FILL);
        assert_eq!(result.image.get_pixel(10, 10), &BLACK);
    }

    #[test]
    fn sharp_plate_fills_corners() {
        let result = composite_with(&black_base(50), Some(b""), 200, PlateStyle::Sharp);
        assert_eq!(result.image.get_pixel(72, 72), &PLATE_FILL);
        assert_eq!(result.image.get_pixel(70, 70), &PLATE_STROKE);
        assert_eq!(result.image.get_pixel(69, 69), &PLATE_STROKE);
        assert_eq!(result.image.get_pixel(67, 67), &BLACK);
    }

    #[test]
    fn transparent_logo_pixels_keep_plate() {
        let mut logo = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 255, 0]));
        logo.put_pixel(5, 5, RED);
        let result = composite(&black_base(50), Some(&png_bytes(logo)), 200);
        assert_eq!(result.image.get_pixel(81, 81), &PLATE_FILL);
    }

    #[test]
    fn overlay_does_not_panic_on_out_of_bounds() {
        let mut base = RgbaImage::new(100, 100);
        let top = DynamicImage::ImageRgba8(RgbaImage::new(50, 50));
        overlay(&mut base, &top, 80, 80); // partially out of bounds
    }

    #[test]
    fn crop_to_square_takes_center() {
        let mut img = RgbaImage::from_pixel(30, 10, BLACK);
        img.put_pixel(10, 0, RED);
        let cropped = crop_to_square(&png_bytes(img)).unwrap();
        assert_eq!((cropped.width(), cropped.height()), (10, 10));
        assert_eq!(cropped.to_rgba8().get_pixel(0, 0), &RED);
    }
}
