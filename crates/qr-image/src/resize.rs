//! Resizing helpers for symbols and logos.
//!
//! Symbols are scaled with nearest-neighbour filtering so module edges stay
//! crisp; logos use Lanczos3 and keep their aspect ratio.

use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use tracing::debug;

/// Placement of an image letterboxed inside a square box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitBox {
    pub width: f32,
    pub height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

/// Fit `(width, height)` into a `side × side` box without stretching.
///
/// The longer axis fills the box; the shorter axis is centered.
pub fn fit_in_square(width: u32, height: u32, side: u32) -> FitBox {
    let side = side as f32;
    let aspect = width.max(1) as f32 / height.max(1) as f32;

    if aspect > 1.0 {
        let h = side / aspect;
        FitBox {
            width: side,
            height: h,
            offset_x: 0.0,
            offset_y: (side - h) / 2.0,
        }
    } else {
        let w = side * aspect;
        FitBox {
            width: w,
            height: side,
            offset_x: (side - w) / 2.0,
            offset_y: 0.0,
        }
    }
}

/// Scale a rendered symbol to an exact square size.
///
/// Returns a plain copy when the image already has the requested size.
pub fn scale_symbol(img: &RgbaImage, side: u32) -> RgbaImage {
    if img.width() == side && img.height() == side {
        debug!(side, "Symbol already at target size, skipping resize");
        return img.clone();
    }

    debug!(
        orig_w = img.width(),
        orig_h = img.height(),
        side,
        "Scaling symbol to target size"
    );
    image::imageops::resize(img, side.max(1), side.max(1), FilterType::Nearest)
}

/// Resize a logo so it fits inside a `side × side` box, keeping aspect ratio.
pub fn resize_to_fit(img: &DynamicImage, side: u32) -> (DynamicImage, FitBox) {
    let fit = fit_in_square(img.width(), img.height(), side);
    let w = (fit.width.round() as u32).max(1);
    let h = (fit.height.round() as u32).max(1);

    debug!(
        orig_w = img.width(),
        orig_h = img.height(),
        new_w = w,
        new_h = h,
        "Resizing logo to fit"
    );

    (img.resize_exact(w, h, FilterType::Lanczos3), fit)
}
