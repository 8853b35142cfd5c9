//! Alpha compositing of watermark overlays onto page rasters.

use super::{Placement, Rgb};
use image::{Rgb as RgbPixel, RgbImage, Rgba, RgbaImage};

/// An overlay drawn at one placement.
#[derive(Debug, Clone, Copy)]
pub struct OverlayDraw<'a> {
    pub overlay: &'a RgbaImage,
    pub placement: Placement,
}

/// Multiply every pixel's alpha by `opacity`.
pub fn apply_opacity(image: &mut RgbaImage, opacity: f32) {
    let opacity = opacity.clamp(0.0, 1.0);
    for pixel in image.pixels_mut() {
        pixel[3] = (pixel[3] as f32 * opacity).round() as u8;
    }
}

/// Draw each overlay onto `base` with the "over" operator.
///
/// Draws are applied in order. Parts of a box outside the base are clipped,
/// so boxes with negative origins or past the far edge are fine.
pub fn composite(mut base: RgbaImage, draws: &[OverlayDraw<'_>]) -> RgbaImage {
    for draw in draws {
        blend_overlay(&mut base, draw);
    }
    base
}

fn blend_overlay(target: &mut RgbaImage, draw: &OverlayDraw<'_>) {
    let target_w = target.width() as i64;
    let target_h = target.height() as i64;
    let p = draw.placement;
    let w = draw.overlay.width().min(p.width) as i64;
    let h = draw.overlay.height().min(p.height) as i64;

    let x_start = p.x.max(0);
    let y_start = p.y.max(0);
    let x_end = (p.x + w).min(target_w);
    let y_end = (p.y + h).min(target_h);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let src = *draw.overlay.get_pixel((tx - p.x) as u32, (ty - p.y) as u32);
            if src[3] == 0 {
                continue;
            }
            let dst = target.get_pixel_mut(tx as u32, ty as u32);
            *dst = over(*dst, src);
        }
    }
}

/// Porter-Duff "over" of `fg` onto `bg`.
pub fn over(bg: Rgba<u8>, fg: Rgba<u8>) -> Rgba<u8> {
    let fg_a = fg[3] as f32 / 255.0;
    let bg_a = bg[3] as f32 / 255.0;
    let out_a = fg_a + bg_a * (1.0 - fg_a);

    if out_a <= f32::EPSILON {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |f: u8, b: u8| -> u8 {
        let value = (f as f32 * fg_a + b as f32 * bg_a * (1.0 - fg_a)) / out_a;
        value.round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(fg[0], bg[0]),
        channel(fg[1], bg[1]),
        channel(fg[2], bg[2]),
        (out_a * 255.0).round() as u8,
    ])
}

/// Drop the alpha channel by blending onto an opaque background.
pub fn flatten(image: &RgbaImage, background: Rgb) -> RgbImage {
    let mut out = RgbImage::new(image.width(), image.height());
    for (src, dst) in image.pixels().zip(out.pixels_mut()) {
        let a = src[3] as f32 / 255.0;
        let mix = |c: u8, bg: u8| (c as f32 * a + bg as f32 * (1.0 - a)).round() as u8;
        *dst = RgbPixel([
            mix(src[0], background.r),
            mix(src[1], background.g),
            mix(src[2], background.b),
        ]);
    }
    out
}
