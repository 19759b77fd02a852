// SPDX-License-Identifier: MPL-2.0
//! Built-in placeholder bitmap shown while no image is assigned.
//! The SVG is embedded so packaging does not need to locate assets on disk
//! and rasterized once on first use. Falls back to a flat gray tile if
//! rendering fails.

use image::RgbaImage;
use resvg::usvg;
use std::sync::OnceLock;

/// Placeholder edge length in pixels.
const PLACEHOLDER_SIZE: u32 = 64;

const SVG_SOURCE: &str = include_str!("../assets/placeholder.svg");

fn rasterize() -> Option<RgbaImage> {
    let tree = usvg::Tree::from_data(SVG_SOURCE.as_bytes(), &usvg::Options::default()).ok()?;

    let orig_size = tree.size();
    let scale_x = PLACEHOLDER_SIZE as f32 / orig_size.width();
    let scale_y = PLACEHOLDER_SIZE as f32 / orig_size.height();
    let transform = tiny_skia::Transform::from_scale(scale_x, scale_y);

    let mut pixmap = tiny_skia::Pixmap::new(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE)?;
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    // Pixmap data is premultiplied; convert back to straight alpha.
    let mut rgba = RgbaImage::new(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE);
    for (pixel, out) in pixmap.pixels().iter().zip(rgba.pixels_mut()) {
        let c = pixel.demultiply();
        out.0 = [c.red(), c.green(), c.blue(), c.alpha()];
    }
    Some(rgba)
}

/// Returns the shared placeholder bitmap.
pub fn placeholder_image() -> &'static RgbaImage {
    static PLACEHOLDER: OnceLock<RgbaImage> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        rasterize().unwrap_or_else(|| {
            RgbaImage::from_pixel(
                PLACEHOLDER_SIZE,
                PLACEHOLDER_SIZE,
                image::Rgba([200, 200, 200, 255]),
            )
        })
    })
}
