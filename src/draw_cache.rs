// SPDX-License-Identifier: MPL-2.0
//! Derived rendering state for a picture shape.
//!
//! The cache holds everything `draw` needs that is expensive to derive:
//! the image placement rectangle, its rotated corner points, the color
//! transform descriptor and the texture brush (or rendered vector frame).
//! It is rebuilt lazily after invalidation; small pose changes reuse the
//! existing texture and only re-derive the geometry.

use crate::color::ColorTransform;
use crate::error::{Error, Result};
use crate::geometry::{rotate_point, Point, Rect, Size};
use crate::layout::ImageLayout;
use image::imageops::FilterType;
use image::RgbaImage;
use resvg::usvg;
use tiny_skia::{Pixmap, PixmapPaint, SpreadMode, Transform};

/// Dirty-flag state of the draw cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum CacheState {
    #[default]
    Invalid,
    Valid,
}

/// A renderable texture plus the transform that places it in the diagram.
pub(crate) struct TextureBrush {
    pub(crate) texture: Pixmap,
    pub(crate) spread: SpreadMode,
    pub(crate) transform: Transform,
    /// Natural pixel size of the source image; differs from the texture
    /// size when the texture was downscaled for preview rendering.
    natural: Size,
}

impl TextureBrush {
    /// Texture-pixel to natural-pixel scale compensation.
    fn texture_scale(&self) -> (f32, f32) {
        (
            self.natural.width.max(1) as f32 / self.texture.width().max(1) as f32,
            self.natural.height.max(1) as f32 / self.texture.height().max(1) as f32,
        )
    }

    /// Re-derives the brush transform for a new pose without touching the
    /// texture pixels. Produces the same transform a full rebuild would.
    pub(crate) fn reorient(
        &mut self,
        layout: ImageLayout,
        placement: Rect,
        angle_degrees: f32,
        center: Point,
    ) {
        let (sx, sy) = self.texture_scale();
        let mut transform = layout
            .texture_transform(self.natural, placement)
            .pre_scale(sx, sy);
        if angle_degrees != 0.0 {
            transform = transform.post_concat(Transform::from_rotate_at(
                angle_degrees,
                center.x as f32,
                center.y as f32,
            ));
        }
        self.transform = transform;
    }
}

#[derive(Default)]
pub(crate) struct DrawCache {
    pub(crate) state: CacheState,
    pub(crate) placement: Rect,
    pub(crate) corners: [Point; 4],
    pub(crate) color_transform: Option<ColorTransform>,
    pub(crate) brush: Option<TextureBrush>,
    /// Rendered, color-transformed SVG frame at placement size; set instead
    /// of `brush` for vector payloads.
    pub(crate) vector_frame: Option<Pixmap>,
}

impl DrawCache {
    pub(crate) fn is_valid(&self) -> bool {
        self.state == CacheState::Valid
    }

    /// Drops all derived state. The brush and frame are released here so a
    /// stale texture can never outlive the parameters it was built from.
    pub(crate) fn invalidate(&mut self) {
        self.state = CacheState::Invalid;
        self.placement = Rect::default();
        self.corners = [Point::default(); 4];
        self.color_transform = None;
        self.brush = None;
        self.vector_frame = None;
    }

    /// Incremental pose update: offsets the placement, re-derives the
    /// corner points and re-orients the brush around the new pose.
    /// Only meaningful while the cache is valid.
    pub(crate) fn transform_by(
        &mut self,
        dx: i32,
        dy: i32,
        layout: ImageLayout,
        angle_degrees: f32,
        center: Point,
    ) {
        if !self.is_valid() {
            return;
        }
        self.placement.offset(dx, dy);
        self.corners = rotated_corners(self.placement, angle_degrees, center);
        if let Some(brush) = &mut self.brush {
            brush.reorient(layout, self.placement, angle_degrees, center);
        }
    }
}

/// Corner points of `rect` rotated by `angle_degrees` around `center`.
pub(crate) fn rotated_corners(rect: Rect, angle_degrees: f32, center: Point) -> [Point; 4] {
    let mut corners = rect.corners();
    if angle_degrees != 0.0 {
        for corner in &mut corners {
            *corner = rotate_point(center, angle_degrees, *corner);
        }
    }
    corners
}

/// Converts a straight-alpha RGBA buffer into a premultiplied pixmap.
pub(crate) fn pixmap_from_rgba(image: &RgbaImage) -> Result<Pixmap> {
    let mut pixmap = Pixmap::new(image.width().max(1), image.height().max(1))
        .ok_or_else(|| Error::Render("cannot allocate texture pixmap".into()))?;
    for (src, dst) in image.pixels().zip(pixmap.pixels_mut()) {
        let [r, g, b, a] = src.0;
        *dst = tiny_skia::ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

/// Builds the texture brush for a raster (or placeholder) source.
///
/// The color transform is baked into the texture pixels; in preview mode the
/// texture is downscaled to the placement rectangle and the brush transform
/// compensates, so preview and full-fidelity brushes cover the same area.
pub(crate) fn build_texture_brush(
    source: &RgbaImage,
    layout: ImageLayout,
    placement: Rect,
    angle_degrees: f32,
    center: Point,
    color_transform: &ColorTransform,
) -> Result<TextureBrush> {
    let natural = Size::new(source.width() as i32, source.height() as i32);

    let mut pixels = if color_transform.is_preview() {
        let max_w = placement.width.clamp(1, natural.width.max(1)) as u32;
        let max_h = placement.height.clamp(1, natural.height.max(1)) as u32;
        image::imageops::resize(source, max_w, max_h, FilterType::Triangle)
    } else {
        source.clone()
    };
    color_transform.apply(&mut pixels);

    let mut brush = TextureBrush {
        texture: pixmap_from_rgba(&pixels)?,
        spread: layout.spread_mode(),
        transform: Transform::identity(),
        natural,
    };
    brush.reorient(layout, placement, angle_degrees, center);
    Ok(brush)
}

/// Renders a vector payload into a placement-sized frame and applies the
/// color transform to the result. Rotation is applied when the frame is
/// drawn, not here.
pub(crate) fn render_vector_frame(
    tree: &usvg::Tree,
    layout: ImageLayout,
    frame: Size,
    color_transform: &ColorTransform,
) -> Result<Pixmap> {
    let width = frame.width.max(1) as u32;
    let height = frame.height.max(1) as u32;
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| Error::Render("cannot allocate vector frame pixmap".into()))?;

    let natural = tree.size().to_int_size();
    if layout == ImageLayout::Tile {
        let mut tile = Pixmap::new(natural.width().max(1), natural.height().max(1))
            .ok_or_else(|| Error::Render("cannot allocate vector tile pixmap".into()))?;
        resvg::render(tree, Transform::identity(), &mut tile.as_mut());
        let (tw, th) = (tile.width() as i32, tile.height() as i32);
        let mut y = 0;
        while y < frame.height {
            let mut x = 0;
            while x < frame.width {
                pixmap.draw_pixmap(
                    x,
                    y,
                    tile.as_ref(),
                    &PixmapPaint::default(),
                    Transform::identity(),
                    None,
                );
                x += tw;
            }
            y += th;
        }
    } else {
        let natural_size = Size::new(natural.width() as i32, natural.height() as i32);
        let transform = layout.content_transform(natural_size, frame);
        resvg::render(tree, transform, &mut pixmap.as_mut());
    }

    color_transform.apply_to_pixmap(&mut pixmap);
    Ok(pixmap)
}
