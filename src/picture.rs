// SPDX-License-Identifier: MPL-2.0
//! The picture shape: a rectangle that renders an image with configurable
//! layout, gamma, transparency and grayscale effects.
//!
//! Display parameters are validated in their setters and never leave the
//! shape in a partially updated state. Everything derived from them lives in
//! the draw cache, which is invalidated on any mutation and rebuilt lazily on
//! the next draw.

use crate::color::{Color, ColorTransform};
use crate::draw_cache::{
    build_texture_brush, render_vector_frame, rotated_corners, CacheState, DrawCache,
};
use crate::error::{Error, Result};
use crate::geometry::{normalize_angle, tenths_of_degree_to_degrees, Point, Rect, Size};
use crate::layout::ImageLayout;
use crate::named_image::NamedImage;
use crate::placeholder::placeholder_image;
use crate::style::{measure_text_offline, CharacterStyle, DisplayService, FillStyle, LineStyle};
use std::fmt;
use std::rc::Rc;
use tiny_skia::{FillRule, FilterQuality, Paint, Path, PathBuilder, Pattern, Pixmap, PixmapPaint, Transform};

/// Default JPEG quality used when the host re-encodes the image.
const DEFAULT_COMPRESSION_QUALITY: u8 = 100;

pub struct PictureShape {
    pub(crate) center: Point,
    pub(crate) width: i32,
    pub(crate) height: i32,
    /// Rotation in tenths of a degree, normalized into `0..3600`.
    pub(crate) angle: i32,
    pub(crate) text: String,
    pub(crate) line_style: LineStyle,
    pub(crate) fill_style: FillStyle,
    pub(crate) character_style: CharacterStyle,
    pub(crate) children: Vec<PictureShape>,
    display: Option<Rc<dyn DisplayService>>,
    pub(crate) image: Option<NamedImage>,
    pub(crate) layout: ImageLayout,
    pub(crate) gray_scale: bool,
    pub(crate) gamma: f32,
    pub(crate) transparency: u8,
    pub(crate) transparent_color: Color,
    pub(crate) compression_quality: u8,
    is_preview: bool,
    pub(crate) cache: DrawCache,
}

impl PictureShape {
    /// Creates a shape of the given size centered at the origin, with no
    /// image assigned and default display parameters.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            center: Point::new(0, 0),
            width,
            height,
            angle: 0,
            text: String::new(),
            line_style: LineStyle::default(),
            fill_style: FillStyle::default(),
            character_style: CharacterStyle::default(),
            children: Vec::new(),
            display: None,
            image: None,
            layout: ImageLayout::default(),
            gray_scale: false,
            gamma: 1.0,
            transparency: 0,
            transparent_color: Color::EMPTY,
            compression_quality: DEFAULT_COMPRESSION_QUALITY,
            is_preview: false,
            cache: DrawCache::default(),
        }
    }

    // --- geometry -------------------------------------------------------

    #[must_use]
    pub fn center(&self) -> Point {
        self.center
    }

    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Rotation angle in tenths of a degree.
    #[must_use]
    pub fn angle(&self) -> i32 {
        self.angle
    }

    #[must_use]
    pub(crate) fn angle_degrees(&self) -> f32 {
        tenths_of_degree_to_degrees(self.angle)
    }

    /// Unrotated bounding rectangle in diagram coordinates.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.center.x - self.width / 2,
            self.center.y - self.height / 2,
            self.width,
            self.height,
        )
    }

    pub fn resize(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
        self.cache.invalidate();
    }

    /// Moves the shape by a delta. A valid draw cache is updated in place
    /// instead of being rebuilt.
    pub fn move_by(&mut self, dx: i32, dy: i32) {
        self.center = self.center.offset(dx, dy);
        self.cache
            .transform_by(dx, dy, self.layout, self.angle_degrees(), self.center);
    }

    /// Rotates the shape by a tenths-of-degree delta around its center,
    /// re-orienting a valid draw cache in place.
    pub fn rotate_by(&mut self, delta_tenths: i32) {
        self.angle = normalize_angle(self.angle + delta_tenths);
        self.cache
            .transform_by(0, 0, self.layout, self.angle_degrees(), self.center);
    }

    pub fn set_angle(&mut self, angle_tenths: i32) {
        self.rotate_by(angle_tenths - self.angle);
    }

    // --- image state ----------------------------------------------------

    #[must_use]
    pub fn image(&self) -> Option<&NamedImage> {
        self.image.as_ref()
    }

    /// Assigns or clears the image. Clearing releases the cached rendering
    /// resources immediately via invalidation.
    pub fn set_image(&mut self, image: Option<NamedImage>) {
        self.image = image;
        self.cache.invalidate();
    }

    #[must_use]
    pub fn layout(&self) -> ImageLayout {
        self.layout
    }

    pub fn set_layout(&mut self, layout: ImageLayout) {
        self.layout = layout;
        self.cache.invalidate();
    }

    #[must_use]
    pub fn gray_scale(&self) -> bool {
        self.gray_scale
    }

    pub fn set_gray_scale(&mut self, gray_scale: bool) {
        self.gray_scale = gray_scale;
        self.cache.invalidate();
    }

    #[must_use]
    pub fn gamma(&self) -> f32 {
        self.gamma
    }

    /// Sets the gamma correction factor. Values that are not strictly
    /// positive are rejected and the previous value is kept.
    pub fn set_gamma(&mut self, gamma: f32) -> Result<()> {
        if !(gamma > 0.0) {
            return Err(Error::OutOfRange(format!(
                "gamma must be greater than 0, got {}",
                gamma
            )));
        }
        self.gamma = gamma;
        self.cache.invalidate();
        Ok(())
    }

    #[must_use]
    pub fn transparency(&self) -> u8 {
        self.transparency
    }

    /// Sets the transparency percentage. Values above 100 are rejected and
    /// the previous value is kept.
    pub fn set_transparency(&mut self, transparency: u8) -> Result<()> {
        if transparency > 100 {
            return Err(Error::OutOfRange(format!(
                "transparency must be within 0..=100, got {}",
                transparency
            )));
        }
        self.transparency = transparency;
        self.cache.invalidate();
        Ok(())
    }

    #[must_use]
    pub fn transparent_color(&self) -> Color {
        self.transparent_color
    }

    pub fn set_transparent_color(&mut self, color: Color) {
        self.transparent_color = color;
        self.cache.invalidate();
    }

    #[must_use]
    pub fn compression_quality(&self) -> u8 {
        self.compression_quality
    }

    pub fn set_compression_quality(&mut self, quality: u8) {
        self.compression_quality = quality;
    }

    // --- caption and styles ---------------------------------------------

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cache.invalidate();
    }

    pub fn set_line_style(&mut self, style: LineStyle) {
        self.line_style = style;
    }

    pub fn set_fill_style(&mut self, style: FillStyle) {
        self.fill_style = style;
    }

    pub fn set_character_style(&mut self, style: CharacterStyle) {
        self.character_style = style;
        self.cache.invalidate();
    }

    pub fn set_display_service(&mut self, service: Option<Rc<dyn DisplayService>>) {
        self.display = service;
        self.cache.invalidate();
    }

    fn measure(&self, text: &str, max: Size) -> Size {
        match &self.display {
            Some(service) => service.measure_text(text, &self.character_style, max),
            None => measure_text_offline(text, &self.character_style, max),
        }
    }

    /// Bounds of the single caption slot, anchored to the bottom edge of the
    /// shape. Empty text is measured as "Ip" so the slot keeps a usable
    /// height while the caption is being edited.
    pub fn caption_bounds(&self, index: usize) -> Result<Rect> {
        if index != 0 {
            return Err(Error::OutOfRange(format!(
                "caption index {} out of range, only one caption is supported",
                index
            )));
        }
        let bounds = self.bounds();
        let sample = if self.text.is_empty() { "Ip" } else { &self.text };
        let measured = self.measure(sample, bounds.size());
        Ok(Rect::new(
            bounds.left(),
            bounds.bottom() - measured.height,
            bounds.width,
            measured.height,
        ))
    }

    /// The rectangle the image is fitted into: the shape's bounds minus the
    /// caption allowance. An empty caption reserves no space.
    #[must_use]
    pub fn image_placement_rect(&self) -> Rect {
        let mut rect = self.bounds();
        if !self.text.is_empty() {
            let caption = self.measure(&self.text, rect.size());
            rect.height = (rect.height - caption.height).max(0);
        }
        rect
    }

    // --- whole-shape operations -------------------------------------------

    /// Resizes the shape so its image placement rectangle matches the
    /// image's natural size, preserving the current margin and caption
    /// allowance. No-op without an image.
    pub fn fit_to_image_size(&mut self) {
        if let Some(image) = &self.image {
            let fitted = fitted_size(
                Size::new(self.width, self.height),
                self.image_placement_rect().size(),
                image.natural_size(),
            );
            self.resize(fitted.width, fitted.height);
        }
    }

    /// Copies the base geometry, the image (deep) and all display
    /// parameters from `other`.
    pub fn copy_from(&mut self, other: &PictureShape) {
        self.center = other.center;
        self.width = other.width;
        self.height = other.height;
        self.angle = other.angle;
        self.text = other.text.clone();
        self.image = other.image.clone();
        self.layout = other.layout;
        self.gray_scale = other.gray_scale;
        self.gamma = other.gamma;
        self.transparency = other.transparency;
        self.transparent_color = other.transparent_color;
        self.compression_quality = other.compression_quality;
        self.cache.invalidate();
    }

    #[must_use]
    pub fn is_preview(&self) -> bool {
        self.is_preview
    }

    /// Switches the shape to reduced-fidelity preview rendering. The next
    /// draw builds a downscaled texture sized to the placement rectangle.
    pub fn make_preview(&mut self) {
        self.is_preview = true;
        self.cache.invalidate();
    }

    pub fn add_child(&mut self, child: PictureShape) {
        self.children.push(child);
    }

    #[must_use]
    pub fn children(&self) -> &[PictureShape] {
        &self.children
    }

    pub fn invalidate_draw_cache(&mut self) {
        self.cache.invalidate();
    }

    // --- drawing ----------------------------------------------------------

    /// Rebuilds the draw cache if it is invalid.
    pub fn update_draw_cache(&mut self) -> Result<()> {
        if self.cache.is_valid() {
            return Ok(());
        }
        let placement = self.image_placement_rect();
        let angle = self.angle_degrees();
        log::debug!(
            "rebuilding draw cache: placement {:?}, angle {} deg",
            placement,
            angle
        );

        let color_transform = ColorTransform::new(
            self.gamma,
            self.transparency,
            self.gray_scale,
            self.transparent_color,
            self.is_preview,
        );

        let mut brush = None;
        let mut vector_frame = None;
        match &self.image {
            Some(image) => {
                if let Some(tree) = image.payload().as_vector() {
                    vector_frame = Some(render_vector_frame(
                        tree,
                        self.layout,
                        placement.size(),
                        &color_transform,
                    )?);
                } else if let Some(raster) = image.payload().as_raster() {
                    brush = Some(build_texture_brush(
                        &raster.to_rgba8(),
                        self.layout,
                        placement,
                        angle,
                        self.center,
                        &color_transform,
                    )?);
                }
            }
            None => {
                brush = Some(build_texture_brush(
                    placeholder_image(),
                    self.layout,
                    placement,
                    angle,
                    self.center,
                    &color_transform,
                )?);
            }
        }

        self.cache.placement = placement;
        self.cache.corners = rotated_corners(placement, angle, self.center);
        self.cache.color_transform = Some(color_transform);
        self.cache.brush = brush;
        self.cache.vector_frame = vector_frame;
        self.cache.state = CacheState::Valid;
        Ok(())
    }

    /// Draws the shape onto `target`: interior fill, image content, caption,
    /// outline stroke, then children.
    pub fn draw(&mut self, target: &mut Pixmap) -> Result<()> {
        self.update_draw_cache()?;

        let outline = polygon_path(&rotated_corners(
            self.bounds(),
            self.angle_degrees(),
            self.center,
        ))?;
        target.fill_path(
            &outline,
            &self.fill_style.to_paint(),
            FillRule::Winding,
            Transform::identity(),
            None,
        );

        if let Some(frame) = &self.cache.vector_frame {
            let transform = if self.angle == 0 {
                Transform::identity()
            } else {
                Transform::from_rotate_at(
                    self.angle_degrees(),
                    self.center.x as f32,
                    self.center.y as f32,
                )
            };
            target.draw_pixmap(
                self.cache.placement.x,
                self.cache.placement.y,
                frame.as_ref(),
                &PixmapPaint::default(),
                transform,
                None,
            );
        } else if let Some(brush) = &self.cache.brush {
            let region = polygon_path(&self.cache.corners)?;
            let mut paint = Paint::default();
            paint.shader = Pattern::new(
                brush.texture.as_ref(),
                brush.spread,
                FilterQuality::Bilinear,
                1.0,
                brush.transform,
            );
            paint.anti_alias = true;
            target.fill_path(&region, &paint, FillRule::Winding, Transform::identity(), None);
        }

        if !self.text.is_empty() {
            if let Some(display) = &self.display {
                let bounds = self.caption_bounds(0)?;
                display.draw_text(
                    target,
                    &self.text,
                    &self.character_style,
                    bounds,
                    self.angle_degrees(),
                );
            }
        }

        target.stroke_path(
            &outline,
            &self.line_style.to_paint(),
            &self.line_style.to_stroke(),
            Transform::identity(),
            None,
        );

        for child in &mut self.children {
            child.draw(target)?;
        }
        Ok(())
    }
}

/// Shape size that makes the placement rectangle match the image's natural
/// size while keeping the current size-to-placement deficit.
pub(crate) fn fitted_size(shape: Size, placement: Size, natural: Size) -> Size {
    Size::new(
        natural.width + (shape.width - placement.width),
        natural.height + (shape.height - placement.height),
    )
}

fn polygon_path(corners: &[Point; 4]) -> Result<Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(corners[0].x as f32, corners[0].y as f32);
    for corner in &corners[1..] {
        pb.line_to(corner.x as f32, corner.y as f32);
    }
    pb.close();
    pb.finish()
        .ok_or_else(|| Error::Render("cannot build shape outline path".into()))
}

impl Clone for PictureShape {
    /// Deep copy; the draw cache is never shared, the clone starts invalid.
    fn clone(&self) -> Self {
        Self {
            center: self.center,
            width: self.width,
            height: self.height,
            angle: self.angle,
            text: self.text.clone(),
            line_style: self.line_style,
            fill_style: self.fill_style,
            character_style: self.character_style.clone(),
            children: self.children.clone(),
            display: self.display.clone(),
            image: self.image.clone(),
            layout: self.layout,
            gray_scale: self.gray_scale,
            gamma: self.gamma,
            transparency: self.transparency,
            transparent_color: self.transparent_color,
            compression_quality: self.compression_quality,
            is_preview: self.is_preview,
            cache: DrawCache::default(),
        }
    }
}

impl fmt::Debug for PictureShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PictureShape")
            .field("center", &self.center)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("angle", &self.angle)
            .field("text", &self.text)
            .field("image", &self.image)
            .field("layout", &self.layout)
            .field("gray_scale", &self.gray_scale)
            .field("gamma", &self.gamma)
            .field("transparency", &self.transparency)
            .field("transparent_color", &self.transparent_color)
            .field("is_preview", &self.is_preview)
            .finish_non_exhaustive()
    }
}
