// SPDX-License-Identifier: MPL-2.0
//! Packed ARGB colors and the color transform applied to image pixels.
//!
//! The transform combines every display parameter that affects pixel values
//! (gamma, transparency, grayscale, transparent color key, preview flag)
//! into a single descriptor so the texture only has to be rewritten once
//! per draw-cache rebuild.

use image::RgbaImage;

/// Packed 32-bit ARGB color (`0xAARRGGBB`), matching the serialized form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color(u32);

impl Color {
    /// The distinguished "no color" value.
    pub const EMPTY: Color = Color(0);

    #[must_use]
    pub fn from_argb(argb: i32) -> Self {
        Self(argb as u32)
    }

    #[must_use]
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(0xFF00_0000 | (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b))
    }

    #[must_use]
    pub fn to_argb(self) -> i32 {
        self.0 as i32
    }

    #[must_use]
    pub fn alpha(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[must_use]
    pub fn red(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[must_use]
    pub fn green(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[must_use]
    pub fn blue(self) -> u8 {
        self.0 as u8
    }

    /// Whether this is the distinguished empty value (all zero bits).
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

/// Color-mapping descriptor built from the shape's display parameters.
///
/// The gamma curve is precomputed into a lookup table; the remaining
/// parameters are cheap per-pixel operations.
#[derive(Clone)]
pub struct ColorTransform {
    gamma_lut: [u8; 256],
    alpha_factor: f32,
    grayscale: bool,
    transparent_key: Color,
    preview: bool,
}

impl ColorTransform {
    /// Builds a transform from validated display parameters.
    ///
    /// `gamma` is expected to be positive and `transparency` within
    /// `0..=100`; both are enforced by the shape's setters before a
    /// transform is ever built.
    #[must_use]
    pub fn new(
        gamma: f32,
        transparency: u8,
        grayscale: bool,
        transparent_key: Color,
        preview: bool,
    ) -> Self {
        let mut gamma_lut = [0u8; 256];
        let exponent = 1.0 / gamma;
        for (i, slot) in gamma_lut.iter_mut().enumerate() {
            let normalized = i as f32 / 255.0;
            *slot = (normalized.powf(exponent) * 255.0).round().clamp(0.0, 255.0) as u8;
        }
        Self {
            gamma_lut,
            alpha_factor: f32::from(100 - transparency.min(100)) / 100.0,
            grayscale,
            transparent_key,
            preview,
        }
    }

    /// Whether the descriptor was built for preview (reduced fidelity) mode.
    #[must_use]
    pub fn is_preview(&self) -> bool {
        self.preview
    }

    /// Maps one straight-alpha RGBA pixel.
    ///
    /// The color key is matched against the source color before any other
    /// mapping, mirroring how a color key selects source pixels.
    #[must_use]
    pub fn map_pixel(&self, pixel: [u8; 4]) -> [u8; 4] {
        let [r, g, b, a] = pixel;
        let mut a = a;
        if !self.transparent_key.is_empty()
            && r == self.transparent_key.red()
            && g == self.transparent_key.green()
            && b == self.transparent_key.blue()
        {
            a = 0;
        }
        let (mut r, mut g, mut b) = if self.grayscale {
            let luma = ((u32::from(r) * 299 + u32::from(g) * 587 + u32::from(b) * 114) / 1000)
                .min(255) as u8;
            (luma, luma, luma)
        } else {
            (r, g, b)
        };
        r = self.gamma_lut[usize::from(r)];
        g = self.gamma_lut[usize::from(g)];
        b = self.gamma_lut[usize::from(b)];
        let a = (f32::from(a) * self.alpha_factor).round().clamp(0.0, 255.0) as u8;
        [r, g, b, a]
    }

    /// Applies the transform in place to a straight-alpha RGBA buffer.
    pub fn apply(&self, image: &mut RgbaImage) {
        for pixel in image.pixels_mut() {
            pixel.0 = self.map_pixel(pixel.0);
        }
    }

    /// Applies the transform in place to a premultiplied pixmap (used for
    /// rendered vector frames).
    pub fn apply_to_pixmap(&self, pixmap: &mut tiny_skia::Pixmap) {
        for pixel in pixmap.pixels_mut() {
            let c = pixel.demultiply();
            let [r, g, b, a] = self.map_pixel([c.red(), c.green(), c.blue(), c.alpha()]);
            *pixel = tiny_skia::ColorU8::from_rgba(r, g, b, a).premultiply();
        }
    }
}

impl std::fmt::Debug for ColorTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColorTransform")
            .field("alpha_factor", &self.alpha_factor)
            .field("grayscale", &self.grayscale)
            .field("transparent_key", &self.transparent_key)
            .field("preview", &self.preview)
            .finish_non_exhaustive()
    }
}
