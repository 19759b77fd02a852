// SPDX-License-Identifier: MPL-2.0
//! Image layout modes and the texture transforms they produce.

use crate::error::{Error, Result};
use crate::geometry::{Rect, Size};
use tiny_skia::{SpreadMode, Transform};

/// How an image is fitted into its placement rectangle.
///
/// The discriminants are the serialized byte values; do not reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ImageLayout {
    /// Draw at natural size anchored to the top-left of the placement.
    #[default]
    Original = 0,
    /// Scale to fill the placement exactly, ignoring aspect ratio.
    Stretch = 1,
    /// Scale preserving aspect ratio, centered within the placement.
    Fit = 2,
    /// Natural size, centered within the placement.
    CenterImage = 3,
    /// Natural size, repeated across the placement.
    Tile = 4,
}

impl ImageLayout {
    #[must_use]
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    pub fn try_from_byte(value: u8) -> Result<Self> {
        match value {
            0 => Ok(ImageLayout::Original),
            1 => Ok(ImageLayout::Stretch),
            2 => Ok(ImageLayout::Fit),
            3 => Ok(ImageLayout::CenterImage),
            4 => Ok(ImageLayout::Tile),
            other => Err(Error::OutOfRange(format!(
                "{} is not a valid image layout",
                other
            ))),
        }
    }

    /// Spread mode used when the texture is sampled outside its own bounds.
    ///
    /// Texture brushes repeat by default, so the unscaled modes tile; the
    /// fitted modes pad, and the polygon being filled never extends past the
    /// placement rectangle.
    #[must_use]
    pub fn spread_mode(self) -> SpreadMode {
        match self {
            ImageLayout::Original | ImageLayout::Tile => SpreadMode::Repeat,
            ImageLayout::Stretch | ImageLayout::Fit | ImageLayout::CenterImage => SpreadMode::Pad,
        }
    }

    /// Transform mapping texture pixel space into a placement-local frame
    /// (origin at the placement's top-left corner).
    #[must_use]
    pub fn content_transform(self, natural: Size, frame: Size) -> Transform {
        let (nw, nh) = (natural.width.max(1) as f32, natural.height.max(1) as f32);
        let (fw, fh) = (frame.width.max(1) as f32, frame.height.max(1) as f32);
        match self {
            ImageLayout::Original | ImageLayout::Tile => Transform::identity(),
            ImageLayout::Stretch => Transform::from_scale(fw / nw, fh / nh),
            ImageLayout::Fit => {
                let s = (fw / nw).min(fh / nh);
                Transform::from_scale(s, s)
                    .post_translate((fw - nw * s) / 2.0, (fh - nh * s) / 2.0)
            }
            ImageLayout::CenterImage => {
                Transform::from_translate((fw - nw) / 2.0, (fh - nh) / 2.0)
            }
        }
    }

    /// Transform mapping texture pixel space into unrotated diagram
    /// coordinates for the given placement rectangle.
    #[must_use]
    pub fn texture_transform(self, natural: Size, placement: Rect) -> Transform {
        self.content_transform(natural, placement.size())
            .post_translate(placement.x as f32, placement.y as f32)
    }
}
