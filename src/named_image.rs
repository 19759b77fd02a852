// SPDX-License-Identifier: MPL-2.0
//! Named image values: a display name paired with a raster or vector payload.
//!
//! The named image is the unit of image ownership and serialization. Raster
//! payloads are decoded `image` buffers; vector payloads keep both the parsed
//! `usvg` tree (for rendering) and the original SVG bytes (for lossless
//! round-trips). Parsed trees are immutable, so clones share them.

use crate::error::{Error, Result};
use crate::geometry::Size;
use image::DynamicImage;
use resvg::usvg;
use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

/// Serialized payload kind tags.
pub(crate) const PAYLOAD_NONE: u8 = 0;
pub(crate) const PAYLOAD_RASTER: u8 = 1;
pub(crate) const PAYLOAD_VECTOR: u8 = 2;

#[derive(Clone)]
enum PayloadKind {
    Raster(DynamicImage),
    Vector {
        tree: Arc<usvg::Tree>,
        source: Arc<Vec<u8>>,
    },
}

/// An image payload plus the auxiliary tag an external persistence layer
/// reads as metadata alongside the pixel data.
#[derive(Clone)]
pub struct ImagePayload {
    pub(crate) tag: Option<String>,
    kind: PayloadKind,
}

impl ImagePayload {
    /// Wraps an already-decoded raster image.
    #[must_use]
    pub fn from_raster(image: DynamicImage) -> Self {
        Self {
            tag: None,
            kind: PayloadKind::Raster(image),
        }
    }

    /// Parses SVG bytes into a vector payload.
    pub fn from_svg(data: Vec<u8>) -> Result<Self> {
        let tree = usvg::Tree::from_data(&data, &usvg::Options::default())?;
        let size = tree.size().to_int_size();
        if size.width() == 0 || size.height() == 0 {
            return Err(Error::Svg("SVG has empty dimensions".into()));
        }
        Ok(Self {
            tag: None,
            kind: PayloadKind::Vector {
                tree: Arc::new(tree),
                source: Arc::new(data),
            },
        })
    }

    /// Decodes an image blob, sniffing raster formats first and falling
    /// back to SVG.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if image::guess_format(data).is_ok() {
            let decoded = image::load_from_memory(data)?;
            return Ok(Self::from_raster(decoded));
        }
        Self::from_svg(data.to_vec())
    }

    /// Natural pixel size of the payload.
    #[must_use]
    pub fn natural_size(&self) -> Size {
        match &self.kind {
            PayloadKind::Raster(img) => Size::new(img.width() as i32, img.height() as i32),
            PayloadKind::Vector { tree, .. } => {
                let s = tree.size().to_int_size();
                Size::new(s.width() as i32, s.height() as i32)
            }
        }
    }

    #[must_use]
    pub fn is_vector(&self) -> bool {
        matches!(self.kind, PayloadKind::Vector { .. })
    }

    #[must_use]
    pub fn as_raster(&self) -> Option<&DynamicImage> {
        match &self.kind {
            PayloadKind::Raster(img) => Some(img),
            PayloadKind::Vector { .. } => None,
        }
    }

    #[must_use]
    pub fn as_vector(&self) -> Option<&usvg::Tree> {
        match &self.kind {
            PayloadKind::Vector { tree, .. } => Some(tree),
            PayloadKind::Raster(_) => None,
        }
    }

    /// Original SVG bytes for vector payloads.
    #[must_use]
    pub fn vector_source(&self) -> Option<&[u8]> {
        match &self.kind {
            PayloadKind::Vector { source, .. } => Some(source),
            PayloadKind::Raster(_) => None,
        }
    }

    /// The auxiliary metadata tag.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn set_tag(&mut self, tag: Option<String>) {
        self.tag = tag;
    }

    /// Serialized kind tag for this payload.
    #[must_use]
    pub(crate) fn kind_byte(&self) -> u8 {
        match self.kind {
            PayloadKind::Raster(_) => PAYLOAD_RASTER,
            PayloadKind::Vector { .. } => PAYLOAD_VECTOR,
        }
    }

    /// Encodes the payload into its serialized blob: PNG for raster images
    /// (lossless, so round-trips are pixel-exact), original bytes for SVG.
    pub fn encode(&self) -> Result<Vec<u8>> {
        match &self.kind {
            PayloadKind::Raster(img) => {
                let mut buf = Vec::new();
                img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
                Ok(buf)
            }
            PayloadKind::Vector { source, .. } => Ok(source.to_vec()),
        }
    }

    /// Reconstructs a payload from its serialized kind tag and blob.
    pub(crate) fn decode(kind: u8, tag: Option<String>, data: &[u8]) -> Result<Self> {
        let mut payload = match kind {
            PAYLOAD_RASTER => Self::from_raster(image::load_from_memory(data)?),
            PAYLOAD_VECTOR => Self::from_svg(data.to_vec())?,
            other => {
                return Err(Error::Io(format!(
                    "unknown image payload kind tag: {}",
                    other
                )))
            }
        };
        payload.tag = tag;
        Ok(payload)
    }
}

impl fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.natural_size();
        f.debug_struct("ImagePayload")
            .field("kind", if self.is_vector() { &"vector" } else { &"raster" })
            .field("width", &size.width)
            .field("height", &size.height)
            .field("tag", &self.tag)
            .finish()
    }
}

/// An image value paired with a display name.
#[derive(Debug, Clone)]
pub struct NamedImage {
    name: String,
    payload: ImagePayload,
}

impl NamedImage {
    #[must_use]
    pub fn new(name: impl Into<String>, payload: ImagePayload) -> Self {
        Self {
            name: name.into(),
            payload,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn payload(&self) -> &ImagePayload {
        &self.payload
    }

    pub(crate) fn payload_mut(&mut self) -> &mut ImagePayload {
        &mut self.payload
    }

    #[must_use]
    pub fn natural_size(&self) -> Size {
        self.payload.natural_size()
    }

    /// Width of the image in pixels.
    #[must_use]
    pub fn width(&self) -> i32 {
        self.natural_size().width
    }

    /// Height of the image in pixels.
    #[must_use]
    pub fn height(&self) -> i32 {
        self.natural_size().height
    }
}
