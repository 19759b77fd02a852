// SPDX-License-Identifier: MPL-2.0
//! Repository stream adapter: fixed-order field serialization.
//!
//! The shape reads and writes its fields through narrow reader/writer traits
//! so the surrounding repository engine stays external. [`BinaryReader`] and
//! [`BinaryWriter`] implement the traits over any byte stream using
//! little-endian primitives, length-prefixed UTF-8 strings and tagged image
//! blobs.

use crate::color::Color;
use crate::error::{Error, Result};
use crate::geometry::Point;
use crate::layout::ImageLayout;
use crate::named_image::{ImagePayload, NamedImage, PAYLOAD_NONE};
use crate::picture::PictureShape;
use std::io::{Read, Write};

/// Field source the shape loads itself from.
pub trait RepositoryReader {
    fn read_byte(&mut self) -> Result<u8>;
    fn read_bool(&mut self) -> Result<bool>;
    fn read_float(&mut self) -> Result<f32>;
    fn read_int32(&mut self) -> Result<i32>;
    fn read_string(&mut self) -> Result<String>;
    fn read_image(&mut self) -> Result<Option<ImagePayload>>;
}

/// Field sink the shape saves itself into.
pub trait RepositoryWriter {
    fn write_byte(&mut self, value: u8) -> Result<()>;
    fn write_bool(&mut self, value: bool) -> Result<()>;
    fn write_float(&mut self, value: f32) -> Result<()>;
    fn write_int32(&mut self, value: i32) -> Result<()>;
    fn write_string(&mut self, value: &str) -> Result<()>;
    fn write_image(&mut self, payload: Option<&ImagePayload>) -> Result<()>;
}

/// Declared type of a persisted field, for schema introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Byte,
    Bool,
    Float,
    Int32,
    String,
    Image,
}

/// Name and type of one persisted field, in stream order.
#[derive(Debug, Clone, Copy)]
pub struct FieldDefinition {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// The picture-specific fields appended after the base geometry fields,
/// in the order they appear in the stream. Stable across versions so far.
#[must_use]
pub fn field_definitions(_version: u32) -> Vec<FieldDefinition> {
    vec![
        FieldDefinition { name: "ImageLayout", kind: FieldKind::Byte },
        FieldDefinition { name: "ImageTransparency", kind: FieldKind::Byte },
        FieldDefinition { name: "ImageGammaCorrection", kind: FieldKind::Float },
        FieldDefinition { name: "ImageCompressionQuality", kind: FieldKind::Byte },
        FieldDefinition { name: "ConvertToGrayScale", kind: FieldKind::Bool },
        FieldDefinition { name: "ImageFileName", kind: FieldKind::String },
        FieldDefinition { name: "Image", kind: FieldKind::Image },
        FieldDefinition { name: "ImageTransparentColor", kind: FieldKind::Int32 },
    ]
}

impl PictureShape {
    /// Loads all fields from `reader` in stream order: base geometry first,
    /// then the picture fields of [`field_definitions`]. The image is only
    /// reconstructed when both a name and a payload were written.
    pub fn load_fields<R: RepositoryReader>(&mut self, reader: &mut R, version: u32) -> Result<()> {
        self.load_base_fields(reader, version)?;

        self.layout = ImageLayout::try_from_byte(reader.read_byte()?)?;
        self.set_transparency(reader.read_byte()?)?;
        self.set_gamma(reader.read_float()?)?;
        self.compression_quality = reader.read_byte()?;
        self.gray_scale = reader.read_bool()?;

        let name = reader.read_string()?;
        let payload = reader.read_image()?;
        self.image = match payload {
            Some(payload) if !name.is_empty() => Some(NamedImage::new(name, payload)),
            _ => None,
        };

        self.transparent_color = Color::from_argb(reader.read_int32()?);
        self.cache.invalidate();
        Ok(())
    }

    /// Saves all fields to `writer` in stream order.
    ///
    /// The image payload's auxiliary tag is stamped with the image name for
    /// the duration of the write so external image codecs see the name as
    /// metadata; the prior tag is restored even when a write fails.
    pub fn save_fields<W: RepositoryWriter>(&mut self, writer: &mut W, version: u32) -> Result<()> {
        self.save_base_fields(writer, version)?;

        writer.write_byte(self.layout.as_byte())?;
        writer.write_byte(self.transparency)?;
        writer.write_float(self.gamma)?;
        writer.write_byte(self.compression_quality)?;
        writer.write_bool(self.gray_scale)?;

        match &mut self.image {
            Some(image) => {
                writer.write_string(image.name())?;
                let name = image.name().to_owned();
                let prev_tag = image.payload().tag().map(str::to_owned);
                image.payload_mut().set_tag(Some(name));
                let written = writer.write_image(Some(image.payload()));
                image.payload_mut().set_tag(prev_tag);
                written?;
            }
            None => {
                writer.write_string("")?;
                writer.write_image(None)?;
            }
        }

        writer.write_int32(self.transparent_color.to_argb())
    }

    fn load_base_fields<R: RepositoryReader>(
        &mut self,
        reader: &mut R,
        _version: u32,
    ) -> Result<()> {
        self.center = Point::new(reader.read_int32()?, reader.read_int32()?);
        self.width = reader.read_int32()?;
        self.height = reader.read_int32()?;
        self.angle = reader.read_int32()?;
        self.text = reader.read_string()?;
        Ok(())
    }

    fn save_base_fields<W: RepositoryWriter>(
        &self,
        writer: &mut W,
        _version: u32,
    ) -> Result<()> {
        writer.write_int32(self.center.x)?;
        writer.write_int32(self.center.y)?;
        writer.write_int32(self.width)?;
        writer.write_int32(self.height)?;
        writer.write_int32(self.angle)?;
        writer.write_string(&self.text)
    }
}

/// Little-endian binary implementation of [`RepositoryReader`].
pub struct BinaryReader<R: Read> {
    inner: R,
}

impl<R: Read> BinaryReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    fn read_exact<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }
}

impl<R: Read> RepositoryReader for BinaryReader<R> {
    fn read_byte(&mut self) -> Result<u8> {
        Ok(self.read_exact::<1>()?[0])
    }

    fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_byte()? != 0)
    }

    fn read_float(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.read_exact::<4>()?))
    }

    fn read_int32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_exact::<4>()?))
    }

    fn read_string(&mut self) -> Result<String> {
        let len = u32::from_le_bytes(self.read_exact::<4>()?) as usize;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes).map_err(|e| Error::Io(format!("invalid UTF-8 string: {}", e)))
    }

    fn read_image(&mut self) -> Result<Option<ImagePayload>> {
        let kind = self.read_byte()?;
        if kind == PAYLOAD_NONE {
            return Ok(None);
        }
        let tag = self.read_string()?;
        let tag = (!tag.is_empty()).then_some(tag);
        let len = u32::from_le_bytes(self.read_exact::<4>()?) as usize;
        let data = self.read_bytes(len)?;
        ImagePayload::decode(kind, tag, &data).map(Some)
    }
}

/// Little-endian binary implementation of [`RepositoryWriter`].
pub struct BinaryWriter<W: Write> {
    inner: W,
}

impl<W: Write> BinaryWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Consumes the writer, returning the underlying stream.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> RepositoryWriter for BinaryWriter<W> {
    fn write_byte(&mut self, value: u8) -> Result<()> {
        Ok(self.inner.write_all(&[value])?)
    }

    fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_byte(u8::from(value))
    }

    fn write_float(&mut self, value: f32) -> Result<()> {
        Ok(self.inner.write_all(&value.to_le_bytes())?)
    }

    fn write_int32(&mut self, value: i32) -> Result<()> {
        Ok(self.inner.write_all(&value.to_le_bytes())?)
    }

    fn write_string(&mut self, value: &str) -> Result<()> {
        let len = u32::try_from(value.len())
            .map_err(|_| Error::Overflow("string too long for stream".into()))?;
        self.inner.write_all(&len.to_le_bytes())?;
        Ok(self.inner.write_all(value.as_bytes())?)
    }

    fn write_image(&mut self, payload: Option<&ImagePayload>) -> Result<()> {
        match payload {
            None => self.write_byte(PAYLOAD_NONE),
            Some(payload) => {
                self.write_byte(payload.kind_byte())?;
                self.write_string(payload.tag().unwrap_or(""))?;
                let data = payload.encode()?;
                let len = u32::try_from(data.len())
                    .map_err(|_| Error::Overflow("image blob too large for stream".into()))?;
                self.inner.write_all(&len.to_le_bytes())?;
                Ok(self.inner.write_all(&data)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn raster_image(name: &str) -> NamedImage {
        let img = RgbaImage::from_pixel(3, 2, Rgba([10, 200, 30, 255]));
        NamedImage::new(name, ImagePayload::from_raster(DynamicImage::ImageRgba8(img)))
    }

    fn round_trip(shape: &mut PictureShape) -> PictureShape {
        let mut writer = BinaryWriter::new(Vec::new());
        shape.save_fields(&mut writer, 1).expect("save");
        let bytes = writer.into_inner();
        let mut restored = PictureShape::new(0, 0);
        restored
            .load_fields(&mut BinaryReader::new(Cursor::new(bytes)), 1)
            .expect("load");
        restored
    }

    #[test]
    fn primitives_round_trip_little_endian() {
        let mut writer = BinaryWriter::new(Vec::new());
        writer.write_byte(7).unwrap();
        writer.write_bool(true).unwrap();
        writer.write_float(1.25).unwrap();
        writer.write_int32(-40).unwrap();
        writer.write_string("héllo").unwrap();
        let bytes = writer.into_inner();

        let mut reader = BinaryReader::new(Cursor::new(bytes));
        assert_eq!(reader.read_byte().unwrap(), 7);
        assert!(reader.read_bool().unwrap());
        assert!((reader.read_float().unwrap() - 1.25).abs() < f32::EPSILON);
        assert_eq!(reader.read_int32().unwrap(), -40);
        assert_eq!(reader.read_string().unwrap(), "héllo");
    }

    #[test]
    fn truncated_stream_reports_io_error() {
        let mut reader = BinaryReader::new(Cursor::new(vec![1, 2]));
        match reader.read_int32() {
            Err(Error::Io(_)) => {}
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn shape_with_image_round_trips_all_parameters() {
        let mut shape = PictureShape::new(200, 150);
        shape.move_by(15, -5);
        shape.set_angle(450);
        shape.set_text("photo");
        shape.set_image(Some(raster_image("portrait")));
        shape.set_layout(ImageLayout::Fit);
        shape.set_gray_scale(true);
        shape.set_gamma(2.2).unwrap();
        shape.set_transparency(40).unwrap();
        shape.set_transparent_color(Color::from_argb(0x00FF_00FF));
        shape.set_compression_quality(85);

        let restored = round_trip(&mut shape);
        assert_eq!(restored.center(), shape.center());
        assert_eq!(restored.width(), 200);
        assert_eq!(restored.height(), 150);
        assert_eq!(restored.angle(), 450);
        assert_eq!(restored.text(), "photo");
        assert_eq!(restored.layout(), ImageLayout::Fit);
        assert!(restored.gray_scale());
        assert!((restored.gamma() - 2.2).abs() < f32::EPSILON);
        assert_eq!(restored.transparency(), 40);
        assert_eq!(restored.transparent_color(), Color::from_argb(0x00FF_00FF));
        assert_eq!(restored.compression_quality(), 85);

        let image = restored.image().expect("image restored");
        assert_eq!(image.name(), "portrait");
        let original = shape.image().unwrap().payload().as_raster().unwrap();
        let loaded = image.payload().as_raster().unwrap();
        assert_eq!(original.to_rgba8().as_raw(), loaded.to_rgba8().as_raw());
    }

    #[test]
    fn shape_without_image_round_trips_empty() {
        let mut shape = PictureShape::new(60, 40);
        let restored = round_trip(&mut shape);
        assert!(restored.image().is_none());
    }

    #[test]
    fn vector_image_round_trips_source_bytes() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="5" height="5"><circle cx="2" cy="2" r="2"/></svg>"#;
        let mut shape = PictureShape::new(30, 30);
        shape.set_image(Some(NamedImage::new(
            "icon",
            ImagePayload::from_svg(svg.as_bytes().to_vec()).unwrap(),
        )));
        let restored = round_trip(&mut shape);
        let image = restored.image().expect("image restored");
        assert!(image.payload().is_vector());
        assert_eq!(image.payload().vector_source().unwrap(), svg.as_bytes());
    }

    #[test]
    fn saved_image_carries_its_name_as_tag() {
        let mut shape = PictureShape::new(10, 10);
        shape.set_image(Some(raster_image("tagged")));
        let mut writer = BinaryWriter::new(Vec::new());
        shape.save_fields(&mut writer, 1).unwrap();
        let restored = {
            let mut s = PictureShape::new(0, 0);
            s.load_fields(&mut BinaryReader::new(Cursor::new(writer.into_inner())), 1)
                .unwrap();
            s
        };
        assert_eq!(restored.image().unwrap().payload().tag(), Some("tagged"));
    }

    #[test]
    fn image_tag_is_restored_when_a_later_field_fails() {
        let mut shape = PictureShape::new(10, 10);
        let mut image = raster_image("named");
        // write_int32 also carries the base geometry; this writer only fails
        // for the trailing transparent-color field (the sixth int32).
        struct TailFailingWriter {
            inner: BinaryWriter<Vec<u8>>,
            int32_writes: usize,
        }
        impl RepositoryWriter for TailFailingWriter {
            fn write_byte(&mut self, value: u8) -> Result<()> {
                self.inner.write_byte(value)
            }
            fn write_bool(&mut self, value: bool) -> Result<()> {
                self.inner.write_bool(value)
            }
            fn write_float(&mut self, value: f32) -> Result<()> {
                self.inner.write_float(value)
            }
            fn write_int32(&mut self, value: i32) -> Result<()> {
                self.int32_writes += 1;
                if self.int32_writes > 5 {
                    return Err(Error::Io("stream closed".into()));
                }
                self.inner.write_int32(value)
            }
            fn write_string(&mut self, value: &str) -> Result<()> {
                self.inner.write_string(value)
            }
            fn write_image(&mut self, payload: Option<&ImagePayload>) -> Result<()> {
                self.inner.write_image(payload)
            }
        }

        image.payload_mut().set_tag(Some("prior-tag".into()));
        shape.set_image(Some(image));
        let mut writer = TailFailingWriter {
            inner: BinaryWriter::new(Vec::new()),
            int32_writes: 0,
        };
        assert!(shape.save_fields(&mut writer, 1).is_err());
        assert_eq!(
            shape.image().unwrap().payload().tag(),
            Some("prior-tag"),
            "tag swap must be transactional"
        );
    }

    #[test]
    fn field_definitions_match_stream_order() {
        let defs = field_definitions(1);
        assert_eq!(defs.len(), 8);
        assert_eq!(defs[0].name, "ImageLayout");
        assert_eq!(defs[0].kind, FieldKind::Byte);
        assert_eq!(defs[6].name, "Image");
        assert_eq!(defs[6].kind, FieldKind::Image);
        assert_eq!(defs[7].name, "ImageTransparentColor");
        assert_eq!(defs[7].kind, FieldKind::Int32);
    }
}
