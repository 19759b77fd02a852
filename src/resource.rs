// SPDX-License-Identifier: MPL-2.0
//! Host-supplied resource bundles and the constructor path that loads a
//! shape's image from one by name.

use crate::error::{Error, Result};
use crate::named_image::{ImagePayload, NamedImage};
use crate::picture::PictureShape;
use std::collections::HashMap;

/// A named table of embedded resources handed over by the host application.
#[derive(Debug, Clone, Default)]
pub struct ResourceBundle {
    name: String,
    entries: HashMap<String, Vec<u8>>,
}

impl ResourceBundle {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: HashMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn insert(&mut self, resource_name: impl Into<String>, data: Vec<u8>) {
        self.entries.insert(resource_name.into(), data);
    }

    #[must_use]
    pub fn get(&self, resource_name: &str) -> Option<&[u8]> {
        self.entries.get(resource_name).map(Vec::as_slice)
    }
}

impl PictureShape {
    /// Loads the shape's image from a named resource in `bundle`.
    ///
    /// Fails when the name is empty, the resource is missing, or its bytes
    /// do not decode as an image; the error names both the resource and the
    /// bundle.
    pub fn with_resource_image(mut self, bundle: &ResourceBundle, resource_name: &str) -> Result<Self> {
        if resource_name.is_empty() {
            return Err(Error::Resource(format!(
                "empty resource name for bundle '{}'",
                bundle.name()
            )));
        }
        let data = bundle.get(resource_name).ok_or_else(|| {
            Error::Resource(format!(
                "resource '{}' not found in bundle '{}'",
                resource_name,
                bundle.name()
            ))
        })?;
        let payload = ImagePayload::from_bytes(data).map_err(|e| {
            Error::Resource(format!(
                "resource '{}' in bundle '{}' is not a decodable image: {}",
                resource_name,
                bundle.name(),
                e
            ))
        })?;
        self.set_image(Some(NamedImage::new(resource_name, payload)));
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = RgbaImage::from_pixel(5, 5, Rgba([0, 0, 255, 255]));
        let mut buf = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .expect("png encode");
        buf
    }

    #[test]
    fn loads_a_named_resource_image() {
        let mut bundle = ResourceBundle::new("icons");
        bundle.insert("logo.png", png_bytes());
        let shape = PictureShape::new(50, 50)
            .with_resource_image(&bundle, "logo.png")
            .unwrap();
        let image = shape.image().expect("image set");
        assert_eq!(image.name(), "logo.png");
        assert_eq!((image.width(), image.height()), (5, 5));
    }

    #[test]
    fn empty_resource_name_is_rejected() {
        let bundle = ResourceBundle::new("icons");
        let err = PictureShape::new(10, 10)
            .with_resource_image(&bundle, "")
            .unwrap_err();
        assert!(err.to_string().contains("icons"));
    }

    #[test]
    fn missing_resource_names_bundle_and_resource() {
        let bundle = ResourceBundle::new("icons");
        let err = PictureShape::new(10, 10)
            .with_resource_image(&bundle, "absent.png")
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("absent.png"));
        assert!(message.contains("icons"));
    }

    #[test]
    fn undecodable_resource_is_rejected() {
        let mut bundle = ResourceBundle::new("icons");
        bundle.insert("broken", b"not an image".to_vec());
        let err = PictureShape::new(10, 10)
            .with_resource_image(&bundle, "broken")
            .unwrap_err();
        assert!(matches!(err, Error::Resource(_)));
    }
}
