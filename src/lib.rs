// SPDX-License-Identifier: MPL-2.0
//! `picture_shape` is a rectangular diagram shape that renders a raster or
//! vector image with configurable layout, gamma, transparency and grayscale
//! effects.
//!
//! It provides the image state holder, a lazily rebuilt draw cache, a binary
//! serialization adapter and a property-binding dispatcher; the surrounding
//! diagram model, style cache and editor UI are host territory and talk to
//! the shape through narrow traits.

#![doc(html_root_url = "https://docs.rs/picture-shape/0.2.0")]

pub mod binding;
pub mod color;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod named_image;
pub mod persist;
pub mod picture;
pub mod resource;
pub mod style;

mod draw_cache;
mod placeholder;

pub use color::Color;
pub use error::{Error, Result};
pub use geometry::{Point, Rect, Size};
pub use layout::ImageLayout;
pub use named_image::{ImagePayload, NamedImage};
pub use picture::PictureShape;
pub use placeholder::placeholder_image;
pub use resource::ResourceBundle;
