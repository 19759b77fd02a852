// SPDX-License-Identifier: MPL-2.0
use std::fmt;

#[derive(Debug, Clone)]
pub enum Error {
    /// A value was outside its documented range (gamma, transparency,
    /// caption index, layout byte).
    OutOfRange(String),

    /// A narrowing conversion from an externally supplied value overflowed.
    Overflow(String),

    /// A named resource was missing from its bundle or not decodable.
    Resource(String),

    /// A model-to-shape property id that neither this shape nor its base
    /// geometry knows how to apply.
    UnknownProperty(i32),

    /// Repository stream read/write failure.
    Io(String),

    /// Raster image decode/encode failure.
    Image(String),

    /// Vector (SVG) parse or render failure.
    Svg(String),

    /// Rendering resource construction failed (pixmap allocation, path build).
    Render(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfRange(e) => write!(f, "Value out of range: {}", e),
            Error::Overflow(e) => write!(f, "Arithmetic overflow: {}", e),
            Error::Resource(e) => write!(f, "Resource Error: {}", e),
            Error::UnknownProperty(id) => write!(f, "Unknown property id: {}", id),
            Error::Io(e) => write!(f, "I/O Error: {}", e),
            Error::Image(e) => write!(f, "Image Error: {}", e),
            Error::Svg(e) => write!(f, "SVG Error: {}", e),
            Error::Render(e) => write!(f, "Render Error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}

impl From<resvg::usvg::Error> for Error {
    fn from(err: resvg::usvg::Error) -> Self {
        Error::Svg(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
