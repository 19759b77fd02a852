// SPDX-License-Identifier: MPL-2.0
//! Property-binding surface: stable numeric ids for each designer-visible
//! property and the dispatcher that applies externally driven value changes.

use crate::color::Color;
use crate::error::{Error, Result};
use crate::layout::ImageLayout;
use crate::picture::PictureShape;

pub const PROPERTY_ID_IMAGE: i32 = 9;
pub const PROPERTY_ID_IMAGE_LAYOUT: i32 = 10;
pub const PROPERTY_ID_GRAY_SCALE: i32 = 11;
pub const PROPERTY_ID_GAMMA_CORRECTION: i32 = 12;
pub const PROPERTY_ID_TRANSPARENCY: i32 = 13;
pub const PROPERTY_ID_IMAGE_TRANSPARENT_COLOR: i32 = 14;

/// Capability level a caller role needs before it may set a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// May change the visual presentation of the shape.
    Present,
    /// May change the shape's data binding.
    ModifyData,
    /// May change the shape's layout/geometry.
    Layout,
}

/// One designer-visible property: display name, stable id and the
/// capability required to set it.
#[derive(Debug, Clone, Copy)]
pub struct PropertyDef {
    pub name: &'static str,
    pub id: i32,
    pub permission: Permission,
}

/// All properties this shape exposes for external data binding.
#[must_use]
pub fn property_definitions() -> Vec<PropertyDef> {
    vec![
        PropertyDef { name: "Image", id: PROPERTY_ID_IMAGE, permission: Permission::Present },
        PropertyDef {
            name: "ImageLayout",
            id: PROPERTY_ID_IMAGE_LAYOUT,
            permission: Permission::Present,
        },
        PropertyDef {
            name: "GrayScale",
            id: PROPERTY_ID_GRAY_SCALE,
            permission: Permission::Present,
        },
        PropertyDef {
            name: "GammaCorrection",
            id: PROPERTY_ID_GAMMA_CORRECTION,
            permission: Permission::Present,
        },
        PropertyDef {
            name: "Transparency",
            id: PROPERTY_ID_TRANSPARENCY,
            permission: Permission::Present,
        },
        PropertyDef {
            name: "TransparentColor",
            id: PROPERTY_ID_IMAGE_TRANSPARENT_COLOR,
            permission: Permission::Present,
        },
    ]
}

/// A typed value pushed by an external data-binding layer.
///
/// The binding layer hands over widened primitives; the dispatcher narrows
/// them back to the property's native type and fails loudly on overflow.
pub trait PropertyMapping {
    /// Stable id of the shape property this mapping targets.
    fn shape_property_id(&self) -> i32;
    /// Current value as a widened integer.
    fn get_integer(&self) -> i64;
    /// Current value as a float.
    fn get_float(&self) -> f32;
}

impl PictureShape {
    /// Applies a model-driven property change to the matching setter.
    ///
    /// The raw image property cannot be carried over a scalar binding and is
    /// ignored. Ids this shape does not recognize are reported as
    /// [`Error::UnknownProperty`] for the caller's base dispatcher.
    pub fn apply_property_mapping<M: PropertyMapping>(&mut self, mapping: &M) -> Result<()> {
        match mapping.shape_property_id() {
            PROPERTY_ID_IMAGE => {
                log::warn!("image property cannot be driven by a scalar mapping, ignored");
                Ok(())
            }
            PROPERTY_ID_IMAGE_LAYOUT => {
                let byte = u8::try_from(mapping.get_integer()).map_err(|_| {
                    Error::Overflow("image layout value does not fit in a byte".into())
                })?;
                self.set_layout(ImageLayout::try_from_byte(byte)?);
                Ok(())
            }
            PROPERTY_ID_GRAY_SCALE => {
                self.set_gray_scale(mapping.get_integer() != 0);
                Ok(())
            }
            PROPERTY_ID_GAMMA_CORRECTION => self.set_gamma(mapping.get_float()),
            PROPERTY_ID_TRANSPARENCY => {
                let value = u8::try_from(mapping.get_integer()).map_err(|_| {
                    Error::Overflow("transparency value does not fit in a byte".into())
                })?;
                self.set_transparency(value)
            }
            PROPERTY_ID_IMAGE_TRANSPARENT_COLOR => {
                let argb = i32::try_from(mapping.get_integer()).map_err(|_| {
                    Error::Overflow("color value does not fit in 32 bits".into())
                })?;
                self.set_transparent_color(Color::from_argb(argb));
                Ok(())
            }
            other => Err(Error::UnknownProperty(other)),
        }
    }
}
