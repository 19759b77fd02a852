// SPDX-License-Identifier: MPL-2.0
//! Owned style values and the host display-service seam.
//!
//! The surrounding toolkit keeps styles in a shared cache; this crate only
//! needs the resolved values, so each shape owns a small copy. Text layout is
//! host territory: a [`DisplayService`] measures (and optionally draws)
//! captions with the host's font stack, and an offline estimate stands in
//! when no service is attached.

use crate::color::Color;
use crate::geometry::{Rect, Size};

/// Resolved outline style (the external style cache's "pen").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Color,
    pub width: f32,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            color: Color::from_rgb(0, 0, 0),
            width: 1.0,
        }
    }
}

impl LineStyle {
    pub(crate) fn to_paint(self) -> tiny_skia::Paint<'static> {
        let mut paint = tiny_skia::Paint::default();
        paint.set_color(tiny_skia::Color::from_rgba8(
            self.color.red(),
            self.color.green(),
            self.color.blue(),
            self.color.alpha(),
        ));
        paint.anti_alias = true;
        paint
    }

    pub(crate) fn to_stroke(self) -> tiny_skia::Stroke {
        tiny_skia::Stroke {
            width: self.width.max(0.1),
            ..tiny_skia::Stroke::default()
        }
    }
}

/// Resolved interior style (the external style cache's "brush").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillStyle {
    pub color: Color,
}

impl Default for FillStyle {
    fn default() -> Self {
        Self {
            color: Color::from_rgb(255, 255, 255),
        }
    }
}

impl FillStyle {
    pub(crate) fn to_paint(self) -> tiny_skia::Paint<'static> {
        let mut paint = tiny_skia::Paint::default();
        paint.set_color(tiny_skia::Color::from_rgba8(
            self.color.red(),
            self.color.green(),
            self.color.blue(),
            self.color.alpha(),
        ));
        paint.anti_alias = true;
        paint
    }
}

/// Resolved caption character style.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterStyle {
    /// Em size in diagram units.
    pub size: f32,
    pub color: Color,
}

impl Default for CharacterStyle {
    fn default() -> Self {
        Self {
            size: 12.0,
            color: Color::from_rgb(0, 0, 0),
        }
    }
}

/// Host-provided text services.
///
/// `measure_text` drives caption allowance in the draw cache; `draw_text`
/// renders the caption with the host's font stack. The default `draw_text`
/// is a no-op so measurement-only hosts stay trivial to implement.
pub trait DisplayService {
    /// Measures `text` constrained to `max`, returning the occupied size.
    fn measure_text(&self, text: &str, style: &CharacterStyle, max: Size) -> Size;

    /// Draws `text` into `bounds` (diagram coordinates), rotated by
    /// `angle_degrees` around the bounds' center.
    fn draw_text(
        &self,
        _target: &mut tiny_skia::Pixmap,
        _text: &str,
        _style: &CharacterStyle,
        _bounds: Rect,
        _angle_degrees: f32,
    ) {
    }
}

/// Offline text measurement used when no display service is attached.
///
/// Estimates a 0.6 em advance per character and a 1.2 em line height,
/// wrapping at the constraint width. Hosts with real font metrics should
/// supply a [`DisplayService`] instead.
#[must_use]
pub fn measure_text_offline(text: &str, style: &CharacterStyle, max: Size) -> Size {
    if text.is_empty() {
        return Size::new(0, 0);
    }
    let char_width = (style.size * 0.6).max(1.0);
    let line_height = (style.size * 1.2).ceil().max(1.0) as i32;
    let max_columns = ((max.width.max(1) as f32 / char_width).floor() as usize).max(1);

    let mut lines = 0i32;
    let mut widest_columns = 0usize;
    for raw_line in text.split('\n') {
        let columns = raw_line.chars().count();
        widest_columns = widest_columns.max(columns.min(max_columns));
        lines += ((columns.max(1) + max_columns - 1) / max_columns) as i32;
    }

    let width = ((widest_columns as f32 * char_width).ceil() as i32).min(max.width);
    let height = (lines * line_height).min(max.height);
    Size::new(width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_measures_zero() {
        let style = CharacterStyle::default();
        assert_eq!(
            measure_text_offline("", &style, Size::new(200, 150)),
            Size::new(0, 0)
        );
    }

    #[test]
    fn single_line_height_is_one_line() {
        let style = CharacterStyle { size: 10.0, color: Color::from_rgb(0, 0, 0) };
        let measured = measure_text_offline("Ip", &style, Size::new(200, 150));
        assert_eq!(measured.height, 12);
        assert_eq!(measured.width, 12);
    }

    #[test]
    fn long_text_wraps_at_constraint_width() {
        let style = CharacterStyle { size: 10.0, color: Color::from_rgb(0, 0, 0) };
        // 6 units per char, 10 columns fit in 60 units; 25 chars wrap to 3 lines.
        let measured = measure_text_offline(&"x".repeat(25), &style, Size::new(60, 150));
        assert_eq!(measured.height, 36);
        assert_eq!(measured.width, 60);
    }

    #[test]
    fn measurement_clamps_to_constraints() {
        let style = CharacterStyle { size: 40.0, color: Color::from_rgb(0, 0, 0) };
        let measured = measure_text_offline("a\nb\nc\nd", &style, Size::new(30, 50));
        assert!(measured.height <= 50);
        assert!(measured.width <= 30);
    }

    #[test]
    fn default_line_style_is_thin_black() {
        let style = LineStyle::default();
        assert_eq!(style.color, Color::from_rgb(0, 0, 0));
        assert!((style.width - 1.0).abs() < f32::EPSILON);
    }
}
