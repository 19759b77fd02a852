// SPDX-License-Identifier: MPL-2.0
use picture_shape::binding::{PropertyMapping, PROPERTY_ID_TRANSPARENCY};
use picture_shape::persist::{BinaryReader, BinaryWriter};
use picture_shape::{Color, ImageLayout, ImagePayload, NamedImage, PictureShape, Rect};
use std::fs::File;
use std::io::BufReader;
use tempfile::tempdir;

fn sample_image(name: &str) -> NamedImage {
    let img = image::RgbaImage::from_fn(16, 12, |x, y| {
        image::Rgba([(x * 16) as u8, (y * 20) as u8, 128, 255])
    });
    NamedImage::new(
        name,
        ImagePayload::from_raster(image::DynamicImage::ImageRgba8(img)),
    )
}

#[test]
fn shape_survives_a_save_and_reload_through_a_file() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("shape.bin");

    // 1. Configure a shape with an image and non-default parameters.
    let mut shape = PictureShape::new(200, 150);
    shape.move_by(40, 30);
    shape.set_angle(225);
    shape.set_text("Holiday photo");
    shape.set_image(Some(sample_image("holiday.png")));
    shape.set_layout(ImageLayout::Tile);
    shape.set_gray_scale(true);
    shape.set_gamma(1.4).expect("valid gamma");
    shape.set_transparency(25).expect("valid transparency");
    shape.set_transparent_color(Color::from_argb(0x00FF_FFFF));
    shape.set_compression_quality(90);

    // 2. Save to disk.
    let mut writer = BinaryWriter::new(File::create(&path).expect("create file"));
    shape.save_fields(&mut writer, 1).expect("save fields");

    // 3. Reload into a fresh shape and compare everything.
    let mut restored = PictureShape::new(0, 0);
    let mut reader = BinaryReader::new(BufReader::new(File::open(&path).expect("open file")));
    restored.load_fields(&mut reader, 1).expect("load fields");

    assert_eq!(restored.center(), shape.center());
    assert_eq!(restored.width(), shape.width());
    assert_eq!(restored.height(), shape.height());
    assert_eq!(restored.angle(), 225);
    assert_eq!(restored.text(), "Holiday photo");
    assert_eq!(restored.layout(), ImageLayout::Tile);
    assert!(restored.gray_scale());
    assert!((restored.gamma() - 1.4).abs() < f32::EPSILON);
    assert_eq!(restored.transparency(), 25);
    assert_eq!(restored.transparent_color(), Color::from_argb(0x00FF_FFFF));
    assert_eq!(restored.compression_quality(), 90);

    let original = shape.image().expect("image kept");
    let reloaded = restored.image().expect("image restored");
    assert_eq!(reloaded.name(), "holiday.png");
    assert_eq!(
        original.payload().as_raster().unwrap().to_rgba8().as_raw(),
        reloaded.payload().as_raster().unwrap().to_rgba8().as_raw(),
    );

    dir.close().expect("Failed to close temporary directory");
}

#[test]
fn empty_image_state_round_trips_as_empty() {
    let dir = tempdir().expect("Failed to create temporary directory");
    let path = dir.path().join("empty.bin");

    let mut shape = PictureShape::new(80, 60);
    let mut writer = BinaryWriter::new(File::create(&path).expect("create file"));
    shape.save_fields(&mut writer, 1).expect("save fields");

    let mut restored = PictureShape::new(0, 0);
    let mut reader = BinaryReader::new(BufReader::new(File::open(&path).expect("open file")));
    restored.load_fields(&mut reader, 1).expect("load fields");
    assert!(restored.image().is_none());

    dir.close().expect("Failed to close temporary directory");
}

#[test]
fn reloaded_shape_draws_without_a_rebuild_error() {
    let mut shape = PictureShape::new(20, 20);
    shape.move_by(10, 10);
    shape.set_image(Some(sample_image("drawn.png")));

    let mut writer = BinaryWriter::new(Vec::new());
    shape.save_fields(&mut writer, 1).expect("save fields");
    let bytes = writer.into_inner();

    let mut restored = PictureShape::new(0, 0);
    restored
        .load_fields(&mut BinaryReader::new(std::io::Cursor::new(bytes)), 1)
        .expect("load fields");

    let mut target = tiny_skia::Pixmap::new(20, 20).expect("pixmap");
    restored.draw(&mut target).expect("draw");
    assert!(target.pixels().iter().any(|p| p.alpha() > 0));
}

#[test]
fn placeholder_scenario_uses_full_bounds_for_placement() {
    // 200x150 shape, no image, empty text: placement covers the bounds.
    let mut shape = PictureShape::new(200, 150);
    assert_eq!(shape.image_placement_rect(), Rect::new(-100, -75, 200, 150));
    shape.update_draw_cache().expect("rebuild");
    // Drawing must succeed via the built-in placeholder.
    let mut target = tiny_skia::Pixmap::new(4, 4).expect("pixmap");
    shape.draw(&mut target).expect("draw with placeholder");
}

struct Transparency(i64);

impl PropertyMapping for Transparency {
    fn shape_property_id(&self) -> i32 {
        PROPERTY_ID_TRANSPARENCY
    }
    fn get_integer(&self) -> i64 {
        self.0
    }
    fn get_float(&self) -> f32 {
        self.0 as f32
    }
}

#[test]
fn externally_driven_transparency_change_invalidates_and_redraws() {
    let mut shape = PictureShape::new(20, 20);
    shape.move_by(10, 10);
    shape.set_image(Some(sample_image("dim.png")));
    shape.update_draw_cache().expect("rebuild");

    shape
        .apply_property_mapping(&Transparency(100))
        .expect("apply mapping");
    assert_eq!(shape.transparency(), 100);

    let mut target = tiny_skia::Pixmap::new(20, 20).expect("pixmap");
    shape.draw(&mut target).expect("draw");
    // Fully transparent image: the interior shows only the fill and outline.
    assert!(shape.image().is_some());
}
