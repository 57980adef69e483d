//! Scenario tests driving a canvas with real image files.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use image::{Rgba, RgbaImage};
use mipview::WHEEL_NOTCH;
use mipview::prelude::*;
use mipview::render::{FramePlan, Scene};
use tempfile::TempDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("mipview=debug,mipview_render=debug")
        .with_test_writer()
        .try_init();
}

fn write_png(dir: &TempDir, name: &str, width: u32, height: u32, color: [u8; 4]) -> PathBuf {
    let path = dir.path().join(name);
    RgbaImage::from_pixel(width, height, Rgba(color))
        .save(&path)
        .unwrap();
    path
}

fn loaded_canvas(dir: &TempDir, width: u32, height: u32, viewport: Size) -> Canvas {
    let path = write_png(dir, "image.png", width, height, [200, 100, 50, 255]);
    let mut canvas = Canvas::default();
    canvas.resize(viewport);
    canvas.set_image(&path).unwrap();
    canvas
}

fn wheel(canvas: &mut Canvas, notches: i32, at: Point) -> EventResponse {
    canvas.handle_event(CanvasEvent::Wheel {
        delta: notches * WHEEL_NOTCH,
        position: at,
    })
}

fn drag(canvas: &mut Canvas, from: Point, to: Point) {
    let press = canvas.handle_event(CanvasEvent::PointerPressed {
        button: MouseButton::Left,
        position: from,
    });
    assert_eq!(press.capture, Some(CaptureChange::Acquire));
    let moved = canvas.handle_event(CanvasEvent::PointerMoved { position: to });
    assert!(moved.repaint);
    let release = canvas.handle_event(CanvasEvent::PointerReleased {
        button: MouseButton::Left,
        position: to,
    });
    assert_eq!(release.capture, Some(CaptureChange::Release));
    assert!(!canvas.is_panning());
}

fn plan(canvas: &Canvas) -> FramePlan {
    let viewport = canvas.viewport_size();
    canvas
        .renderer()
        .plan(&canvas.scene(), viewport, Rect::from_size(viewport))
}

#[test]
fn test_zoomed_out_draws_level_three_unscaled() {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let mut canvas = loaded_canvas(&dir, 1000, 700, Size::new(800, 600));
    assert_eq!(canvas.state(), CanvasState::Ready);
    assert_eq!(canvas.image_size(), Some(Size::new(1000, 700)));

    let response = wheel(&mut canvas, -3, Point::new(400, 300));
    assert!(response.repaint);
    assert_eq!(canvas.zoom(), -3);
    assert_eq!(canvas.zoom_scale(), 0.125);

    let pyramid = canvas.pyramid().unwrap();
    assert_eq!(pyramid.level(3).unwrap().size(), Size::new(125, 88));

    let blit = plan(&canvas).image.unwrap();
    assert_eq!(blit.level, 3);
    assert_eq!(blit.scale, 1);
    assert_eq!(blit.src, Rect::new(0, 0, 125, 88));
    assert_eq!(blit.dest, Rect::new(337, 256, 125, 88));
}

#[test]
fn test_zoom_keeps_point_under_cursor() {
    let dir = TempDir::new().unwrap();
    let mut canvas = loaded_canvas(&dir, 1200, 900, Size::new(400, 300));
    let zooms = Arc::new(AtomicI32::new(i32::MIN));
    let z = zooms.clone();
    canvas.zoom_changed.connect(move |zoom| z.store(*zoom, Ordering::SeqCst));
    drag(&mut canvas, Point::new(0, 0), Point::new(-400, -300));
    assert_eq!(canvas.view_transform(), ViewTransform::new(0, -400, -300));

    let anchor = Point::new(123, 77);
    for notches in [1, 1, -1, -1, -1, 2] {
        let before = canvas.client_to_image(anchor);
        let old_zoom = canvas.zoom();
        wheel(&mut canvas, notches, anchor);
        let after = canvas.client_to_image(anchor);

        assert_eq!(zooms.load(Ordering::SeqCst), canvas.zoom());
        // The anchored pan is truncated by less than one viewport pixel, which
        // spans 2^-zoom image pixels at the new zoom; flooring both readings
        // can then differ by at most that many whole pixels.
        let tolerance = 1 << (-canvas.zoom()).max(0);
        assert!(
            (before.x - after.x).abs() <= tolerance && (before.y - after.y).abs() <= tolerance,
            "zoom {old_zoom} -> {}: {before:?} vs {after:?}",
            canvas.zoom()
        );
    }
}

#[test]
fn test_resize_smaller_clamps_to_edges() {
    let dir = TempDir::new().unwrap();
    let mut canvas = loaded_canvas(&dir, 1000, 700, Size::new(1200, 900));
    assert_eq!(canvas.view_transform(), ViewTransform::new(0, 100, 100));

    // Shrinking below the image size pulls the centered image to the edges.
    canvas.handle_event(CanvasEvent::Resized(Size::new(600, 500)));
    assert_eq!(canvas.view_transform(), ViewTransform::new(0, 0, 0));

    // Drag to the bottom-right corner of the image, then grow the viewport
    // while it is still smaller than the image.
    drag(&mut canvas, Point::new(10, 10), Point::new(-3000, -3000));
    assert_eq!(canvas.view_transform(), ViewTransform::new(0, -400, -200));

    canvas.handle_event(CanvasEvent::Resized(Size::new(800, 600)));
    let t = canvas.view_transform();
    assert_eq!(t.tx + 1000, 800);
    assert_eq!(t.ty + 700, 600);

    // No background strip is planned on the clamped side.
    assert!(plan(&canvas).background.is_empty());
}

#[test]
fn test_reload_after_delete_keeps_previous_image() {
    let dir = TempDir::new().unwrap();
    let path = write_png(&dir, "keep.png", 64, 48, [0, 255, 0, 255]);
    let mut canvas = Canvas::default();
    canvas.resize(Size::new(32, 32));
    canvas.set_image(&path).unwrap();
    wheel(&mut canvas, 1, Point::new(0, 0));
    let transform = canvas.view_transform();
    let before = canvas.pyramid().unwrap();

    std::fs::remove_file(&path).unwrap();
    let err = canvas.reload_image().unwrap_err();
    assert!(matches!(err, CanvasError::DecodeFailure(_)));

    assert_eq!(canvas.state(), CanvasState::Ready);
    assert_eq!(canvas.view_transform(), transform);
    let after = canvas.pyramid().unwrap();
    assert!(Arc::ptr_eq(&before, &after));

    let mut surface = SoftwareSurface::new(Size::new(32, 32)).unwrap();
    let dirty = canvas.take_damage().unwrap();
    let stats = canvas.paint(&mut surface, dirty);
    assert_eq!(stats.blits, 1);
    assert_eq!(surface.pixel(16, 16), Some(0xFF00_FF00));
}

#[test]
fn test_reload_keeps_view_and_picks_up_changes() {
    let dir = TempDir::new().unwrap();
    let path = write_png(&dir, "edit.png", 200, 200, [10, 20, 30, 255]);
    let mut canvas = Canvas::default();
    canvas.resize(Size::new(100, 100));
    canvas.set_image(&path).unwrap();
    wheel(&mut canvas, 1, Point::new(50, 50));
    let transform = canvas.view_transform();
    let old = canvas.pyramid().unwrap();

    write_png(&dir, "edit.png", 200, 200, [40, 50, 60, 255]);
    canvas.reload_image().unwrap();

    assert_eq!(canvas.view_transform(), transform);
    let new = canvas.pyramid().unwrap();
    assert!(!Arc::ptr_eq(&old, &new));
    assert_eq!(new.base().pixel(0, 0), Some(0xFF28_323C));
    // The old handle still sees the old image.
    assert_eq!(old.base().pixel(0, 0), Some(0xFF0A_141E));
}

#[test]
fn test_set_image_resets_view() {
    let dir = TempDir::new().unwrap();
    let mut canvas = loaded_canvas(&dir, 300, 300, Size::new(100, 100));
    wheel(&mut canvas, 2, Point::new(10, 10));
    assert_eq!(canvas.zoom(), 2);

    let other = write_png(&dir, "other.png", 50, 40, [1, 2, 3, 255]);
    canvas.set_image(&other).unwrap();
    assert_eq!(canvas.zoom(), 0);
    assert_eq!(canvas.view_transform(), ViewTransform::new(0, 25, 30));
    assert_eq!(canvas.path(), Some(other.as_path()));
}

#[test]
fn test_failed_set_image_shows_error_message() {
    let dir = TempDir::new().unwrap();
    let mut canvas = loaded_canvas(&dir, 10, 10, Size::new(200, 100));

    let bogus = dir.path().join("bogus.png");
    std::fs::write(&bogus, b"definitely not an image").unwrap();
    assert!(canvas.set_image(&bogus).is_err());

    assert_eq!(canvas.state(), CanvasState::Error);
    assert!(canvas.image_size().is_none());
    assert_eq!(canvas.path(), Some(bogus.as_path()));

    let mut surface = SoftwareSurface::new(Size::new(200, 100)).unwrap();
    canvas.paint(&mut surface, Rect::new(0, 0, 200, 100));
    let status = surface.status_text().unwrap();
    assert_eq!(status.text, "Error loading image");
    assert_eq!(status.color, Rgb::RED);
    assert_eq!(status.center, Point::new(100, 50));

    canvas.clear_image();
    canvas.paint(&mut surface, Rect::new(0, 0, 200, 100));
    let status = surface.status_text().unwrap();
    assert_eq!(status.text, "No image loaded");
    assert_eq!(status.color, Rgb::WHITE);
}

#[test]
fn test_oversized_image_fails_with_allocation_error() {
    let dir = TempDir::new().unwrap();
    let mut canvas = loaded_canvas(&dir, 10, 10, Size::new(64, 64));
    let before = canvas.pyramid().unwrap();

    let huge = dir.path().join("huge.ppm");
    let mut bytes = b"P6\n20000 20000\n255\n".to_vec();
    bytes.extend_from_slice(&[0; 12]);
    std::fs::write(&huge, bytes).unwrap();

    let image_path = dir.path().join("image.png");
    std::fs::copy(&huge, &image_path).unwrap();
    let err = canvas.reload_image().unwrap_err();
    assert!(matches!(
        err,
        CanvasError::AllocationFailure {
            width: 20000,
            height: 20000
        }
    ));
    assert!(Arc::ptr_eq(&before, &canvas.pyramid().unwrap()));

    let err = canvas.set_image(&huge).unwrap_err();
    assert!(matches!(err, CanvasError::AllocationFailure { .. }));
    assert_eq!(canvas.state(), CanvasState::Error);
}

#[test]
fn test_transparent_pixels_show_background() {
    let dir = TempDir::new().unwrap();
    let path = write_png(&dir, "clear.png", 4, 4, [255, 255, 255, 0]);
    let config = CanvasConfig::default().with_background(Rgb::new(9, 8, 7));
    let mut canvas = Canvas::new(config).unwrap();
    canvas.resize(Size::new(4, 4));
    canvas.set_image(&path).unwrap();

    let mut surface = SoftwareSurface::new(Size::new(4, 4)).unwrap();
    canvas.paint(&mut surface, Rect::new(0, 0, 4, 4));
    assert_eq!(surface.pixel(2, 2), Some(0xFF09_0807));
}

#[test]
fn test_screen_space_wheel_through_boundary() {
    let dir = TempDir::new().unwrap();
    let mut canvas = loaded_canvas(&dir, 1000, 700, Size::new(400, 300));
    let boundary = InputBoundary::new(Point::new(1000, 500));

    let anchor = Point::new(100, 100);
    let before = canvas.client_to_image(anchor);
    let raw = RawPointerInput::screen(PointerAction::Wheel(WHEEL_NOTCH), Point::new(1100, 600));
    canvas.handle_event(boundary.translate(raw));

    assert_eq!(canvas.zoom(), 1);
    assert_eq!(canvas.client_to_image(anchor), before);
}

#[test]
fn test_scene_snapshot_matches_canvas() {
    let dir = TempDir::new().unwrap();
    let canvas = loaded_canvas(&dir, 16, 16, Size::new(16, 16));
    match canvas.scene() {
        Scene::Image { pyramid, transform } => {
            assert_eq!(pyramid.image_size(), Size::new(16, 16));
            assert_eq!(transform, canvas.view_transform());
        }
        other => panic!("unexpected scene {other:?}"),
    }
}
