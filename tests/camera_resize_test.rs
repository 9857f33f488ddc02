use approx::assert_abs_diff_eq;
use frame_scene::resize::DisplaySize;
use winit::dpi::PhysicalSize;

mod common;

#[test]
fn resize_updates_projection_aspect() {
    let (camera, mut projection, mut controller) = common::scene_camera(800, 600);
    assert_abs_diff_eq!(projection.aspect(), 800.0 / 600.0);

    let display = PhysicalSize::new(1280, 720);
    let size = DisplaySize::check((800, 600), display).unwrap();
    projection.resize(size.width, size.height);
    controller.resize(size.height);
    assert_abs_diff_eq!(projection.aspect(), 1280.0 / 720.0);

    // Same size next frame: nothing to do
    assert_eq!(DisplaySize::check((1280, 720), display), None);
    assert_abs_diff_eq!(camera.distance(), (50.0f32 * 50.0 + 150.0 * 150.0).sqrt());
}

#[test]
fn hidden_canvas_keeps_the_surface() {
    assert_eq!(DisplaySize::check((800, 600), PhysicalSize::new(0, 600)), None);
    assert_eq!(DisplaySize::check((800, 600), PhysicalSize::new(800, 0)), None);
}

#[test]
fn damped_controls_keep_moving_after_input() {
    let (mut camera, projection, mut controller) = common::scene_camera(800, 600);
    controller.rotate_left(0.5);

    assert!(controller.update(&mut camera, &projection));
    let after_first = camera.position;
    assert!(controller.update(&mut camera, &projection));
    assert_ne!(camera.position, after_first);

    let distance = camera.distance();
    for _ in 0..500 {
        controller.update(&mut camera, &projection);
    }
    assert!(!controller.update(&mut camera, &projection));
    assert_abs_diff_eq!(camera.distance(), distance, epsilon = 1e-2);
}

#[test]
fn pan_moves_target_and_camera_together() {
    let (mut camera, projection, mut controller) = common::scene_camera(800, 600);
    controller.damping = None;
    let offset = camera.position - camera.target;

    controller.pan(controller.key_pan_speed, 0.0);
    controller.update(&mut camera, &projection);

    assert!(camera.target.x < 0.0);
    let moved = camera.position - camera.target;
    assert_abs_diff_eq!(moved.x, offset.x, epsilon = 1e-3);
    assert_abs_diff_eq!(moved.y, offset.y, epsilon = 1e-3);
    assert_abs_diff_eq!(moved.z, offset.z, epsilon = 1e-3);
}
