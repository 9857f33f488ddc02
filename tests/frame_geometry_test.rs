use approx::assert_abs_diff_eq;
use cgmath::Point2;
use frame_scene::{
    geometry::{self, FrameShape},
    scene::SceneConfig,
};

#[test]
fn default_frame_spans_its_outline_and_depth() {
    let config = SceneConfig::default();
    let mesh = FrameShape::square(config.frame_outer, config.frame_hole)
        .extrude(config.frame_depth)
        .unwrap();

    let fold = |axis: usize, f: fn(f32, f32) -> f32, init: f32| {
        mesh.vertices.iter().map(|v| v.position[axis]).fold(init, f)
    };
    assert_abs_diff_eq!(fold(0, f32::min, f32::MAX), -20.0);
    assert_abs_diff_eq!(fold(0, f32::max, f32::MIN), 20.0);
    assert_abs_diff_eq!(fold(1, f32::min, f32::MAX), -20.0);
    assert_abs_diff_eq!(fold(1, f32::max, f32::MIN), 20.0);
    assert_abs_diff_eq!(fold(2, f32::min, f32::MAX), 0.0);
    assert_abs_diff_eq!(fold(2, f32::max, f32::MIN), 8.0);
}

#[test]
fn every_normal_is_unit_length() {
    let config = SceneConfig::default();
    let meshes = [
        geometry::plane(config.ground_size[0], config.ground_size[1]),
        geometry::square(config.square_size),
        FrameShape::square(config.frame_outer, config.frame_hole)
            .extrude(config.frame_depth)
            .unwrap(),
    ];

    for mesh in &meshes {
        for v in &mesh.vertices {
            let [x, y, z] = v.normal;
            assert_abs_diff_eq!((x * x + y * y + z * z).sqrt(), 1.0, epsilon = 1e-5);
        }
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }
}

#[test]
fn non_square_outline_extrudes() {
    let outer = vec![
        Point2::new(0.0, 0.0),
        Point2::new(30.0, 0.0),
        Point2::new(30.0, 10.0),
        Point2::new(0.0, 10.0),
    ];
    let hole = vec![
        Point2::new(5.0, 2.0),
        Point2::new(25.0, 2.0),
        Point2::new(25.0, 8.0),
        Point2::new(5.0, 8.0),
    ];
    let mesh = FrameShape::new(outer, hole).extrude(2.0).unwrap();
    assert_eq!(mesh.triangle_count(), 32);
}

#[test]
fn hole_larger_than_outline_is_rejected() {
    assert!(FrameShape::square(10.0, 20.0).extrude(1.0).is_err());
}
