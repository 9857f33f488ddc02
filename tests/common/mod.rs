use frame_scene::{
    camera::{Camera, OrbitController, Projection},
    scene::SceneConfig,
};

/// Camera, projection and controller as the scene sets them up.
pub(crate) fn scene_camera(width: u32, height: u32) -> (Camera, Projection, OrbitController) {
    let config = SceneConfig::default();
    let camera = Camera::new(config.camera_position, config.camera_target);
    let projection = Projection::new(
        width,
        height,
        cgmath::Deg(config.fov_y_degrees),
        config.znear,
        config.zfar,
    );
    let mut controller = OrbitController::new(height);
    if let Some(factor) = config.damping {
        controller = controller.with_damping(factor);
    }
    (camera, projection, controller)
}
