//! Perspective camera, GPU uniform and orbit controls.
//!
//! The [`Camera`] is a plain eye/target pair. [`OrbitController`] collects
//! window input (drag, wheel, arrow keys) as spherical and screen-space deltas
//! and applies them once per frame in [`OrbitController::update`], optionally
//! damped so the motion eases out over several frames.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Matrix4, Point3, Rad, Vector3, Zero};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
};

use crate::resize::DisplaySize;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

// Keeps the polar angle off the poles where look_at degenerates.
const POLAR_EPSILON: f32 = 1e-6;
const MOVE_EPSILON: f32 = 1e-6;
// Closest the eye gets to the target. At zero the orbit direction is lost.
const MIN_RADIUS: f32 = 1e-2;
// Farthest it gets, whatever `max_distance` says. Keeps the view matrix finite.
const MAX_RADIUS: f32 = 1e6;

#[derive(Clone, Debug)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
}

impl Camera {
    pub fn new<P: Into<Point3<f32>>, T: Into<Point3<f32>>>(position: P, target: T) -> Self {
        Self {
            position: position.into(),
            target: target.into(),
            up: Vector3::unit_y(),
        }
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn distance(&self) -> f32 {
        (self.position - self.target).magnitude()
    }
}

#[derive(Clone, Debug)]
pub struct Projection {
    aspect: f32,
    fovy: Rad<f32>,
    znear: f32,
    zfar: f32,
}

impl Projection {
    pub fn new<F: Into<Rad<f32>>>(width: u32, height: u32, fovy: F, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: DisplaySize::aspect(width, height),
            fovy: fovy.into(),
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = DisplaySize::aspect(width, height);
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn fovy(&self) -> Rad<f32> {
        self.fovy
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * cgmath::perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &Camera, projection: &Projection) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// GPU side of the camera plus the controller that moves it.
#[derive(Debug)]
pub struct CameraResources {
    pub camera: Camera,
    pub controller: OrbitController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Drag {
    None,
    Rotate,
    Pan,
}

/// Orbit controls around `Camera::target`.
///
/// Left drag rotates, right drag and the arrow keys pan, the wheel zooms.
#[derive(Clone, Debug)]
pub struct OrbitController {
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    /// Pixels panned per arrow key press.
    pub key_pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// `Some(factor)` enables damping.
    pub damping: Option<f32>,
    theta_delta: f32,
    phi_delta: f32,
    scale: f32,
    pending_pan: (f32, f32),
    pan_offset: Vector3<f32>,
    viewport_height: f32,
    drag: Drag,
    cursor: Option<PhysicalPosition<f64>>,
}

impl OrbitController {
    pub fn new(viewport_height: u32) -> Self {
        Self {
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            key_pan_speed: 7.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            damping: None,
            theta_delta: 0.0,
            phi_delta: 0.0,
            scale: 1.0,
            pending_pan: (0.0, 0.0),
            pan_offset: Vector3::zero(),
            viewport_height: viewport_height.max(1) as f32,
            drag: Drag::None,
            cursor: None,
        }
    }

    pub fn with_damping(mut self, factor: f32) -> Self {
        self.damping = Some(factor.clamp(0.0, 1.0));
        self
    }

    pub fn resize(&mut self, viewport_height: u32) {
        self.viewport_height = viewport_height.max(1) as f32;
    }

    /// Rotate around the vertical axis by `angle` radians.
    pub fn rotate_left(&mut self, angle: f32) {
        self.theta_delta -= angle;
    }

    /// Rotate towards the top pole by `angle` radians.
    pub fn rotate_up(&mut self, angle: f32) {
        self.phi_delta -= angle;
    }

    /// Positive notches move closer to the target.
    pub fn zoom(&mut self, notches: f32) {
        let dolly = 0.95f32.powf(self.zoom_speed * notches.abs());
        if notches > 0.0 {
            self.scale *= dolly;
        } else if notches < 0.0 {
            self.scale /= dolly;
        }
    }

    /// Queue a pan of `dx`/`dy` screen pixels; resolved against the camera in `update`.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.pending_pan.0 += dx * self.pan_speed;
        self.pending_pan.1 += dy * self.pan_speed;
    }

    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        let (dx, dy) = (dx as f32, dy as f32);
        match self.drag {
            Drag::Rotate => {
                let per_pixel = 2.0 * PI * self.rotate_speed / self.viewport_height;
                self.rotate_left(dx * per_pixel);
                self.rotate_up(dy * per_pixel);
            }
            Drag::Pan => self.pan(dx, dy),
            Drag::None => (),
        }
    }

    /// Returns whether the event was used by the controller.
    pub fn handle_window_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                self.drag = match (button, state) {
                    (MouseButton::Left, ElementState::Pressed) => Drag::Rotate,
                    (MouseButton::Right, ElementState::Pressed) => Drag::Pan,
                    (_, ElementState::Released) => Drag::None,
                    _ => return false,
                };
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                let previous = self.cursor.replace(*position);
                match previous {
                    Some(previous) if self.drag != Drag::None => {
                        self.handle_mouse(position.x - previous.x, position.y - previous.y);
                        true
                    }
                    _ => false,
                }
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor = None;
                self.drag = Drag::None;
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let notches = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    // Roughly one notch per 100 pixels of smooth scrolling
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
                self.zoom(notches);
                true
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(keycode),
                        ..
                    },
                ..
            } => self.handle_key(*keycode),
            _ => false,
        }
    }

    /// Arrow keys pan by `key_pan_speed` pixels. Returns whether the key was used.
    pub fn handle_key(&mut self, keycode: KeyCode) -> bool {
        let speed = self.key_pan_speed;
        match keycode {
            KeyCode::ArrowUp => self.pan(0.0, speed),
            KeyCode::ArrowDown => self.pan(0.0, -speed),
            KeyCode::ArrowLeft => self.pan(speed, 0.0),
            KeyCode::ArrowRight => self.pan(-speed, 0.0),
            _ => return false,
        }
        true
    }

    /// Apply the accumulated input to `camera`. Returns whether it moved.
    pub fn update(&mut self, camera: &mut Camera, projection: &Projection) -> bool {
        let before = (camera.position, camera.target);
        self.resolve_pan(camera, projection);

        let offset = camera.position - camera.target;
        let mut radius = offset.magnitude();
        let (mut theta, mut phi) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, PI / 2.0)
        };

        let factor = self.damping.unwrap_or(1.0);
        theta += self.theta_delta * factor;
        phi += self.phi_delta * factor;
        phi = phi.clamp(POLAR_EPSILON, PI - POLAR_EPSILON);

        // min wins over max so inverted limits cannot panic
        radius = (radius * self.scale)
            .min(self.max_distance.min(MAX_RADIUS))
            .max(self.min_distance.max(MIN_RADIUS));

        camera.target += self.pan_offset * factor;
        let sin_phi = phi.sin();
        let offset = Vector3::new(
            radius * sin_phi * theta.sin(),
            radius * phi.cos(),
            radius * sin_phi * theta.cos(),
        );
        camera.position = camera.target + offset;

        match self.damping {
            Some(factor) => {
                self.theta_delta *= 1.0 - factor;
                self.phi_delta *= 1.0 - factor;
                self.pan_offset *= 1.0 - factor;
            }
            None => {
                self.theta_delta = 0.0;
                self.phi_delta = 0.0;
                self.pan_offset = Vector3::zero();
            }
        }
        self.scale = 1.0;

        (camera.position - before.0).magnitude2() > MOVE_EPSILON
            || (camera.target - before.1).magnitude2() > MOVE_EPSILON
    }

    fn resolve_pan(&mut self, camera: &Camera, projection: &Projection) {
        let (dx, dy) = std::mem::take(&mut self.pending_pan);
        if (dx == 0.0 && dy == 0.0) || camera.distance() <= f32::EPSILON {
            return;
        }
        let forward = (camera.target - camera.position).normalize();
        let right = forward.cross(camera.up).normalize();
        let up = right.cross(forward);
        // World units covered by one pixel at the target's depth
        let per_pixel =
            2.0 * camera.distance() * (projection.fovy().0 / 2.0).tan() / self.viewport_height;
        self.pan_offset += right * (-dx * per_pixel) + up * (dy * per_pixel);
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use cgmath::Deg;

    use super::*;

    fn setup() -> (Camera, Projection, OrbitController) {
        let camera = Camera::new((0.0, 0.0, 10.0), (0.0, 0.0, 0.0));
        let projection = Projection::new(800, 600, Deg(45.0), 0.1, 1000.0);
        (camera, projection, OrbitController::new(600))
    }

    #[test]
    fn undamped_rotation_is_applied_at_once() {
        let (mut camera, projection, mut controller) = setup();
        controller.rotate_left(PI / 2.0);
        assert!(controller.update(&mut camera, &projection));
        assert_abs_diff_eq!(camera.position.x, -10.0, epsilon = 1e-4);
        assert_abs_diff_eq!(camera.position.z, 0.0, epsilon = 1e-4);
        assert!(!controller.update(&mut camera, &projection));
    }

    #[test]
    fn damping_eases_towards_full_rotation() {
        let (mut camera, projection, controller) = setup();
        let mut controller = controller.with_damping(0.05);
        controller.rotate_left(1.0);
        controller.update(&mut camera, &projection);
        let first_theta = camera.position.x.atan2(camera.position.z);
        assert_abs_diff_eq!(first_theta, -0.05, epsilon = 1e-4);

        for _ in 0..400 {
            controller.update(&mut camera, &projection);
        }
        let theta = camera.position.x.atan2(camera.position.z);
        assert_abs_diff_eq!(theta, -1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(camera.distance(), 10.0, epsilon = 1e-3);
    }

    #[test]
    fn polar_angle_is_clamped() {
        let (mut camera, projection, mut controller) = setup();
        controller.rotate_up(10.0);
        controller.update(&mut camera, &projection);
        assert!(camera.position.y > 9.99);
        assert!(camera.position.y <= 10.0);
        assert!(camera.position.x.is_finite() && camera.position.z.is_finite());
    }

    #[test]
    fn zoom_respects_distance_limits() {
        let (mut camera, projection, mut controller) = setup();
        controller.min_distance = 5.0;
        controller.zoom(100.0);
        controller.update(&mut camera, &projection);
        assert_abs_diff_eq!(camera.distance(), 5.0, epsilon = 1e-4);

        controller.zoom(-1.0);
        controller.update(&mut camera, &projection);
        assert_abs_diff_eq!(camera.distance(), 5.0 / 0.95, epsilon = 1e-4);
    }

    #[test]
    fn arrow_keys_pan_target_and_camera_together() {
        let (mut camera, projection, mut controller) = setup();
        controller.handle_key(KeyCode::ArrowUp);
        controller.update(&mut camera, &projection);
        assert!(camera.target.y > 0.0);
        assert_abs_diff_eq!(camera.target.x, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(camera.distance(), 10.0, epsilon = 1e-4);
        assert_abs_diff_eq!(camera.position.y, camera.target.y, epsilon = 1e-4);

        controller.handle_key(KeyCode::ArrowLeft);
        controller.update(&mut camera, &projection);
        // Right of a camera looking down -Z is +X; panning "left" moves the target to -X
        assert!(camera.target.x < 0.0);
    }

    #[test]
    fn zooming_all_the_way_in_can_zoom_back_out() {
        let (mut camera, projection, mut controller) = setup();
        for _ in 0..30 {
            controller.zoom(100.0);
            controller.update(&mut camera, &projection);
        }
        assert!(camera.distance() > 0.0);

        for _ in 0..30 {
            controller.zoom(-100.0);
            controller.update(&mut camera, &projection);
        }
        assert!(camera.distance() > 1.0);

        controller.handle_key(KeyCode::ArrowLeft);
        controller.update(&mut camera, &projection);
        assert!(camera.target.x.is_finite());
        assert!(camera.calc_matrix().x.x.is_finite());
    }

    #[test]
    fn eye_on_target_does_not_poison_pan() {
        let (mut camera, projection, mut controller) = setup();
        camera.position = camera.target;
        controller.pan(7.0, 7.0);
        controller.update(&mut camera, &projection);
        assert!(camera.target.x.is_finite() && camera.target.y.is_finite());
        assert!(camera.distance() > 0.0);
    }

    #[test]
    fn inverted_distance_limits_do_not_panic() {
        let (mut camera, projection, mut controller) = setup();
        controller.min_distance = 20.0;
        controller.max_distance = 5.0;
        controller.update(&mut camera, &projection);
        assert_abs_diff_eq!(camera.distance(), 20.0, epsilon = 1e-4);
    }

    #[test]
    fn only_arrow_keys_pan() {
        let (_, _, mut controller) = setup();
        assert!(controller.handle_key(KeyCode::ArrowUp));
        assert!(controller.handle_key(KeyCode::ArrowRight));
        assert!(!controller.handle_key(KeyCode::KeyW));
    }

    #[test]
    fn projection_tracks_aspect() {
        let mut projection = Projection::new(800, 600, Deg(45.0), 0.1, 1000.0);
        projection.resize(1000, 500);
        assert_abs_diff_eq!(projection.aspect(), 2.0);
    }
}
