//! The application scene.
//!
//! A ground plane, an emissive square that slides along X and an extruded
//! frame with a square hole. All construction constants live in
//! [`SceneConfig`]; [`Scene`] owns the GPU resources and is driven as a
//! [`GraphicsFlow`].

use instant::Duration;
use winit::event::WindowEvent;

use crate::{
    animation::Oscillator,
    context::{Context, InitContext},
    data_structures::{
        instance::{Instance, InstanceBuffer},
        material::{Material, MaterialUniform},
        mesh::Mesh,
    },
    flow::{GraphicsFlow, Out},
    geometry::{self, FrameShape},
    render::{Instanced, Render},
};

/// Construction parameters for the scene, camera and lighting.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
    pub clear_colour: [f64; 3],
    pub fov_y_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
    pub camera_position: [f32; 3],
    pub camera_target: [f32; 3],
    /// `Some(factor)` enables damped orbit controls.
    pub damping: Option<f32>,

    pub ground_size: [f32; 2],
    pub ground_colour: [f32; 3],

    pub square_size: f32,
    pub square_colour: [f32; 3],
    pub square_emissive: [f32; 3],
    pub square_emissive_intensity: f32,
    /// Centre of the square's travel; X is replaced by the oscillator.
    pub square_position: [f32; 3],
    pub square_step: f32,
    pub square_bound: f32,

    pub frame_outer: f32,
    pub frame_hole: f32,
    pub frame_depth: f32,
    pub frame_colour: [f32; 3],
    pub frame_position: [f32; 3],

    pub ambient: f32,
    pub light_position: [f32; 3],
    pub light_colour: [f32; 3],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            clear_colour: [0.1, 0.1, 0.1],
            fov_y_degrees: 45.0,
            znear: 0.1,
            zfar: 1000.0,
            camera_position: [0.0, 50.0, 150.0],
            camera_target: [0.0, 0.0, 0.0],
            damping: Some(0.05),

            ground_size: [200.0, 200.0],
            ground_colour: [0.5, 0.5, 0.5],

            square_size: 10.0,
            square_colour: [1.0, 0.55, 0.1],
            square_emissive: [1.0, 0.4, 0.0],
            square_emissive_intensity: 1.0,
            square_position: [0.0, 15.0, 40.0],
            square_step: 1.0,
            square_bound: 50.0,

            frame_outer: 40.0,
            frame_hole: 20.0,
            frame_depth: 8.0,
            frame_colour: [0.27, 0.51, 0.71],
            frame_position: [0.0, 20.0, -4.0],

            ambient: 0.3,
            light_position: [30.0, 80.0, 60.0],
            light_colour: [1.0, 1.0, 1.0],
        }
    }
}

/// The square's transform and the counter moving it.
#[derive(Clone, Debug)]
pub struct SlidingSquare {
    pub travel: Oscillator,
    pub instance: Instance,
}

impl SlidingSquare {
    pub fn new(config: &SceneConfig) -> Self {
        let travel = Oscillator::new(0.0, config.square_step, config.square_bound);
        let mut instance = Instance::from(cgmath::Vector3::from(config.square_position));
        instance.position.x = travel.position();
        Self { travel, instance }
    }

    /// One animation tick; returns the new X position.
    pub fn advance(&mut self) -> f32 {
        self.instance.position.x = self.travel.tick();
        self.instance.position.x
    }
}

struct SceneObject {
    mesh: Mesh,
    material: Material,
    instance: InstanceBuffer,
}

impl SceneObject {
    fn draw(&self) -> Instanced<'_> {
        Instanced::single(&self.mesh, &self.material, &self.instance)
    }
}

pub struct Scene {
    ground: SceneObject,
    square: SceneObject,
    frame: SceneObject,
    sliding: SlidingSquare,
    frames: u64,
}

impl Scene {
    pub fn new(ctx: &InitContext, config: &SceneConfig) -> anyhow::Result<Self> {
        let device = &ctx.device;
        let layout = &ctx.material_layout;

        let [width, depth] = config.ground_size;
        let ground = SceneObject {
            mesh: Mesh::new(device, "ground", &geometry::plane(width, depth)),
            material: Material::new(
                device,
                "ground",
                MaterialUniform::lit(config.ground_colour),
                layout,
            ),
            instance: InstanceBuffer::new(device, "ground Instance Buffer", Instance::new()),
        };

        let sliding = SlidingSquare::new(config);
        let square = SceneObject {
            mesh: Mesh::new(device, "square", &geometry::square(config.square_size)),
            material: Material::new(
                device,
                "square",
                MaterialUniform::emissive(
                    config.square_colour,
                    config.square_emissive,
                    config.square_emissive_intensity,
                ),
                layout,
            ),
            instance: InstanceBuffer::new(
                device,
                "square Instance Buffer",
                sliding.instance.clone(),
            ),
        };

        let frame_mesh = FrameShape::square(config.frame_outer, config.frame_hole)
            .extrude(config.frame_depth)?;
        let frame = SceneObject {
            mesh: Mesh::new(device, "frame", &frame_mesh),
            material: Material::new(
                device,
                "frame",
                MaterialUniform::lit(config.frame_colour),
                layout,
            ),
            instance: InstanceBuffer::new(
                device,
                "frame Instance Buffer",
                Instance::from(cgmath::Vector3::from(config.frame_position)),
            ),
        };

        log::debug!(
            "scene meshes: ground {} / square {} / frame {} indices",
            ground.mesh.num_elements,
            square.mesh.num_elements,
            frame.mesh.num_elements
        );

        Ok(Self {
            ground,
            square,
            frame,
            sliding,
            frames: 0,
        })
    }
}

impl<S> GraphicsFlow<S> for Scene {
    fn on_init(&mut self, _: &mut Context, _: &mut S) -> Out<S> {
        log::info!(
            "scene ready, square travels within ±{}",
            self.sliding.travel.bound()
        );
        Out::Empty
    }

    fn on_update(&mut self, ctx: &Context, _: &mut S, _: Duration) -> Out<S> {
        self.sliding.advance();
        self.square.instance.instance = self.sliding.instance.clone();
        self.square.instance.write_to_buffer(&ctx.queue);
        self.frames += 1;
        if self.frames % 600 == 0 {
            log::debug!(
                "frame {}: square at x = {}",
                self.frames,
                self.sliding.instance.position.x
            );
        }
        Out::Empty
    }

    fn on_window_events(&mut self, _: &Context, _: &mut S, _: &WindowEvent) -> Out<S> {
        Out::Empty
    }

    fn on_render(&self) -> Render<'_> {
        // static scenery first, then the moving square
        Render::Composed(vec![
            Render::Defaults(vec![self.ground.draw(), self.frame.draw()]),
            Render::Default(self.square.draw()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_starts_centred_on_its_track() {
        let config = SceneConfig::default();
        let square = SlidingSquare::new(&config);
        assert_eq!(square.instance.position.x, 0.0);
        assert_eq!(square.instance.position.y, 15.0);
        assert_eq!(square.instance.position.z, 40.0);
    }

    #[test]
    fn square_moves_only_along_x() {
        let config = SceneConfig::default();
        let mut square = SlidingSquare::new(&config);
        for _ in 0..500 {
            let x = square.advance();
            assert!(x.abs() <= config.square_bound);
            assert_eq!(square.instance.position.y, 15.0);
            assert_eq!(square.instance.position.z, 40.0);
        }
    }

    #[test]
    fn default_frame_is_valid() {
        let config = SceneConfig::default();
        assert!(FrameShape::square(config.frame_outer, config.frame_hole)
            .extrude(config.frame_depth)
            .is_ok());
    }
}
