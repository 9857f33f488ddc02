//! frame-scene
//!
//! A small WebGPU/WebGL scene that runs natively and in the browser: a lit
//! ground plane, an emissive square sliding back and forth along X and an
//! extruded frame with a square hole, viewed through a damped orbit camera.
//!
//! High-level modules
//! - `animation`: the per-frame back-and-forth counter driving the square
//! - `camera`: camera, projection, uniforms and the orbit controller
//! - `context`: central GPU and window context that owns device/queue/pipelines
//! - `data_structures`: meshes, instances, materials and the depth texture
//! - `flow`: flow lifecycle and the application event loop
//! - `geometry`: procedural plane, square and extruded frame meshes
//! - `pipelines`: the lit render pipeline and the point light
//! - `render`: render composition handed from flows to the frame loop
//! - `resize`: the resize-on-demand check between surface and display
//! - `scene`: scene construction parameters and the scene flow itself
//!

pub mod animation;
pub mod camera;
pub mod context;
pub mod data_structures;
pub mod flow;
pub mod geometry;
pub mod pipelines;
pub mod render;
pub mod resize;
pub mod scene;

// Re-exports commonly used types for convenience in downstream code.
pub use winit::event::WindowEvent;

use flow::{FlowConstructor, GraphicsFlow};
use scene::{Scene, SceneConfig};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Constructor mounting [`Scene`] built from `config`.
pub fn scene_flow<S: 'static>(config: SceneConfig) -> FlowConstructor<S> {
    Box::new(move |ctx| {
        Box::pin(async move {
            let scene = Scene::new(&ctx, &config)?;
            Ok(Box::new(scene) as Box<dyn GraphicsFlow<S>>)
        })
    })
}

/// Run the default scene until the window is closed.
pub fn start() -> anyhow::Result<()> {
    let config = SceneConfig::default();
    flow::run::<()>(config.clone(), vec![scene_flow(config)])
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), JsValue> {
    start().map_err(|e| JsValue::from_str(&format!("{:#}", e)))
}
