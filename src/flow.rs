//! Flow control and application event loop.
//!
//! A "flow" is a self-contained part of the application that reacts to input,
//! updates every frame and hands back what it wants drawn. The engine owns the
//! window, the GPU [`Context`] and the orbit camera, and drives all flows.
//!
//! # Lifecycle Flow
//!
//! The event loop follows this pattern each frame:
//! 1. Compare the surface size with the displayed size and resize on mismatch
//! 2. Call `on_update` on all flows
//! 3. Let the orbit controller apply (damped) input and upload the camera
//! 4. Collect every flow's `on_render()` and draw it with the lit pipeline
//! 5. Present and request the next frame

use std::{fmt::Debug, iter, pin::Pin, sync::Arc};

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::KeyCode,
    window::Window,
};

use crate::{
    context::{Context, InitContext},
    data_structures::{mesh::DrawMesh, texture::Texture},
    render::{Instanced, Render},
    resize::DisplaySize,
    scene::SceneConfig,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// Element id of the canvas the scene is mounted into on the web.
#[cfg(target_arch = "wasm32")]
pub const CANVAS_ID: &str = "canvas";

///
/// Output type of the lifecycle hooks.
///
/// `Out::Configure` can be used to modify the Context during runtime, for
/// instance to change the clear colour or the camera.
///
/// `Out::Mut` mutates the shared application state after the hook returned.
///
/// `Empty` is the default output used when nothing needs to be handled.
///
pub enum Out<S, C = Context> {
    Configure(Box<dyn FnOnce(&mut C)>),
    Mut(Box<dyn FnOnce(&mut S)>),
    Empty,
}

impl<S, C> Default for Out<S, C> {
    fn default() -> Self {
        Self::Empty
    }
}

/// Trait for implementing a renderable part of the application.
///
/// # Lifecycle
///
/// 1. `on_init()` is called once when the flow is mounted
/// 2. `on_window_events()` is called for each winit window event
/// 3. `on_update()` is called every frame
/// 4. `on_render()` is called every frame and specifies how to render `self`
pub trait GraphicsFlow<S> {
    /// Initialize the flow and configure the context.
    fn on_init(&mut self, ctx: &mut Context, state: &mut S) -> Out<S>;

    /// Update state every frame.
    ///
    /// `dt` is the time since the previous frame. Per-frame animations that
    /// advance by a fixed step ignore it.
    fn on_update(&mut self, ctx: &Context, state: &mut S, dt: Duration) -> Out<S>;

    /// Handle window events (keyboard, mouse, window resizing, etc.).
    fn on_window_events(&mut self, ctx: &Context, state: &mut S, event: &WindowEvent) -> Out<S>;

    /// Return renderable objects for this flow.
    fn on_render(&self) -> Render<'_>;
}

// Dummy impl to make wasm work
impl<S> Debug for dyn GraphicsFlow<S> + 'static {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("GraphicsFlow")
    }
}

/// A flow constructor (factory function).
///
/// Takes an `InitContext` and asynchronously returns a boxed `GraphicsFlow`,
/// so flows can create their GPU resources once the device exists.
pub type FlowConstructor<S> = Box<
    dyn FnOnce(InitContext) -> Pin<Box<dyn Future<Output = anyhow::Result<Box<dyn GraphicsFlow<S>>>>>>,
>;

/// Application state bundle: GPU context, app state, and surface status.
#[derive(Debug)]
pub struct AppState<State: 'static> {
    pub(crate) ctx: Context,
    state: State,
    is_surface_configured: bool,
}

impl<State: Default> AppState<State> {
    async fn new(window: Arc<Window>, scene: &SceneConfig) -> anyhow::Result<Self> {
        let ctx = Context::new(window, scene).await?;
        Ok(Self {
            ctx,
            state: State::default(),
            is_surface_configured: false,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            self.ctx.projection.resize(width, height);
            self.ctx.camera.controller.resize(height);
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.ctx.depth_texture = Texture::create_depth_texture(
                &self.ctx.device,
                [self.ctx.config.width, self.ctx.config.height],
                "depth_texture",
            );
        }
    }

    /// Reconfigure the surface if the displayed size no longer matches it.
    fn resize_on_demand(&mut self) {
        let backing = if self.is_surface_configured {
            (self.ctx.config.width, self.ctx.config.height)
        } else {
            (0, 0)
        };
        if let Some(size) = DisplaySize::check(backing, self.ctx.window.inner_size()) {
            log::debug!(
                "surface {:?} does not match display {}x{}, resizing",
                backing,
                size.width,
                size.height
            );
            self.resize(size.width, size.height);
        }
    }

    fn render(
        &mut self,
        graphics_flows: &[Box<dyn GraphicsFlow<State>>],
    ) -> Result<(), wgpu::SurfaceError> {
        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder: wgpu::CommandEncoder =
            self.ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });
        {
            let mut render_pass: wgpu::RenderPass<'_> =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &self.ctx.depth_texture.view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });

            let mut draws: Vec<Instanced> = Vec::new();
            graphics_flows
                .iter()
                .for_each(|flow| flow.on_render().collect(&mut draws));

            render_pass.set_pipeline(&self.ctx.lit_pipeline);
            for instanced in draws {
                if instanced.amount == 0 || instanced.instance.size() == 0 {
                    log::warn!("you attempted to render something with zero instances");
                    continue;
                }
                render_pass.set_vertex_buffer(1, instanced.instance.slice(..));
                render_pass.draw_mesh_instanced(
                    instanced.mesh,
                    &instanced.material.bind_group,
                    0..instanced.amount as u32,
                    &self.ctx.camera.bind_group,
                    &self.ctx.light.bind_group,
                );
            }
        }

        self.ctx.queue.submit(iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Run one frame: resize check, flow updates, camera controls, render.
    fn frame(&mut self, graphics_flows: &mut [Box<dyn GraphicsFlow<State>>], dt: Duration) {
        self.resize_on_demand();

        graphics_flows.iter_mut().for_each(|f| {
            let out = f.on_update(&self.ctx, &mut self.state, dt);
            handle_flow_output(&mut self.state, &mut self.ctx, out);
        });

        let ctx = &mut self.ctx;
        ctx.camera
            .controller
            .update(&mut ctx.camera.camera, &ctx.projection);
        ctx.write_camera_buffer();

        match self.render(graphics_flows) {
            Ok(()) => (),
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.ctx.window.inner_size();
                self.resize(size.width, size.height);
            }
            Err(e) => {
                log::error!("Unable to render {}", e);
            }
        }
    }
}

pub struct App<State: 'static> {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[allow(dead_code)]
    proxy: winit::event_loop::EventLoopProxy<FlowEvent<State>>,
    scene: SceneConfig,
    state: Option<AppState<State>>,
    // This will hold the fully initialized flows once they are ready.
    graphics_flows: Vec<Box<dyn GraphicsFlow<State>>>,
    // Taken on the first `resumed`, so the scene is mounted exactly once.
    constructors: Option<Vec<FlowConstructor<State>>>,
    last_time: Instant,
    // Dropping the closure would invalidate the registered `keydown` listener.
    #[cfg(target_arch = "wasm32")]
    key_listener: Option<Closure<dyn FnMut(web_sys::KeyboardEvent)>>,
}

impl<State: 'static> App<State> {
    fn new(
        event_loop: &EventLoop<FlowEvent<State>>,
        scene: SceneConfig,
        constructors: Vec<FlowConstructor<State>>,
    ) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            scene,
            state: None,
            graphics_flows: Vec::new(),
            constructors: Some(constructors),
            last_time: Instant::now(),
            #[cfg(target_arch = "wasm32")]
            key_listener: None,
        })
    }
}

impl<State: Default + 'static> App<State> {
    /// Store the initialized state and flows and run every flow's `on_init`.
    fn mount(&mut self, mut app_state: AppState<State>, flows: Vec<Box<dyn GraphicsFlow<State>>>) {
        self.graphics_flows = flows;
        self.graphics_flows.iter_mut().for_each(|flow| {
            let out = flow.on_init(&mut app_state.ctx, &mut app_state.state);
            handle_flow_output(&mut app_state.state, &mut app_state.ctx, out);
        });
        app_state.resize_on_demand();
        app_state.ctx.window.request_redraw();
        self.last_time = Instant::now();
        self.state = Some(app_state);
    }
}

pub(crate) enum FlowEvent<State: 'static> {
    #[allow(dead_code)]
    Initialized {
        state: AppState<State>,
        flows: Vec<Box<dyn GraphicsFlow<State>>>,
    },
    #[allow(dead_code)]
    Exit,
    /// A key read outside of winit, see `listen_for_arrow_keys`.
    #[allow(dead_code)]
    Key(KeyCode),
}

impl<State> Debug for FlowEvent<State> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized { state: _, flows } => {
                f.debug_struct("Initialized").field("flows", flows).finish()
            }
            Self::Exit => f.write_str("Exit"),
            Self::Key(code) => f.debug_tuple("Key").field(code).finish(),
        }
    }
}

async fn init<State: Default + 'static>(
    window: Arc<Window>,
    scene: SceneConfig,
    constructors: Vec<FlowConstructor<State>>,
) -> anyhow::Result<(AppState<State>, Vec<Box<dyn GraphicsFlow<State>>>)> {
    let app_state = AppState::new(window, &scene).await?;
    let flow_futures: Vec<_> = constructors
        .into_iter()
        // The clone in into() leverages the internal Arcs of Device and Queue and thus only clones the ref
        .map(|constructor| constructor((&app_state.ctx).into()))
        .collect();
    let flows = futures::future::join_all(flow_futures)
        .await
        .into_iter()
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok((app_state, flows))
}

#[cfg(target_arch = "wasm32")]
fn find_canvas(id: &str) -> Option<web_sys::HtmlCanvasElement> {
    web_sys::window()?
        .document()?
        .get_element_by_id(id)?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .ok()
}

/// Map a DOM `KeyboardEvent.code` to the arrow key it names.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn arrow_key(code: &str) -> Option<KeyCode> {
    match code {
        "ArrowUp" => Some(KeyCode::ArrowUp),
        "ArrowDown" => Some(KeyCode::ArrowDown),
        "ArrowLeft" => Some(KeyCode::ArrowLeft),
        "ArrowRight" => Some(KeyCode::ArrowRight),
        _ => None,
    }
}

/// Forward arrow keys pressed anywhere on the page to the event loop.
///
/// The returned closure backs the listener and has to outlive it.
#[cfg(target_arch = "wasm32")]
fn listen_for_arrow_keys<State: 'static>(
    proxy: winit::event_loop::EventLoopProxy<FlowEvent<State>>,
) -> Option<Closure<dyn FnMut(web_sys::KeyboardEvent)>> {
    let listener = Closure::<dyn FnMut(web_sys::KeyboardEvent)>::new(
        move |event: web_sys::KeyboardEvent| {
            if let Some(code) = arrow_key(&event.code()) {
                // Fails only once the loop has exited
                let _ = proxy.send_event(FlowEvent::Key(code));
            }
        },
    );
    let window = web_sys::window()?;
    if let Err(e) =
        window.add_event_listener_with_callback("keydown", listener.as_ref().unchecked_ref())
    {
        log::error!("Cannot listen for arrow keys on the window: {:?}", e);
        return None;
    }
    Some(listener)
}

impl<State: 'static + Default> ApplicationHandler<FlowEvent<State>> for App<State> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(constructors) = self.constructors.take() else {
            return;
        };

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("frame-scene");

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowAttributesExtWebSys;

            match find_canvas(CANVAS_ID) {
                Some(canvas) => window_attributes = window_attributes.with_canvas(Some(canvas)),
                None => {
                    log::error!("No <canvas id=\"{}\"> found, nothing to render into", CANVAS_ID);
                    event_loop.exit();
                    return;
                }
            }
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Cannot create the main window: {}", e);
                event_loop.exit();
                return;
            }
        };

        #[cfg(target_arch = "wasm32")]
        {
            self.key_listener = listen_for_arrow_keys(self.proxy.clone());
        }

        let init_future = init(window, self.scene.clone(), constructors);

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(init_future) {
                Ok((app_state, flows)) => self.mount(app_state, flows),
                Err(e) => {
                    log::error!("App initialization failed: {:#}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let event = match init_future.await {
                    Ok((state, flows)) => FlowEvent::Initialized { state, flows },
                    Err(e) => {
                        log::error!("App initialization failed: {:#}", e);
                        FlowEvent::Exit
                    }
                };
                if proxy.send_event(event).is_err() {
                    log::error!("Event loop was closed before the scene was mounted");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent<State>) {
        match event {
            // This is the message from the wasm `spawn_local`
            FlowEvent::Initialized { state, flows } => self.mount(state, flows),
            FlowEvent::Exit => event_loop.exit(),
            FlowEvent::Key(code) => {
                if let Some(state) = &mut self.state {
                    state.ctx.camera.controller.handle_key(code);
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        // On the web the arrow keys come from the window listener instead,
        // winit only reports keys while the canvas has focus
        #[cfg(target_arch = "wasm32")]
        let for_controls = !matches!(event, WindowEvent::KeyboardInput { .. });
        #[cfg(not(target_arch = "wasm32"))]
        let for_controls = true;
        if for_controls {
            state.ctx.camera.controller.handle_window_events(&event);
        }

        self.graphics_flows.iter_mut().for_each(|f| {
            let out = f.on_window_events(&state.ctx, &mut state.state, &event);
            handle_flow_output(&mut state.state, &mut state.ctx, out);
        });

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            // The actual resize happens on demand in the next frame
            WindowEvent::Resized(_) => state.ctx.window.request_redraw(),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();
                state.frame(&mut self.graphics_flows, dt);
                // invoke main render loop
                state.ctx.window.request_redraw();
            }
            _ => {}
        }
    }
}

fn handle_flow_output<State, C>(state: &mut State, ctx: &mut C, out: Out<State, C>) {
    match out {
        Out::Configure(f) => f(ctx),
        Out::Mut(f) => f(state),
        Out::Empty => (),
    }
}

pub fn run<State: 'static + Default>(
    scene: SceneConfig,
    constructors: Vec<FlowConstructor<State>>,
) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<FlowEvent<State>> = EventLoop::with_user_event().build()?;

    let mut app: App<State> = App::new(&event_loop, scene, constructors)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}
