//! Fire Smoke - smoke and fire particles on a GPU point-sprite pipeline
//!
//! Performance targets:
//! - 13k particles stepped and uploaded per frame
//! - Frame rate: 60+ fps

use std::ffi::CStr;
use std::num::NonZeroU32;
use std::time::Instant;

use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version,
};
use glutin::display::{Display, GetGlDisplay};
use glutin::prelude::*;
use glutin::surface::{Surface, SurfaceAttributesBuilder, WindowSurface};
use glutin_winit::DisplayBuilder;
use raw_window_handle::HasWindowHandle;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key as WinitKey, ModifiersState, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId};

use fire_smoke::app::{App, Key, KeyEvent, Modifiers, resolve};
use fire_smoke::error::{RenderError, RenderResult};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("fire_smoke=info"))
        .init();

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            log::error!("Failed to create event loop: {err}");
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut handler = AppHandler::new();
    if let Err(err) = event_loop.run_app(&mut handler) {
        log::error!("Event loop failed: {err}");
        std::process::exit(1);
    }
}

struct AppHandler {
    state: Option<AppState>,
    modifiers: ModifiersState,
}

struct AppState {
    window: Window,
    gl_context: PossiblyCurrentContext,
    gl_surface: Surface<WindowSurface>,
    app: App,
}

impl AppHandler {
    fn new() -> Self {
        Self {
            state: None,
            modifiers: ModifiersState::default(),
        }
    }
}

impl ApplicationHandler for AppHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let state = create_state(event_loop).or_else(|err| {
            log::warn!("{err}; retrying once");
            create_state(event_loop)
        });

        match state {
            Ok(state) => {
                log::info!("Rendering context created");
                state.window.request_redraw();
                self.state = Some(state);
            }
            Err(err) => {
                log::error!("{err}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(s) => s,
            None => return,
        };

        match event {
            WindowEvent::CloseRequested => {
                state.app.shutdown();
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let (Some(width), Some(height)) =
                    (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                {
                    state.gl_surface.resize(&state.gl_context, width, height);
                    let scale = state.window.scale_factor() as f32;
                    state
                        .app
                        .resize(size.width as f32, size.height as f32, scale);
                    state.window.request_redraw();
                }
            }

            WindowEvent::ModifiersChanged(mods) => {
                self.modifiers = mods.state();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                let Some(key) = translate_key(&event.logical_key) else {
                    return;
                };
                let modifiers = Modifiers {
                    ctrl: self.modifiers.control_key(),
                    shift: self.modifiers.shift_key(),
                    alt: self.modifiers.alt_key(),
                };
                let key_event = KeyEvent::new(key, modifiers);
                if let Some(action) = resolve(&key_event, state.app.text_editing()) {
                    let result = state.app.execute(action, Instant::now());
                    if result.is_exit() {
                        state.app.shutdown();
                        event_loop.exit();
                    } else if result.needs_redraw() {
                        state.window.request_redraw();
                    }
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                state
                    .app
                    .handle_mouse_move(position.x as f32, position.y as f32);
            }

            WindowEvent::RedrawRequested => {
                state.app.render(Instant::now());
                if let Err(err) = state.gl_surface.swap_buffers(&state.gl_context) {
                    log::error!("Failed to swap buffers: {err}");
                    state.app.shutdown();
                    event_loop.exit();
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &mut self.state {
            if state.app.tick(Instant::now()).needs_redraw() {
                state.window.request_redraw();
            }
        }
    }
}

fn translate_key(key: &WinitKey) -> Option<Key> {
    match key {
        WinitKey::Named(NamedKey::Escape) => Some(Key::Escape),
        WinitKey::Named(NamedKey::Enter) => Some(Key::Enter),
        WinitKey::Named(NamedKey::Tab) => Some(Key::Tab),
        WinitKey::Named(NamedKey::Backspace) => Some(Key::Backspace),
        WinitKey::Named(NamedKey::ArrowLeft) => Some(Key::ArrowLeft),
        WinitKey::Named(NamedKey::ArrowRight) => Some(Key::ArrowRight),
        WinitKey::Named(NamedKey::ArrowUp) => Some(Key::ArrowUp),
        WinitKey::Named(NamedKey::ArrowDown) => Some(Key::ArrowDown),
        WinitKey::Named(NamedKey::Space) => Some(Key::Space),
        WinitKey::Character(c) => match c.chars().next()? {
            ' ' => Some(Key::Space),
            ch => Some(Key::Char(ch)),
        },
        _ => None,
    }
}

/// Create the window, GL context and surface, then both GL front ends
fn create_state(event_loop: &ActiveEventLoop) -> RenderResult<AppState> {
    let window_attrs = WindowAttributes::default()
        .with_title("Fire Smoke")
        .with_inner_size(LogicalSize::new(1280.0, 720.0));

    let config_template = ConfigTemplateBuilder::new()
        .with_alpha_size(8)
        .with_multisampling(4);

    let display_builder = DisplayBuilder::new().with_window_attributes(Some(window_attrs));

    let (window, gl_config) = display_builder
        .build(event_loop, config_template, pick_config)
        .map_err(|err| RenderError::Context(format!("window creation failed: {err}")))?;

    let window =
        window.ok_or_else(|| RenderError::Context("window was not created".to_string()))?;
    let gl_display = gl_config.display();

    let raw_handle = window
        .window_handle()
        .map_err(|err| RenderError::Context(format!("no window handle: {err}")))?
        .as_raw();

    // Point sprites need gl_PointCoord and program point size from core 3.3
    let context_attrs = ContextAttributesBuilder::new()
        .with_profile(GlProfile::Core)
        .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
        .build(Some(raw_handle));

    let gl_context = unsafe {
        gl_display
            .create_context(&gl_config, &context_attrs)
            .map_err(|err| RenderError::Context(format!("GL context: {err}")))?
    };

    let size = window.inner_size();
    let surface_attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
        raw_handle,
        NonZeroU32::new(size.width.max(1)).unwrap_or(NonZeroU32::MIN),
        NonZeroU32::new(size.height.max(1)).unwrap_or(NonZeroU32::MIN),
    );

    let gl_surface = unsafe {
        gl_display
            .create_window_surface(&gl_config, &surface_attrs)
            .map_err(|err| RenderError::Context(format!("window surface: {err}")))?
    };

    let gl_context = gl_context
        .make_current(&gl_surface)
        .map_err(|err| RenderError::Context(format!("make current: {err}")))?;

    let gl = unsafe {
        glow::Context::from_loader_function_cstr(|name| load_symbol(&gl_display, name))
    };
    let canvas_renderer = unsafe {
        femtovg::renderer::OpenGl::new_from_function_cstr(|name| load_symbol(&gl_display, name))
            .map_err(|err| RenderError::Canvas(format!("{err:?}")))?
    };

    let scale = window.scale_factor() as f32;
    let app = App::new(gl, canvas_renderer, size.width as f32, size.height as f32, scale)?;

    Ok(AppState {
        window,
        gl_context,
        gl_surface,
        app,
    })
}

/// Prefer the config with the most MSAA samples
///
/// glutin-winit requires a `Config` back from the picker, so an empty list
/// cannot be turned into a `RenderError`; it is logged before aborting.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    let best = configs.reduce(|accum, config| {
        if config.num_samples() > accum.num_samples() {
            config
        } else {
            accum
        }
    });
    match best {
        Some(config) => config,
        None => {
            log::error!("Display offered no GL configs; no rendering surface is possible");
            panic!("display offered no GL configs");
        }
    }
}

fn load_symbol(display: &Display, name: &CStr) -> *const std::ffi::c_void {
    display.get_proc_address(name) as *const _
}
