use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use walkthrough_kernel::{FrameReport, Navigator, Settings};
use walkthrough_render::{FrameView, RenderView};
use walkthrough_render_wgpu::WgpuRenderer;
use walkthrough_scene::{Scene, demo_scene, load_scene_or_empty};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "walkthrough-desktop", about = "First-person walkthrough")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Settings file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scene file (YAML); the built-in demo scene when omitted
    #[arg(long)]
    scene: Option<PathBuf>,
}

/// Key identifier in the form the bindings use: the produced character for
/// printable keys (lowercased, so Shift cannot strand a held key) and the
/// key name otherwise.
fn key_identifier(key: &Key) -> Option<String> {
    match key {
        Key::Character(text) => Some(text.as_str().to_lowercase()),
        Key::Named(NamedKey::Space) => Some(" ".to_string()),
        Key::Named(named) => match named {
            NamedKey::ArrowLeft => Some("ArrowLeft"),
            NamedKey::ArrowRight => Some("ArrowRight"),
            NamedKey::ArrowUp => Some("ArrowUp"),
            NamedKey::ArrowDown => Some("ArrowDown"),
            NamedKey::Enter => Some("Enter"),
            NamedKey::Shift => Some("Shift"),
            NamedKey::Control => Some("Control"),
            NamedKey::Alt => Some("Alt"),
            NamedKey::Tab => Some("Tab"),
            _ => None,
        }
        .map(str::to_string),
        _ => None,
    }
}

/// Application state.
struct AppState {
    scene: Scene,
    navigator: Navigator,
    view: RenderView,
    last_report: Option<FrameReport>,
    show_debug: bool,
}

impl AppState {
    fn new(scene: Scene, settings: Settings) -> Self {
        let spawn = scene.spawn();
        Self {
            navigator: Navigator::new(settings.navigation, settings.bindings, spawn),
            view: RenderView::from_pose(spawn),
            scene,
            last_report: None,
            show_debug: false,
        }
    }

    fn handle_key(&mut self, event: &KeyEvent) {
        let pressed = event.state == ElementState::Pressed;
        if pressed && event.logical_key == Key::Named(NamedKey::F1) {
            self.show_debug = !self.show_debug;
            return;
        }
        if event.repeat {
            return;
        }
        if let Some(key) = key_identifier(&event.logical_key) {
            if pressed {
                self.navigator.key_down(&key);
            } else {
                self.navigator.key_up(&key);
            }
        }
    }

    fn update(&mut self) {
        let report = self.navigator.tick(&self.scene);
        self.view.set_pose(report.pose);
        self.last_report = Some(report);
    }

    fn draw_ui(&self, ctx: &EguiContext) {
        let targeted = !self.navigator.highlights().is_empty();
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("crosshair"),
        ));
        let center = ctx.screen_rect().center();
        let color = if targeted {
            egui::Color32::RED
        } else {
            egui::Color32::from_gray(40)
        };
        let stroke = egui::Stroke::new(2.0, color);
        let arm = 8.0;
        painter.line_segment(
            [center - egui::vec2(arm, 0.0), center + egui::vec2(arm, 0.0)],
            stroke,
        );
        painter.line_segment(
            [center - egui::vec2(0.0, arm), center + egui::vec2(0.0, arm)],
            stroke,
        );

        if !self.show_debug {
            return;
        }

        let pose = self.navigator.pose();
        egui::SidePanel::left("debug")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Walkthrough");
                ui.separator();
                ui.label(format!("Frame: {}", self.navigator.frame()));
                ui.label(format!(
                    "Position: ({:.2}, {:.2}, {:.2})",
                    pose.position.x, pose.position.y, pose.position.z
                ));
                ui.label(format!("Yaw: {:.3} rad", pose.yaw));

                let held: Vec<String> = self
                    .navigator
                    .input()
                    .actions()
                    .held()
                    .map(|a| format!("{a:?}"))
                    .collect();
                ui.label(format!("Held: {}", held.join(" ")));

                if let Some(report) = &self.last_report {
                    ui.separator();
                    match &report.obstruction {
                        Some(o) => {
                            let name = self
                                .scene
                                .get(o.object)
                                .map(|p| p.object.name.clone())
                                .unwrap_or_else(|| o.object.short());
                            ui.colored_label(
                                egui::Color32::YELLOW,
                                format!("Blocked by {name} ({:.3})", o.distance),
                            );
                        }
                        None => {
                            ui.label("Clear");
                        }
                    }
                    if let Some(target) = report.target {
                        let name = self
                            .scene
                            .get(target)
                            .map(|p| p.object.name.clone())
                            .unwrap_or_else(|| target.short());
                        ui.label(format!("Target: {name}"));
                    }
                }

                ui.separator();
                ui.label(format!("Objects: {}", self.scene.object_count()));
                ui.small("WASD: Move | Arrows: Turn | F: Highlight | F1: Panel");
            });
    }
}

/// GPU and window resources, created once the event loop resumes.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Walkthrough")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("walkthrough_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);
        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    fn draw(&mut self, state: &AppState, egui_ctx: &EguiContext) {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let target = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer.render(
            &self.device,
            &self.queue,
            &target,
            &FrameView {
                frame: state.navigator.frame(),
                scene: &state.scene,
                view: &state.view,
                highlights: state.navigator.highlights(),
            },
        );

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| state.draw_ui(ctx));
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &target,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
    }
}

struct App {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    error: Option<anyhow::Error>,
}

impl App {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
            error: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.egui_ctx) {
            Ok(gpu) => {
                let size = gpu.window.inner_size();
                self.state.view.resize(size.width, size.height);
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialise graphics: {e:#}");
                self.error = Some(e);
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
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        if gpu.egui_winit.on_window_event(&gpu.window, &event).consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size);
                self.state.view.resize(new_size.width, new_size.height);
            }
            WindowEvent::Focused(false) => {
                // Key-up events are lost while unfocused.
                self.state.navigator.input_mut().release_all();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                self.state.handle_key(&event);
            }
            WindowEvent::RedrawRequested => {
                self.state.update();
                gpu.draw(&self.state, &self.egui_ctx);
                gpu.window.request_redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("walkthrough-desktop starting");

    let settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    let scene = match &cli.scene {
        Some(path) => load_scene_or_empty(path),
        None => demo_scene(),
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(AppState::new(scene, settings));
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
