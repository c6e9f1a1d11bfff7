//! The browser build has its own entry point in `vapor_runtime::web`, so
//! the binary only does work on native targets.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use vapor_runtime::logging::{init_logging, LoggingConfig};

    init_logging(LoggingConfig::default());
    if let Err(err) = native::run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::any::Any;
    use std::env;
    use std::fmt;
    use std::panic::{self, AssertUnwindSafe};

    use anyhow::{anyhow, Context, Result};
    use glam::Vec2;
    use log::{debug, info};
    use winit::dpi::LogicalSize;
    use winit::event::{ElementState, Event, KeyboardInput, MouseButton as WinitMouseButton, WindowEvent};
    use winit::event_loop::{ControlFlow, EventLoop};
    use winit::platform::run_return::EventLoopExtRunReturn;
    use winit::window::{Window, WindowBuilder};

    use vapor_runtime::app::{map_keycode, map_mouse_button, print_scene_listing, print_summary, score};
    use vapor_runtime::pong::{build_scene, PongHandles};
    use vapor_runtime::{
        EngineConfig, FrameClock, InputSink, KeyCode, NamedKey, Scene, Viewport, ViewportProvider,
        WindowViewport,
    };

    const DEFAULT_FRAMES: u32 = 600;

    pub fn run() -> Result<()> {
        let options = CliOptions::parse(env::args().skip(1))?;
        let mut config = EngineConfig::from_env().context("invalid VAPOR_* environment")?;
        if options.width.is_some() || options.height.is_some() {
            config.viewport = Viewport::new(
                options.width.unwrap_or(config.viewport.width),
                options.height.unwrap_or(config.viewport.height),
            );
        }

        let mut scene = Scene::new(config);
        let handles = build_scene(&mut scene);
        print_scene_listing(&scene);

        if options.summary_only {
            return run_headless(scene, handles, options.frames);
        }

        let viewport = scene.viewport();
        match run_interactive(&mut scene, handles, viewport) {
            Ok(()) => {
                print_summary(&scene, &handles);
                Ok(())
            }
            Err(err) if err.downcast_ref::<WindowInitError>().is_some() => {
                eprintln!(
                    "{err}. Falling back to --summary-only mode (set DISPLAY or install X11 libs to enable a window)."
                );
                run_headless(scene, handles, options.frames)
            }
            Err(err) => Err(err),
        }
    }

    fn run_headless(mut scene: Scene, handles: PongHandles, frames: u32) -> Result<()> {
        let delta = scene.config().fixed_delta;
        info!("running {frames} headless frames at {delta:.4}s");
        for _ in 0..frames {
            scene.frame(delta);
        }
        print_summary(&scene, &handles);
        Ok(())
    }

    fn run_interactive(scene: &mut Scene, handles: PongHandles, viewport: Viewport) -> Result<()> {
        let default_hook = panic::take_hook();
        panic::set_hook(Box::new(|_| {}));
        let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
        panic::set_hook(default_hook);
        let mut event_loop =
            event_loop.map_err(|panic| WindowInitError::from_panic("event loop", panic))?;
        let window = WindowBuilder::new()
            .with_title("Vapor Pong")
            .with_inner_size(LogicalSize::new(viewport.width as f64, viewport.height as f64))
            .build(&event_loop)
            .map_err(|err| WindowInitError::from_error("window", err))?;

        let size = window.inner_size();
        let mut app = AppState {
            sink: scene.input_sink(),
            viewport: WindowViewport::new(size.width, size.height),
            clock: FrameClock::new(),
            window,
            handles,
            shown_score: None,
        };
        scene.window_resized(app.viewport.viewport());

        event_loop.run_return(|event, _, control_flow| {
            *control_flow = ControlFlow::Poll;
            app.process_event(scene, &event, control_flow);
        });
        Ok(())
    }

    struct AppState {
        window: Window,
        sink: InputSink,
        viewport: WindowViewport,
        clock: FrameClock,
        handles: PongHandles,
        shown_score: Option<(u32, u32)>,
    }

    impl AppState {
        fn process_event(&mut self, scene: &mut Scene, event: &Event<()>, control_flow: &mut ControlFlow) {
            match event {
                Event::WindowEvent { event, window_id } if *window_id == self.window.id() => match event {
                    WindowEvent::CloseRequested => control_flow.set_exit(),
                    WindowEvent::Resized(size) => self.resize(scene, size.width, size.height),
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        self.resize(scene, new_inner_size.width, new_inner_size.height);
                    }
                    WindowEvent::KeyboardInput { input, .. } => {
                        self.handle_keyboard(scene, input, control_flow);
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        self.handle_mouse_button(*state, *button);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        self.sink
                            .mouse_move(Vec2::new(position.x as f32, position.y as f32));
                    }
                    WindowEvent::Focused(false) => scene.set_paused(true),
                    WindowEvent::Focused(true) => {
                        self.clock.reset();
                        scene.set_paused(false);
                    }
                    _ => {}
                },
                Event::MainEventsCleared => {
                    let delta = self.clock.tick();
                    if scene.frame(delta) {
                        debug!("frame {} produced {} draws", scene.time().frame_count(), scene.draws().len());
                        self.refresh_title(scene);
                    }
                }
                _ => {}
            }
        }

        fn resize(&self, scene: &mut Scene, width: u32, height: u32) {
            if self.viewport.update(width, height) {
                scene.window_resized(self.viewport.viewport());
            }
        }

        fn refresh_title(&mut self, scene: &Scene) {
            let current = score(scene, &self.handles);
            if current != self.shown_score {
                if let Some((score1, score2)) = current {
                    self.window.set_title(&format!("Vapor Pong  {score1} - {score2}"));
                }
                self.shown_score = current;
            }
        }

        fn handle_keyboard(&mut self, scene: &mut Scene, input: &KeyboardInput, control_flow: &mut ControlFlow) {
            let Some(keycode) = input.virtual_keycode.and_then(map_keycode) else {
                return;
            };
            match input.state {
                ElementState::Pressed => {
                    match keycode {
                        KeyCode::Named(NamedKey::Escape) => control_flow.set_exit(),
                        KeyCode::Character('P') => {
                            scene.set_paused(!scene.is_paused());
                            self.clock.reset();
                        }
                        _ => {}
                    }
                    self.sink.key_down(keycode);
                }
                ElementState::Released => self.sink.key_up(keycode),
            }
        }

        fn handle_mouse_button(&self, state: ElementState, button: WinitMouseButton) {
            let button = map_mouse_button(button);
            match state {
                ElementState::Pressed => self.sink.mouse_down(button),
                ElementState::Released => self.sink.mouse_up(button),
            }
        }
    }

    #[derive(Debug)]
    struct WindowInitError {
        message: String,
    }

    impl WindowInitError {
        fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
            Self {
                message: format!("failed to initialize {stage}: {}", panic_message(panic)),
            }
        }

        fn from_error(stage: &str, err: impl fmt::Display) -> Self {
            Self {
                message: format!("failed to initialize {stage}: {err}"),
            }
        }
    }

    impl fmt::Display for WindowInitError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.message)
        }
    }

    impl std::error::Error for WindowInitError {}

    fn panic_message(panic: Box<dyn Any + Send>) -> String {
        match panic.downcast::<String>() {
            Ok(msg) => *msg,
            Err(panic) => match panic.downcast::<&'static str>() {
                Ok(msg) => (*msg).to_string(),
                Err(_) => "unknown panic".into(),
            },
        }
    }

    #[derive(Debug, Default)]
    struct CliOptions {
        frames: u32,
        summary_only: bool,
        width: Option<u32>,
        height: Option<u32>,
    }

    impl CliOptions {
        fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
            let mut options = Self {
                frames: DEFAULT_FRAMES,
                ..Self::default()
            };
            let mut args = args.into_iter();
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--summary-only" => options.summary_only = true,
                    "--frames" => options.frames = parse_value(&arg, args.next())?,
                    "--width" => options.width = Some(parse_value(&arg, args.next())?),
                    "--height" => options.height = Some(parse_value(&arg, args.next())?),
                    other => {
                        return Err(anyhow!(
                            "Unknown argument: {other}. Expected --frames N, --summary-only, --width W or --height H"
                        ));
                    }
                }
            }
            Ok(options)
        }
    }

    fn parse_value(flag: &str, value: Option<String>) -> Result<u32> {
        let value = value.ok_or_else(|| anyhow!("{flag} expects a value"))?;
        value
            .parse()
            .with_context(|| format!("{flag} expects a non-negative integer, got {value:?}"))
    }

}
