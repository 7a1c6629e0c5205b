use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::config::AppConfig;
use crate::error::{AppError, HostError, SceneError};
use crate::host::{ArgValue, CommandArgs, Host, HostRequest, LogCuePlayer, Navigator, SimulatedDevices};
use crate::scene::{FrameOutcome, GpuBackend, SceneConfig, SceneRegistry, frame_fn};
use crate::sequence::PhaseSequencer;
use crate::sequence::intro::{build_starfield, drift_starfield};

pub const INTRO_SCENE: &str = "intro";
pub const HOME_SCENE: &str = "home";
pub const HOME_ROUTE: &str = "/home";

/// Navigator that accepts known routes and leaves them for the app to follow
/// after the current batch of requests.
#[derive(Clone, Default)]
struct Router {
    pending: Rc<RefCell<Option<String>>>,
}

impl Router {
    fn take(&self) -> Option<String> {
        self.pending.borrow_mut().take()
    }
}

impl Navigator for Router {
    fn navigate(&mut self, route: &str) -> Result<(), HostError> {
        if route != HOME_ROUTE {
            return Err(HostError::Navigation {
                route: route.to_string(),
                reason: "unknown route".to_string(),
            });
        }
        *self.pending.borrow_mut() = Some(route.to_string());
        Ok(())
    }
}

enum Screen {
    Intro(Rc<RefCell<PhaseSequencer>>),
    Home,
}

impl Screen {
    fn scene(&self) -> &'static str {
        match self {
            Screen::Intro(_) => INTRO_SCENE,
            Screen::Home => HOME_SCENE,
        }
    }
}

struct ScanlineApp {
    config: AppConfig,
    window: Option<Arc<Window>>,
    scenes: SceneRegistry<GpuBackend>,
    host: Host,
    router: Router,
    screen: Option<Screen>,
    failure: Option<AppError>,
}

impl ScanlineApp {
    fn new(config: AppConfig) -> Self {
        let router = Router::default();
        let host = Host::new(
            Box::new(router.clone()),
            Box::new(LogCuePlayer::default()),
            Box::new(SimulatedDevices::default()),
        );
        Self {
            config,
            window: None,
            scenes: SceneRegistry::new(GpuBackend::new()),
            host,
            router,
            screen: None,
            failure: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        log::error!("{error}");
        self.scenes.shutdown();
        self.failure = Some(error);
        event_loop.exit();
    }

    fn enter_intro(&mut self, window: &Arc<Window>) -> Result<(), SceneError> {
        let scene = self.scenes.create_scene(
            INTRO_SCENE,
            SceneConfig::new(window.clone()).crt(self.config.intro_intensity),
        )?;
        let sequencer = Rc::new(RefCell::new(PhaseSequencer::build(
            scene,
            &self.config.sequence,
        )));
        self.scenes
            .start_render_loop(INTRO_SCENE, Some(Box::new(sequencer.clone())))?;
        self.screen = Some(Screen::Intro(sequencer));
        Ok(())
    }

    fn enter_home(&mut self, window: &Arc<Window>) -> Result<(), SceneError> {
        let scene = self.scenes.create_scene(
            HOME_SCENE,
            SceneConfig::new(window.clone()).crt(self.config.home_intensity),
        )?;
        let (_, drawables, output) = scene.parts_mut();
        let sequence = &self.config.sequence;
        let backdrop = build_starfield(drawables, output, sequence.star_count, sequence.star_seed);

        let mut elapsed = 0.0;
        self.scenes.start_render_loop(
            HOME_SCENE,
            Some(Box::new(frame_fn(move |frame| {
                elapsed += frame.dt;
                drift_starfield(frame.drawables, backdrop, elapsed);
            }))),
        )?;
        self.screen = Some(Screen::Home);
        Ok(())
    }

    /// Tears down the current screen's scene.
    fn leave_screen(&mut self) {
        let Some(screen) = self.screen.take() else {
            return;
        };
        if let Screen::Intro(sequencer) = &screen {
            sequencer.borrow_mut().cancel();
            self.host.apply(HostRequest::StopCue);
        }
        self.scenes.destroy_scene(screen.scene());
    }

    fn follow_route(&mut self, event_loop: &ActiveEventLoop) {
        let Some(route) = self.router.take() else {
            return;
        };
        let Some(window) = self.window.clone() else {
            return;
        };
        if matches!(self.screen, Some(Screen::Home)) {
            log::debug!("already at {route}");
            return;
        }
        self.leave_screen();
        if let Err(e) = self.enter_home(&window) {
            self.fail(event_loop, e.into());
        }
    }

    fn skip_intro(&mut self, event_loop: &ActiveEventLoop) {
        let Some(Screen::Intro(sequencer)) = &self.screen else {
            return;
        };
        let route = sequencer.borrow_mut().skip();
        if let Some(route) = route {
            self.host.apply(HostRequest::Navigate(route));
            self.follow_route(event_loop);
        }
    }

    /// Nudges the simulated system volume and shows the result in the title.
    fn adjust_volume(&mut self, delta: i64) {
        let Some(ArgValue::Int(volume)) = self.host.device("get_system_volume", &CommandArgs::new())
        else {
            return;
        };
        let mut args = CommandArgs::new();
        args.insert("volume".to_string(), ArgValue::Int(volume + delta));
        self.host.device("set_system_volume", &args);
        if self.host.status().is_none() {
            log::info!("volume {}", volume + delta);
        }
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, event: &KeyEvent) {
        if event.state != ElementState::Pressed || event.repeat {
            return;
        }
        match event.physical_key {
            PhysicalKey::Code(KeyCode::Escape | KeyCode::Enter | KeyCode::Space) => {
                self.skip_intro(event_loop)
            }
            PhysicalKey::Code(KeyCode::ArrowUp) => self.adjust_volume(10),
            PhysicalKey::Code(KeyCode::ArrowDown) => self.adjust_volume(-10),
            _ => {}
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        self.scenes.dispatch_timers(now);
        if let Some(screen) = &self.screen {
            if self.scenes.frame(screen.scene(), now) == FrameOutcome::Inert {
                log::trace!("'{}' is inert", screen.scene());
            }
        }

        let requests = self.scenes.take_requests();
        self.host.apply_all(requests);
        self.follow_route(event_loop);

        if let Some(window) = &self.window {
            if let Some(status) = self.host.take_status() {
                window.set_title(&format!("{} - {status}", self.config.title));
            }
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for ScanlineApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attributes = WindowAttributes::default()
            .with_title(&self.config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.width,
                self.config.height,
            ));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => return self.fail(event_loop, e.into()),
        };
        self.window = Some(window.clone());

        let entered = if self.config.skip_intro {
            self.enter_home(&window)
        } else {
            self.enter_intro(&window)
        };
        if let Err(e) = entered {
            return self.fail(event_loop, e.into());
        }
        window.request_redraw();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.leave_screen();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(screen) = &self.screen {
                    self.scenes.resize(screen.scene(), size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => self.on_key(event_loop, &event),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.scenes.shutdown();
    }
}

/// Opens the window and runs the intro, then the home screen, until closed.
///
/// # Example
/// ```no_run
/// scanline::run(scanline::AppConfig::new().title("Scanline").size(1280, 720))?;
/// # Ok::<(), scanline::AppError>(())
/// ```
pub fn run(config: AppConfig) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ScanlineApp::new(config);
    event_loop.run_app(&mut app)?;
    match app.failure.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_accepts_home_only() {
        let mut router = Router::default();
        assert!(router.navigate("/settings").is_err());
        assert_eq!(router.take(), None);
        router.navigate(HOME_ROUTE).unwrap();
        assert_eq!(router.take().as_deref(), Some(HOME_ROUTE));
        assert_eq!(router.take(), None);
    }

    #[test]
    fn host_routes_through_a_shared_router() {
        let router = Router::default();
        let mut host = Host::new(
            Box::new(router.clone()),
            Box::new(LogCuePlayer::default()),
            Box::new(SimulatedDevices::default()),
        );
        host.apply(HostRequest::Navigate(HOME_ROUTE.to_string()));
        assert_eq!(router.take().as_deref(), Some(HOME_ROUTE));

        host.apply(HostRequest::Navigate("/nowhere".to_string()));
        assert!(host.take_status().unwrap().contains("unknown route"));
        assert_eq!(router.take(), None);
    }
}
