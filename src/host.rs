//! External collaborators: navigation, audio cues and device control.
//!
//! Scenes and sequencers never call these directly. They queue
//! [`HostRequest`]s on the frame, and the application hands them to a
//! [`Host`] after the frame. A failing call is logged and turned into a
//! status line for the user; it never reaches the sequence that asked for it.

use std::collections::BTreeMap;

use crate::error::HostError;

/// Side effect requested by a frame or timer handler.
#[derive(Clone, Debug, PartialEq)]
pub enum HostRequest {
    Navigate(String),
    PlayCue(String),
    StopCue,
}

pub trait Navigator {
    fn navigate(&mut self, route: &str) -> Result<(), HostError>;
}

pub trait CuePlayer {
    fn play(&mut self, clip: &str) -> Result<(), HostError>;
    fn stop(&mut self);
}

/// Value in a device command's flat argument record.
#[derive(Clone, Debug, PartialEq)]
pub enum ArgValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

pub type CommandArgs = BTreeMap<String, ArgValue>;

/// Fire-and-forget device commands keyed by name.
pub trait DeviceControl {
    fn invoke(&mut self, command: &str, args: &CommandArgs) -> Result<Option<ArgValue>, String>;
}

pub struct Host {
    navigator: Box<dyn Navigator>,
    cues: Box<dyn CuePlayer>,
    devices: Box<dyn DeviceControl>,
    status: Option<String>,
}

impl Host {
    pub fn new(
        navigator: Box<dyn Navigator>,
        cues: Box<dyn CuePlayer>,
        devices: Box<dyn DeviceControl>,
    ) -> Self {
        Self {
            navigator,
            cues,
            devices,
            status: None,
        }
    }

    pub fn apply(&mut self, request: HostRequest) {
        let result = match &request {
            HostRequest::Navigate(route) => {
                log::info!("navigate -> {route}");
                self.navigator.navigate(route)
            }
            HostRequest::PlayCue(clip) => self.cues.play(clip),
            HostRequest::StopCue => {
                self.cues.stop();
                Ok(())
            }
        };
        if let Err(e) = result {
            self.report(e);
        }
    }

    pub fn apply_all(&mut self, requests: impl IntoIterator<Item = HostRequest>) {
        for request in requests {
            self.apply(request);
        }
    }

    /// Runs a device command. Failures become the status line and yield `None`.
    pub fn device(&mut self, command: &str, args: &CommandArgs) -> Option<ArgValue> {
        match self.devices.invoke(command, args) {
            Ok(value) => value,
            Err(reason) => {
                self.report(HostError::Device {
                    command: command.to_string(),
                    reason,
                });
                None
            }
        }
    }

    fn report(&mut self, error: HostError) {
        log::warn!("{error}");
        self.status = Some(error.to_string());
    }

    /// Latest user-visible failure message.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn take_status(&mut self) -> Option<String> {
        self.status.take()
    }
}

/// Cue player without an audio device: logs and remembers the current clip.
#[derive(Debug, Default)]
pub struct LogCuePlayer {
    playing: Option<String>,
}

impl LogCuePlayer {
    pub fn playing(&self) -> Option<&str> {
        self.playing.as_deref()
    }
}

impl CuePlayer for LogCuePlayer {
    fn play(&mut self, clip: &str) -> Result<(), HostError> {
        if clip.is_empty() {
            return Err(HostError::Audio {
                clip: clip.to_string(),
                reason: "empty clip reference".to_string(),
            });
        }
        log::info!("cue: play {clip}");
        self.playing = Some(clip.to_string());
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(clip) = self.playing.take() {
            log::info!("cue: stop {clip}");
        }
    }
}

/// In-memory stand-in for the volume and brightness controls.
#[derive(Debug)]
pub struct SimulatedDevices {
    pub volume: i64,
    pub brightness: i64,
}

impl Default for SimulatedDevices {
    fn default() -> Self {
        Self {
            volume: 50,
            brightness: 255,
        }
    }
}

fn int_arg(args: &CommandArgs, key: &str, range: std::ops::RangeInclusive<i64>) -> Result<i64, String> {
    match args.get(key) {
        Some(ArgValue::Int(v)) if range.contains(v) => Ok(*v),
        Some(ArgValue::Int(v)) => Err(format!(
            "{key} {v} outside {}..={}",
            range.start(),
            range.end()
        )),
        Some(other) => Err(format!("{key} must be an integer, got {other:?}")),
        None => Err(format!("missing argument '{key}'")),
    }
}

impl DeviceControl for SimulatedDevices {
    fn invoke(&mut self, command: &str, args: &CommandArgs) -> Result<Option<ArgValue>, String> {
        match command {
            "set_system_volume" => {
                self.volume = int_arg(args, "volume", 0..=100)?;
                Ok(None)
            }
            "get_system_volume" => Ok(Some(ArgValue::Int(self.volume))),
            "set_brightness" => {
                self.brightness = int_arg(args, "level", 0..=255)?;
                Ok(None)
            }
            "get_brightness" => Ok(Some(ArgValue::Int(self.brightness))),
            other => Err(format!("unknown command '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder(Rc<RefCell<Vec<String>>>);

    impl Navigator for Recorder {
        fn navigate(&mut self, route: &str) -> Result<(), HostError> {
            if route == "/missing" {
                return Err(HostError::Navigation {
                    route: route.to_string(),
                    reason: "no such route".to_string(),
                });
            }
            self.0.borrow_mut().push(route.to_string());
            Ok(())
        }
    }

    fn host() -> (Host, Rc<RefCell<Vec<String>>>) {
        let routes = Rc::new(RefCell::new(Vec::new()));
        let host = Host::new(
            Box::new(Recorder(routes.clone())),
            Box::new(LogCuePlayer::default()),
            Box::new(SimulatedDevices::default()),
        );
        (host, routes)
    }

    #[test]
    fn navigation_is_forwarded() {
        let (mut host, routes) = host();
        host.apply(HostRequest::Navigate("/home".into()));
        assert_eq!(*routes.borrow(), vec!["/home".to_string()]);
        assert_eq!(host.status(), None);
    }

    #[test]
    fn failures_become_status_lines() {
        let (mut host, routes) = host();
        host.apply(HostRequest::Navigate("/missing".into()));
        assert!(routes.borrow().is_empty());
        assert!(host.status().unwrap().contains("no such route"));

        let mut args = CommandArgs::new();
        args.insert("level".into(), ArgValue::Int(300));
        assert_eq!(host.device("set_brightness", &args), None);
        assert!(host.take_status().unwrap().contains("set_brightness"));
        assert_eq!(host.status(), None);
    }

    #[test]
    fn device_round_trip() {
        let (mut host, _) = host();
        let mut args = CommandArgs::new();
        args.insert("volume".into(), ArgValue::Int(30));
        assert_eq!(host.device("set_system_volume", &args), None);
        assert_eq!(
            host.device("get_system_volume", &CommandArgs::new()),
            Some(ArgValue::Int(30))
        );
        assert_eq!(host.status(), None);
    }

    #[test]
    fn cue_player_tracks_clip() {
        let mut cues = LogCuePlayer::default();
        cues.play("assets/audio/intro2.wav").unwrap();
        assert_eq!(cues.playing(), Some("assets/audio/intro2.wav"));
        cues.stop();
        assert_eq!(cues.playing(), None);
        assert!(cues.play("").is_err());
    }
}
