//! Interactive preview application.

use crate::{
    actuation::PanTiltActuator,
    camera::Camera,
    config::Config,
    constants::{control_spec, AUTOFOCUS_CONTROL},
    control_loop::{ControlLoop, ControlMirror, LoopState},
    error::Result,
    face_detection::HaarFaceDetector,
    presets::PresetStore,
    preview::{HighguiPreview, Trackbars},
    v4l2::V4l2Control,
};
use log::{info, warn};
use opencv::highgui;
use std::time::{Duration, Instant};

/// Keyboard commands understood by the preview window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// `t`
    ToggleTracking,
    /// `r`
    ResetDefaults,
    /// `s`
    SavePreset,
    /// `p`
    NextPreset,
    /// `f`
    ToggleAutofocus,
    /// `q` or Esc
    Quit,
}

impl KeyAction {
    /// Map a `wait_key` code to an action
    #[must_use]
    pub fn from_key(key: i32) -> Option<Self> {
        if key == 27 {
            return Some(Self::Quit);
        }
        let key = u8::try_from(key & 0xFF).ok()?;
        match key.to_ascii_lowercase() {
            b't' => Some(Self::ToggleTracking),
            b'r' => Some(Self::ResetDefaults),
            b's' => Some(Self::SavePreset),
            b'p' => Some(Self::NextPreset),
            b'f' => Some(Self::ToggleAutofocus),
            b'q' => Some(Self::Quit),
            _ => None,
        }
    }
}

/// Frames-per-second estimate refreshed at most once per second
#[derive(Debug)]
pub struct FpsCounter {
    frames: u32,
    window_start: Instant,
    fps: f64,
}

impl FpsCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    #[must_use]
    pub const fn starting_at(now: Instant) -> Self {
        Self {
            frames: 0,
            window_start: now,
            fps: 0.0,
        }
    }

    /// Count a frame. Returns the new estimate when a second has passed.
    pub fn tick(&mut self, now: Instant) -> Option<f64> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < Duration::from_secs(1) {
            return None;
        }
        self.fps = f64::from(self.frames) / elapsed.as_secs_f64();
        self.frames = 0;
        self.window_start = now;
        Some(self.fps)
    }

    #[must_use]
    pub const fn fps(&self) -> f64 {
        self.fps
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Index of the preset after `current`, wrapping around
#[must_use]
pub const fn next_preset_index(current: usize, count: usize) -> usize {
    if count == 0 {
        0
    } else {
        (current + 1) % count
    }
}

/// Camera preview with live controls and face tracking
pub struct PtzApp {
    camera: Camera,
    control: ControlLoop<V4l2Control, HaarFaceDetector>,
    preview: HighguiPreview,
    trackbars: Trackbars,
    store: PresetStore,
    preset_names: Vec<String>,
    current_preset: usize,
}

impl PtzApp {
    /// Set up the camera, detector, window and control state
    ///
    /// # Errors
    ///
    /// Returns an error if the cascade cannot be loaded, the ranges are
    /// invalid or the window cannot be created. A camera that fails to open
    /// is only logged; the preview stays blank.
    pub fn new(config: &Config, track: bool) -> Result<Self> {
        info!("Initializing PTZ face tracker on {}", config.camera.device);

        let detector = HaarFaceDetector::new(&config.detection.cascade_path)?;
        let actuator = PanTiltActuator::new(config.tracking.pan_range, config.tracking.tilt_range)?;
        let gateway = V4l2Control::new(config.camera.device.clone());

        let mut camera = Camera::new(config.camera.device.clone()).with_size(config.camera.width, config.camera.height);
        match camera.open() {
            Ok(true) => {}
            Ok(false) => warn!("No video from {}", config.camera.device),
            Err(e) => warn!("Failed to open {}: {}", config.camera.device, e),
        }

        let preview = HighguiPreview::new(&config.preview.window_title, config.preview.width, config.preview.height)?;
        let mut trackbars = Trackbars::new(preview.window());

        let mut control = ControlLoop::new(gateway, detector, actuator);
        control.seed_from_hardware(&mut trackbars);
        control.set_tracking(track || config.tracking.start_enabled);

        let store = config.preset_store();
        let preset_names = store.list_names();

        Ok(Self {
            camera,
            control,
            preview,
            trackbars,
            store,
            preset_names,
            current_preset: 0,
        })
    }

    /// Name of the preset `s` saves into and `p` starts cycling from
    #[must_use]
    pub fn current_preset(&self) -> Option<&str> {
        self.preset_names.get(self.current_preset).map(String::as_str)
    }

    /// Run until the user quits
    ///
    /// # Errors
    ///
    /// Returns an error if `HighGUI` stops processing events.
    pub fn run(&mut self) -> Result<()> {
        info!("Starting main loop (t: track, r: reset, s: save, p: presets, f: autofocus, q: quit)");

        let mut fps = FpsCounter::new();
        self.refresh_status();

        loop {
            for (control, value) in self.trackbars.poll_changes() {
                self.control.set_control(control, value);
            }

            let outcome = self.control.tick(&mut self.camera, &mut self.preview, &mut self.trackbars);
            if outcome.frame_read {
                if let Some(rate) = fps.tick(Instant::now()) {
                    self.preview.set_fps(rate);
                }
            }

            let key = highgui::wait_key(1)?;
            match KeyAction::from_key(key) {
                Some(KeyAction::Quit) => {
                    info!("Exit requested by user");
                    break;
                }
                Some(action) => self.handle(action),
                None => {}
            }
        }

        info!("Application shutting down");
        Ok(())
    }

    fn handle(&mut self, action: KeyAction) {
        match action {
            KeyAction::ToggleTracking => {
                self.control.toggle_tracking();
            }
            KeyAction::ResetDefaults => {
                info!("Resetting controls to defaults");
                self.control.reset_to_defaults(&mut self.trackbars);
                self.control.reset_tracking();
            }
            KeyAction::SavePreset => self.save_current_preset(),
            KeyAction::NextPreset => self.apply_next_preset(),
            KeyAction::ToggleAutofocus => self.toggle_autofocus(),
            KeyAction::Quit => {}
        }
        self.refresh_status();
    }

    fn save_current_preset(&mut self) {
        let Some(name) = self.current_preset().map(str::to_string) else {
            return;
        };
        if let Err(e) = self.store.save_preset(&name, self.control.values().to_map()) {
            warn!("Failed to save preset '{}': {}", name, e);
        }
    }

    fn apply_next_preset(&mut self) {
        self.preset_names = self.store.list_names();
        self.current_preset = next_preset_index(self.current_preset, self.preset_names.len());

        let Some(name) = self.current_preset().map(str::to_string) else {
            return;
        };
        match self.store.require_preset(&name) {
            Ok(values) => {
                let applied = self.control.apply_values(&values, &mut self.trackbars);
                info!("Applied preset '{}' ({}/{} controls)", name, applied, values.len());
            }
            Err(e) => warn!("{}", e),
        }
    }

    fn toggle_autofocus(&mut self) {
        let Some(spec) = control_spec(AUTOFOCUS_CONTROL) else {
            return;
        };
        let value = spec.toggled(self.control.values().get(AUTOFOCUS_CONTROL));
        info!("Autofocus {}", if value == spec.max { "on" } else { "off" });
        self.control.set_control(AUTOFOCUS_CONTROL, value);
        self.trackbars.reflect(AUTOFOCUS_CONTROL, value);
    }

    fn refresh_status(&mut self) {
        let tracking = match self.control.state() {
            LoopState::Tracking => "TRACKING",
            LoopState::Idle => "idle",
        };
        let preset = self.current_preset().unwrap_or("-").to_string();
        self.preview.set_status(format!("{tracking} | {preset}"));
    }
}
