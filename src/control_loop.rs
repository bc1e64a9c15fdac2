//! Per-frame control loop.
//!
//! One tick pulls a frame, runs detection and actuation when tracking is on,
//! draws the overlay and hands the frame to the preview. Everything runs on
//! the caller's thread; hardware writes block the tick for at most the
//! gateway timeout. Faults in any collaborator are logged and the tick
//! carries on.

use crate::{
    actuation::{CommitResult, PanTiltActuator, PanTiltMove},
    camera::FrameSource,
    constants::{PAN_CONTROL, TILT_CONTROL},
    error::Result,
    face_detection::FaceDetect,
    presets::{default_values, PresetValues},
    tracker::{FaceTracker, TrackerState},
    v4l2::ControlGateway,
    values::CurrentValues,
};
use log::{debug, info, warn};
use opencv::core::Mat;

/// Receives every frame the loop produces
pub trait PreviewSink {
    /// Show `frame`, or a blank picture when `None`
    ///
    /// # Errors
    ///
    /// Returns an error when the frame cannot be displayed.
    fn show(&mut self, frame: Option<&Mat>) -> Result<()>;
}

/// UI element that mirrors control values, such as a slider per control
pub trait ControlMirror {
    /// Reflect a new value for `control`
    fn reflect(&mut self, control: &str, value: i32);
}

/// Mirror that ignores updates, for headless use
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMirror;

impl ControlMirror for NullMirror {
    fn reflect(&mut self, _control: &str, _value: i32) {}
}

/// Tracking state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Tracking disabled; frames are only previewed
    Idle,
    /// Detections drive pan/tilt
    Tracking,
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// A frame was available
    pub frame_read: bool,
    /// Delta computed from a detected face
    pub delta: Option<(i32, i32)>,
    /// Move sent to the hardware, when the delta cleared hysteresis
    pub committed: Option<PanTiltMove>,
    /// Per-axis write status of `committed`
    pub commit_result: Option<CommitResult>,
}

/// Drives the camera controls from the tracker and the user
pub struct ControlLoop<G: ControlGateway, D: FaceDetect> {
    gateway: G,
    tracker: FaceTracker<D>,
    actuator: PanTiltActuator,
    values: CurrentValues,
}

impl<G: ControlGateway, D: FaceDetect> ControlLoop<G, D> {
    /// Create an idle loop with an empty value cache
    pub fn new(gateway: G, detector: D, actuator: PanTiltActuator) -> Self {
        Self {
            gateway,
            tracker: FaceTracker::new(detector),
            actuator,
            values: CurrentValues::new(),
        }
    }

    pub const fn state(&self) -> LoopState {
        if self.tracker.is_enabled() {
            LoopState::Tracking
        } else {
            LoopState::Idle
        }
    }

    pub const fn tracker_state(&self) -> &TrackerState {
        self.tracker.state()
    }

    pub const fn values(&self) -> &CurrentValues {
        &self.values
    }

    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Enable or disable tracking; takes effect on the next tick.
    /// Leaving `Tracking` resets the tracker state.
    pub fn set_tracking(&mut self, enabled: bool) {
        let before = self.state();
        self.tracker.set_enabled(enabled);
        let after = self.state();
        if before != after {
            info!("Tracking {:?} -> {:?}", before, after);
        }
    }

    /// Flip tracking and return whether it is now enabled
    pub fn toggle_tracking(&mut self) -> bool {
        let enabled = !self.tracker.is_enabled();
        self.set_tracking(enabled);
        enabled
    }

    /// Forget the last face and zero the smoothed offset, keeping the
    /// current state
    pub fn reset_tracking(&mut self) {
        self.tracker.reset();
    }

    /// Replace the value cache with fresh reads of every known control and
    /// mirror them. Returns how many controls could be read.
    pub fn seed_from_hardware(&mut self, mirror: &mut dyn ControlMirror) -> usize {
        self.values = CurrentValues::seed_from(&self.gateway);
        for (control, value) in self.values.iter() {
            mirror.reflect(control, value);
        }
        self.values.len()
    }

    /// Write a control on behalf of the user. The cache is updated whether or
    /// not the write succeeds.
    pub fn set_control(&mut self, control: &str, value: i32) -> bool {
        let ok = self.gateway.set(control, value);
        if !ok {
            warn!("Failed to set {} to {}", control, value);
        }
        self.values.insert(control, value);
        ok
    }

    /// Write every value in `values` and mirror it. Returns how many writes
    /// succeeded.
    pub fn apply_values(&mut self, values: &PresetValues, mirror: &mut dyn ControlMirror) -> usize {
        let mut succeeded = 0;
        for (control, &value) in values {
            if self.set_control(control, value) {
                succeeded += 1;
            }
            mirror.reflect(control, value);
        }
        debug!("Applied {}/{} control values", succeeded, values.len());
        succeeded
    }

    /// Apply the factory default of every known control
    pub fn reset_to_defaults(&mut self, mirror: &mut dyn ControlMirror) -> usize {
        self.apply_values(&default_values(), mirror)
    }

    /// Run one frame of the loop
    pub fn tick(
        &mut self,
        source: &mut dyn FrameSource,
        preview: &mut dyn PreviewSink,
        mirror: &mut dyn ControlMirror,
    ) -> TickOutcome {
        let Some(mut frame) = source.read() else {
            if let Err(e) = preview.show(None) {
                warn!("Preview update failed: {}", e);
            }
            return TickOutcome::default();
        };

        let mut outcome = TickOutcome {
            frame_read: true,
            ..TickOutcome::default()
        };

        if self.state() == LoopState::Tracking {
            outcome.delta = self.tracker.get_pan_tilt_delta(
                &frame,
                self.actuator.pan_range(),
                self.actuator.tilt_range(),
            );

            if let Some(target) = outcome.delta.and_then(|delta| self.actuator.plan(&self.values, delta)) {
                let result = self.actuator.commit(&mut self.gateway, &mut self.values, &target);
                mirror.reflect(PAN_CONTROL, target.pan);
                mirror.reflect(TILT_CONTROL, target.tilt);
                outcome.committed = Some(target);
                outcome.commit_result = Some(result);
            }
        }

        if let Err(e) = self.tracker.draw_overlay(&mut frame) {
            warn!("Overlay drawing failed: {}", e);
        }
        if let Err(e) = preview.show(Some(&frame)) {
            warn!("Preview update failed: {}", e);
        }

        outcome
    }
}
