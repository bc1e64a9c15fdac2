//! Face tracking: turns a detected face into a smoothed offset from frame
//! center and from there into pan/tilt deltas.

use crate::{
    constants::{DEADZONE_PX, TRACK_SPEED},
    error::Result,
    face_detection::{FaceDetect, FaceRegion},
    utils::safe_cast::f64_to_i32_clamp,
};
use log::{debug, warn};
use opencv::{
    core::{Mat, Scalar},
    imgproc::{self, LINE_8},
    prelude::*,
};

/// Overlay color while tracking (BGR green)
const TRACKING_COLOR: (f64, f64, f64) = (0.0, 255.0, 0.0);

/// Overlay color while idle (BGR gray)
const IDLE_COLOR: (f64, f64, f64) = (128.0, 128.0, 128.0);

/// Mutable tracking state owned by the control loop
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackerState {
    /// Whether the loop should act on detections
    pub enabled: bool,
    /// Most recent detection, kept across frames with no face
    pub last_region: Option<FaceRegion>,
    /// Exponentially smoothed normalized offset
    pub smoothed_offset: (f64, f64),
}

impl TrackerState {
    /// Forget the last face and zero the smoothed offset
    pub fn reset(&mut self) {
        self.last_region = None;
        self.smoothed_offset = (0.0, 0.0);
    }
}

/// Raw pixel offset of `region`'s center from the frame center, with the
/// deadzone applied per axis
#[must_use]
pub fn deadzone_offset(frame_dims: (u32, u32), region: &FaceRegion) -> (i64, i64) {
    let (frame_w, frame_h) = frame_dims;
    let (face_cx, face_cy) = region.center();
    let raw_x = face_cx - i64::from(frame_w / 2);
    let raw_y = face_cy - i64::from(frame_h / 2);

    let apply = |raw: i64| if raw.abs() < i64::from(DEADZONE_PX) { 0 } else { raw };
    (apply(raw_x), apply(raw_y))
}

/// Normalized offset in [-1, 1] before smoothing; exactly zero inside the
/// deadzone
#[must_use]
#[allow(clippy::cast_precision_loss)] // Pixel offsets are far below 2^52
pub fn normalized_offset(frame_dims: (u32, u32), region: &FaceRegion) -> (f64, f64) {
    let (frame_w, frame_h) = frame_dims;
    let (dx, dy) = deadzone_offset(frame_dims, region);

    let normalize = |offset: i64, extent: u32| {
        if offset == 0 || extent == 0 {
            0.0
        } else {
            offset as f64 / (f64::from(extent) / 2.0)
        }
    };

    (normalize(dx, frame_w), normalize(dy, frame_h))
}

/// One smoothing step: blend the prior smoothed offset with the new
/// normalized offset of `region`
#[must_use]
pub fn calculate_offset(frame_dims: (u32, u32), region: &FaceRegion, prior: (f64, f64)) -> (f64, f64) {
    let (norm_x, norm_y) = normalized_offset(frame_dims, region);
    (
        prior.0 * (1.0 - TRACK_SPEED) + norm_x * TRACK_SPEED,
        prior.1 * (1.0 - TRACK_SPEED) + norm_y * TRACK_SPEED,
    )
}

/// Map a smoothed offset to pan/tilt deltas.
///
/// Signs are inverted: a face right of center pans the camera left.
#[must_use]
pub fn offset_to_delta(offset: (f64, f64), pan_range: i32, tilt_range: i32) -> (i32, i32) {
    let scale = |value: f64, range: i32| f64_to_i32_clamp((-value * f64::from(range)).round(), i32::MIN, i32::MAX);
    (scale(offset.0, pan_range), scale(offset.1, tilt_range))
}

/// Detects faces and calculates pan/tilt adjustments
pub struct FaceTracker<D: FaceDetect> {
    detector: D,
    state: TrackerState,
}

impl<D: FaceDetect> FaceTracker<D> {
    /// Create a disabled tracker around `detector`
    pub fn new(detector: D) -> Self {
        Self {
            detector,
            state: TrackerState::default(),
        }
    }

    /// Current tracking state
    pub const fn state(&self) -> &TrackerState {
        &self.state
    }

    pub const fn is_enabled(&self) -> bool {
        self.state.enabled
    }

    /// Enable or disable tracking. Disabling resets the state so a later
    /// session starts fresh.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.state.enabled && !enabled {
            debug!("Tracking disabled, state reset");
        }
        self.state.enabled = enabled;
        if !enabled {
            self.state.reset();
        }
    }

    /// Reset tracking state without changing the enabled flag
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Run the detector and remember the face it found, if any
    ///
    /// # Errors
    ///
    /// Propagates detector failures.
    pub fn detect(&mut self, frame: &Mat) -> Result<Option<FaceRegion>> {
        let face = self.detector.detect(frame)?;
        if face.is_some() {
            self.state.last_region = face;
        }
        Ok(face)
    }

    /// Advance the smoothed offset with `region` and return it
    pub fn calculate_offset(&mut self, frame_dims: (u32, u32), region: &FaceRegion) -> (f64, f64) {
        self.state.smoothed_offset = calculate_offset(frame_dims, region, self.state.smoothed_offset);
        self.state.smoothed_offset
    }

    /// Pan/tilt adjustment for `frame`, or `None` when no face is found.
    ///
    /// A frame with no face leaves the smoothed offset untouched. Detector
    /// failures are logged and treated as a miss.
    pub fn get_pan_tilt_delta(&mut self, frame: &Mat, pan_range: i32, tilt_range: i32) -> Option<(i32, i32)> {
        let face = match self.detect(frame) {
            Ok(Some(face)) => face,
            Ok(None) => return None,
            Err(e) => {
                warn!("Face detection failed: {}", e);
                return None;
            }
        };

        let offset = self.calculate_offset(frame_dims(frame), &face);
        let delta = offset_to_delta(offset, pan_range, tilt_range);
        debug!(
            "Face {:?} offset ({:.3}, {:.3}) -> delta {:?}",
            face, offset.0, offset.1, delta
        );
        Some(delta)
    }

    /// Draw a rectangle around the last known face, green while tracking and
    /// gray otherwise
    ///
    /// # Errors
    ///
    /// Returns an error if `OpenCV` cannot draw on `frame`.
    pub fn draw_overlay(&self, frame: &mut Mat) -> Result<()> {
        if let Some(region) = self.state.last_region {
            let (b, g, r) = if self.state.enabled { TRACKING_COLOR } else { IDLE_COLOR };
            imgproc::rectangle(frame, region.to_rect(), Scalar::new(b, g, r, 0.0), 2, LINE_8, 0)?;
        }
        Ok(())
    }
}

/// Frame width and height as unsigned pixel counts
#[allow(clippy::cast_sign_loss)] // Mat dimensions are never negative
pub fn frame_dims(frame: &Mat) -> (u32, u32) {
    (frame.cols().max(0) as u32, frame.rows().max(0) as u32)
}
