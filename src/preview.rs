//! `HighGUI` preview window and control trackbars.

use crate::{
    constants::{control_spec, ControlSpec, CONTROLS},
    control_loop::{ControlMirror, PreviewSink},
    error::Result,
};
use log::{debug, warn};
use opencv::{
    core::{Mat, Point, Scalar, Size, CV_8UC3},
    highgui::{self, WINDOW_AUTOSIZE},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, INTER_LINEAR, LINE_8},
    prelude::*,
};
use std::collections::BTreeMap;

/// Trackbar position for `value`, in steps from the control minimum
#[must_use]
pub fn value_to_position(spec: &ControlSpec, value: i32) -> i32 {
    let step = i64::from(spec.step.max(1));
    let offset = i64::from(spec.clamp(value)) - i64::from(spec.min);
    i32::try_from(offset / step).unwrap_or(i32::MAX)
}

/// Control value for a trackbar position
#[must_use]
pub fn position_to_value(spec: &ControlSpec, position: i32) -> i32 {
    let step = i64::from(spec.step.max(1));
    let value = i64::from(spec.min) + i64::from(position.max(0)) * step;
    spec.clamp(i32::try_from(value).unwrap_or(spec.max))
}

/// Number of trackbar steps covering the control range
#[must_use]
pub fn position_count(spec: &ControlSpec) -> i32 {
    value_to_position(spec, spec.max)
}

/// Preview window showing the (downscaled) camera feed
pub struct HighguiPreview {
    window: String,
    size: Size,
    fps: Option<f64>,
    status: String,
}

impl HighguiPreview {
    /// Create the window
    ///
    /// # Errors
    ///
    /// Returns an error if `HighGUI` cannot create the window.
    pub fn new(window: impl Into<String>, width: i32, height: i32) -> Result<Self> {
        let window = window.into();
        highgui::named_window(&window, WINDOW_AUTOSIZE)?;
        Ok(Self {
            window,
            size: Size::new(width, height),
            fps: None,
            status: String::new(),
        })
    }

    #[must_use]
    pub fn window(&self) -> &str {
        &self.window
    }

    /// FPS figure drawn on subsequent frames
    pub fn set_fps(&mut self, fps: f64) {
        self.fps = Some(fps);
    }

    /// Status line drawn under the FPS figure
    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    fn draw_text(frame: &mut Mat, text: &str, y: i32) -> Result<()> {
        imgproc::put_text(
            frame,
            text,
            Point::new(8, y),
            FONT_HERSHEY_SIMPLEX,
            0.5,
            Scalar::new(0.0, 255.0, 0.0, 0.0),
            1,
            LINE_8,
            false,
        )?;
        Ok(())
    }
}

impl PreviewSink for HighguiPreview {
    fn show(&mut self, frame: Option<&Mat>) -> Result<()> {
        let mut display = match frame {
            Some(frame) => {
                let mut resized = Mat::default();
                imgproc::resize(frame, &mut resized, self.size, 0.0, 0.0, INTER_LINEAR)?;
                resized
            }
            None => Mat::zeros(self.size.height, self.size.width, CV_8UC3)?.to_mat()?,
        };

        if let Some(fps) = self.fps {
            Self::draw_text(&mut display, &format!("FPS: {fps:.1}"), 20)?;
        }
        if !self.status.is_empty() {
            Self::draw_text(&mut display, &self.status, 40)?;
        }

        highgui::imshow(&self.window, &display)?;
        Ok(())
    }
}

impl Drop for HighguiPreview {
    fn drop(&mut self) {
        if let Err(e) = highgui::destroy_window(&self.window) {
            debug!("Failed to destroy window {}: {}", self.window, e);
        }
    }
}

/// What a trackbar needs so that it shows a control value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackbarUpdate {
    /// No trackbar yet; create one at this position
    Create(i32),
    /// Move the existing trackbar
    Move(i32),
    Unchanged,
}

/// Decide how to show `value` given the trackbar's last known position
#[must_use]
pub fn plan_trackbar(spec: &ControlSpec, value: i32, known: Option<i32>) -> TrackbarUpdate {
    let position = value_to_position(spec, value);
    match known {
        None => TrackbarUpdate::Create(position),
        Some(current) if current == position => TrackbarUpdate::Unchanged,
        Some(_) => TrackbarUpdate::Move(position),
    }
}

/// Control trackbars attached to a preview window.
///
/// A trackbar is created the first time its control gets a value, so a
/// control the device never reported has no widget showing a made-up value.
/// Toggles get a two-position trackbar.
pub struct Trackbars {
    window: String,
    positions: BTreeMap<&'static str, i32>,
}

impl Trackbars {
    #[must_use]
    pub fn new(window: impl Into<String>) -> Self {
        Self {
            window: window.into(),
            positions: BTreeMap::new(),
        }
    }

    /// Controls whose trackbar the user moved since the last poll, with the
    /// new values
    pub fn poll_changes(&mut self) -> Vec<(&'static str, i32)> {
        let mut changes = Vec::new();

        for spec in CONTROLS.iter().filter(|spec| self.positions.contains_key(spec.name)) {
            let position = match highgui::get_trackbar_pos(spec.label, &self.window) {
                Ok(position) => position,
                Err(e) => {
                    debug!("Trackbar {} unreadable: {}", spec.label, e);
                    continue;
                }
            };
            if self.positions.get(spec.name) != Some(&position) {
                self.positions.insert(spec.name, position);
                changes.push((spec.name, position_to_value(spec, position)));
            }
        }

        changes
    }

    fn apply(&self, spec: &ControlSpec, update: TrackbarUpdate) -> Result<()> {
        match update {
            TrackbarUpdate::Create(position) => {
                highgui::create_trackbar(spec.label, &self.window, None, position_count(spec), None)?;
                highgui::set_trackbar_pos(spec.label, &self.window, position)?;
            }
            TrackbarUpdate::Move(position) => highgui::set_trackbar_pos(spec.label, &self.window, position)?,
            TrackbarUpdate::Unchanged => {}
        }
        Ok(())
    }
}

impl ControlMirror for Trackbars {
    fn reflect(&mut self, control: &str, value: i32) {
        let Some(spec) = control_spec(control) else {
            return;
        };
        let update = plan_trackbar(spec, value, self.positions.get(spec.name).copied());
        match self.apply(spec, update) {
            Ok(()) => {
                if let TrackbarUpdate::Create(position) | TrackbarUpdate::Move(position) = update {
                    self.positions.insert(spec.name, position);
                }
            }
            Err(e) => warn!("Failed to update trackbar {}: {}", spec.label, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{AUTOFOCUS_CONTROL, PAN_SPEC};

    #[test]
    fn test_pan_positions() {
        assert_eq!(position_count(&PAN_SPEC), 360);
        assert_eq!(value_to_position(&PAN_SPEC, 0), 180);
        assert_eq!(value_to_position(&PAN_SPEC, 3_701), 181);
        assert_eq!(position_to_value(&PAN_SPEC, 182), 7_200);
        assert_eq!(position_to_value(&PAN_SPEC, 360), 648_000);
    }

    #[test]
    fn test_positions_clamp_out_of_range() {
        assert_eq!(value_to_position(&PAN_SPEC, 900_000), 360);
        assert_eq!(value_to_position(&PAN_SPEC, -900_000), 0);
        assert_eq!(position_to_value(&PAN_SPEC, -5), PAN_SPEC.min);
        assert_eq!(position_to_value(&PAN_SPEC, 10_000), PAN_SPEC.max);
    }

    #[test]
    fn test_unit_step_round_trip() {
        let brightness = control_spec("brightness").unwrap();
        for value in [brightness.min, brightness.default, brightness.max] {
            assert_eq!(position_to_value(brightness, value_to_position(brightness, value)), value);
        }
    }

    #[test]
    fn test_toggle_positions() {
        let autofocus = control_spec(AUTOFOCUS_CONTROL).unwrap();
        assert_eq!(position_count(autofocus), 1);
        assert_eq!(value_to_position(autofocus, 0), 0);
        assert_eq!(value_to_position(autofocus, 1), 1);
        assert_eq!(position_to_value(autofocus, 0), 0);
        assert_eq!(position_to_value(autofocus, 1), 1);
    }

    #[test]
    fn test_trackbar_created_on_first_value() {
        let autofocus = control_spec(AUTOFOCUS_CONTROL).unwrap();
        assert_eq!(plan_trackbar(autofocus, 0, None), TrackbarUpdate::Create(0));
        assert_eq!(plan_trackbar(autofocus, 0, Some(1)), TrackbarUpdate::Move(0));
        assert_eq!(plan_trackbar(autofocus, 1, Some(1)), TrackbarUpdate::Unchanged);

        assert_eq!(plan_trackbar(&PAN_SPEC, -3_600, None), TrackbarUpdate::Create(179));
        assert_eq!(plan_trackbar(&PAN_SPEC, -3_000, Some(179)), TrackbarUpdate::Unchanged);
    }
}
