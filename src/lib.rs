//! PTZ webcam control with automatic face tracking.
//!
//! The crate drives the pan/tilt/zoom and picture controls of a UVC webcam
//! through `v4l2-ctl`, and can keep a face centered by nudging pan and tilt
//! every frame:
//!
//! 1. a Haar cascade finds the largest face in the frame;
//! 2. its offset from the frame center is dead-zoned, normalized and
//!    exponentially smoothed;
//! 3. the smoothed offset is scaled into a pan/tilt delta, filtered by a
//!    hysteresis threshold and clamped to the hardware range;
//! 4. the new absolute position is written to the device.
//!
//! # Example
//!
//! ```no_run
//! use ptz_face_tracker::{
//!     actuation::PanTiltActuator,
//!     camera::Camera,
//!     control_loop::{ControlLoop, NullMirror, PreviewSink},
//!     face_detection::HaarFaceDetector,
//!     v4l2::V4l2Control,
//! };
//! use opencv::core::Mat;
//!
//! struct Discard;
//!
//! impl PreviewSink for Discard {
//!     fn show(&mut self, _frame: Option<&Mat>) -> ptz_face_tracker::Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let detector = HaarFaceDetector::new("/usr/share/opencv4/haarcascades/haarcascade_frontalface_default.xml")?;
//! let mut control = ControlLoop::new(V4l2Control::new("/dev/video0"), detector, PanTiltActuator::default());
//! control.seed_from_hardware(&mut NullMirror);
//! control.set_tracking(true);
//!
//! let mut camera = Camera::new("/dev/video0");
//! camera.open()?;
//! for _ in 0..300 {
//!     let outcome = control.tick(&mut camera, &mut Discard, &mut NullMirror);
//!     if let Some(target) = outcome.committed {
//!         println!("pan {} tilt {}", target.pan, target.tilt);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Pan/tilt delta filtering, clamping and commit
pub mod actuation;

/// Interactive preview application
pub mod app;

/// Video capture
pub mod camera;

/// Command line interface
pub mod cli;

/// Configuration management
pub mod config;

/// Control table and tuning constants
pub mod constants;

/// Per-frame control loop
pub mod control_loop;

/// Error types and result handling
pub mod error;

/// Face detection
pub mod face_detection;

/// Preset persistence
pub mod presets;

/// `HighGUI` preview window and trackbars
pub mod preview;

/// Face offset estimation
pub mod tracker;

/// Numeric helpers
pub mod utils;

/// `v4l2-ctl` control gateway
pub mod v4l2;

/// Last-known control values
pub mod values;

pub use error::{Error, Result};
