//! Video capture from a V4L2 device.

use crate::{
    constants::{CAPTURE_HEIGHT, CAPTURE_WIDTH, DEFAULT_DEVICE},
    error::Result,
};
use log::{info, warn};
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_FRAME_HEIGHT, CAP_PROP_FRAME_WIDTH},
};

/// Pull-based source of BGR frames
pub trait FrameSource {
    /// Next frame, or `None` when nothing could be read
    fn read(&mut self) -> Option<Mat>;
}

/// Capture index for a `/dev/videoN` path; anything unparseable maps to 0
#[must_use]
pub fn device_index(device: &str) -> i32 {
    device
        .strip_prefix("/dev/video")
        .and_then(|suffix| suffix.parse().ok())
        .unwrap_or(0)
}

/// `OpenCV` video capture wrapper
pub struct Camera {
    device: String,
    width: i32,
    height: i32,
    capture: Option<VideoCapture>,
}

impl Camera {
    /// Create a closed camera for `device`
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            width: CAPTURE_WIDTH,
            height: CAPTURE_HEIGHT,
            capture: None,
        }
    }

    /// Request a capture size other than the default; applied on next open
    #[must_use]
    pub const fn with_size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    #[must_use]
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Open the device, closing any previous capture first.
    ///
    /// Returns `Ok(false)` when the device exists but cannot be opened.
    ///
    /// # Errors
    ///
    /// Returns an error if `OpenCV` fails while creating the capture.
    pub fn open(&mut self) -> Result<bool> {
        self.close();

        let index = device_index(&self.device);
        info!("Opening camera {} (index {})", self.device, index);
        let mut capture = VideoCapture::new(index, videoio::CAP_ANY)?;

        if !capture.is_opened()? {
            warn!("Camera {} could not be opened", self.device);
            return Ok(false);
        }

        capture.set(CAP_PROP_FRAME_WIDTH, f64::from(self.width))?;
        capture.set(CAP_PROP_FRAME_HEIGHT, f64::from(self.height))?;
        self.capture = Some(capture);
        Ok(true)
    }

    /// Release the capture
    pub fn close(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            if let Err(e) = capture.release() {
                warn!("Failed to release camera {}: {}", self.device, e);
            }
        }
    }

    /// Switch to another device, reopening if a capture was open
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Camera::open`].
    pub fn set_device(&mut self, device: impl Into<String>) -> Result<()> {
        self.device = device.into();
        if self.capture.is_some() {
            self.open()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.capture
            .as_ref()
            .is_some_and(|capture| capture.is_opened().unwrap_or(false))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(DEFAULT_DEVICE)
    }
}

impl FrameSource for Camera {
    fn read(&mut self) -> Option<Mat> {
        let capture = self.capture.as_mut()?;
        let mut frame = Mat::default();
        match capture.read(&mut frame) {
            Ok(true) if !frame.empty() => Some(frame),
            Ok(_) => None,
            Err(e) => {
                warn!("Failed to read frame from {}: {}", self.device, e);
                None
            }
        }
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        self.close();
    }
}
