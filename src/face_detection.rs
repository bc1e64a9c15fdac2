use crate::{
    constants::{DETECT_MIN_FACE_SIZE, DETECT_MIN_NEIGHBORS, DETECT_SCALE_FACTOR},
    error::{Error, Result},
};
use log::{debug, info};
use opencv::core::{Mat, Rect, Size, Vector};
use opencv::imgproc;
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use std::path::Path;

/// Face bounding box in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FaceRegion {
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Area used to rank competing candidates
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Center point, using integer halves of the size
    #[must_use]
    pub const fn center(&self) -> (i64, i64) {
        (
            self.x as i64 + (self.width / 2) as i64,
            self.y as i64 + (self.height / 2) as i64,
        )
    }

    /// Convert a detector rectangle, clamping negative components to zero
    #[must_use]
    #[allow(clippy::cast_sign_loss)] // Components are clamped non-negative first
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            x: rect.x.max(0) as u32,
            y: rect.y.max(0) as u32,
            width: rect.width.max(0) as u32,
            height: rect.height.max(0) as u32,
        }
    }

    /// Rectangle for drawing, saturating at `i32::MAX`
    #[must_use]
    pub fn to_rect(&self) -> Rect {
        let cast = |v: u32| i32::try_from(v).unwrap_or(i32::MAX);
        Rect::new(cast(self.x), cast(self.y), cast(self.width), cast(self.height))
    }
}

/// Anything that can find a face in a BGR frame.
///
/// Implementations hold only fixed configuration: the same frame always gives
/// the same answer.
pub trait FaceDetect {
    /// Largest face in `frame`, or `None` when there is none
    ///
    /// # Errors
    ///
    /// Returns an error when the underlying detection primitive fails.
    fn detect(&mut self, frame: &Mat) -> Result<Option<FaceRegion>>;
}

/// Pick the largest-area candidate; on equal area the earliest one wins
#[must_use]
pub fn select_largest<I>(candidates: I) -> Option<FaceRegion>
where
    I: IntoIterator<Item = FaceRegion>,
{
    candidates.into_iter().fold(None, |best, candidate| match best {
        Some(current) if current.area() >= candidate.area() => Some(current),
        _ => Some(candidate),
    })
}

/// Frontal-face Haar cascade detector
pub struct HaarFaceDetector {
    classifier: CascadeClassifier,
    scale_factor: f64,
    min_neighbors: i32,
    min_size: Size,
}

impl HaarFaceDetector {
    /// Load a cascade from an `OpenCV` XML file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Detector`] if the file is missing or is not a cascade.
    pub fn new<P: AsRef<Path>>(cascade_path: P) -> Result<Self> {
        let path = cascade_path.as_ref();
        if !path.exists() {
            return Err(Error::Detector(format!("Cascade file not found: {}", path.display())));
        }

        let path_str = path
            .to_str()
            .ok_or_else(|| Error::Detector(format!("Cascade path is not UTF-8: {}", path.display())))?;
        let classifier = CascadeClassifier::new(path_str)?;
        if classifier.empty()? {
            return Err(Error::Detector(format!("Failed to load cascade: {}", path.display())));
        }

        info!("Loaded face cascade from {}", path.display());

        Ok(Self {
            classifier,
            scale_factor: DETECT_SCALE_FACTOR,
            min_neighbors: DETECT_MIN_NEIGHBORS,
            min_size: Size::new(DETECT_MIN_FACE_SIZE, DETECT_MIN_FACE_SIZE),
        })
    }
}

impl FaceDetect for HaarFaceDetector {
    fn detect(&mut self, frame: &Mat) -> Result<Option<FaceRegion>> {
        if frame.empty() {
            return Ok(None);
        }

        let mut gray = Mat::default();
        imgproc::cvt_color(frame, &mut gray, imgproc::COLOR_BGR2GRAY, 0)?;

        let mut faces = Vector::<Rect>::new();
        self.classifier.detect_multi_scale(
            &gray,
            &mut faces,
            self.scale_factor,
            self.min_neighbors,
            0,
            self.min_size,
            Size::new(0, 0),
        )?;

        debug!("Cascade returned {} candidate(s)", faces.len());

        Ok(select_largest(faces.iter().map(FaceRegion::from_rect)))
    }
}
