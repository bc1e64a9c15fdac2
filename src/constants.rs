//! Constants used throughout the application

/// A named, ranged integer hardware control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlSpec {
    /// `v4l2-ctl` control name
    pub name: &'static str,
    /// Label shown in the preview window
    pub label: &'static str,
    /// UI group the control belongs to
    pub group: ControlGroup,
    /// Smallest accepted value
    pub min: i32,
    /// Largest accepted value
    pub max: i32,
    /// Factory default
    pub default: i32,
    /// Granularity of user adjustments
    pub step: i32,
}

impl ControlSpec {
    /// Clamp a value into this control's range
    #[must_use]
    pub fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min, self.max)
    }

    /// Controls with a range of exactly 0..=1 are toggles, not sliders
    #[must_use]
    pub const fn is_toggle(&self) -> bool {
        self.min == 0 && self.max == 1
    }

    /// The other state of a toggle, starting from `current` or the default
    #[must_use]
    pub fn toggled(&self, current: Option<i32>) -> i32 {
        if current.unwrap_or(self.default) == self.min {
            self.max
        } else {
            self.min
        }
    }
}

/// Tabs the controls are grouped into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlGroup {
    /// Pan, tilt and zoom
    Ptz,
    /// Picture adjustments
    Image,
    /// Focus behaviour
    Focus,
}

impl ControlGroup {
    /// All groups, in display order
    pub const ALL: [Self; 3] = [Self::Ptz, Self::Image, Self::Focus];

    /// Heading shown for the group
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Ptz => "PTZ",
            Self::Image => "Image",
            Self::Focus => "Focus",
        }
    }
}

/// Pan control name
pub const PAN_CONTROL: &str = "pan_absolute";

/// Tilt control name
pub const TILT_CONTROL: &str = "tilt_absolute";

/// Continuous autofocus toggle name
pub const AUTOFOCUS_CONTROL: &str = "focus_automatic_continuous";

/// Static control table, in display order
pub const CONTROLS: [ControlSpec; 8] = [
    ControlSpec { name: "zoom_absolute", label: "Zoom", group: ControlGroup::Ptz, min: 0, max: 100, default: 50, step: 1 },
    ControlSpec { name: PAN_CONTROL, label: "Pan", group: ControlGroup::Ptz, min: -648_000, max: 648_000, default: 0, step: 3600 },
    ControlSpec { name: TILT_CONTROL, label: "Tilt", group: ControlGroup::Ptz, min: -648_000, max: 648_000, default: 0, step: 3600 },
    ControlSpec { name: "brightness", label: "Brightness", group: ControlGroup::Image, min: 0, max: 100, default: 50, step: 1 },
    ControlSpec { name: "contrast", label: "Contrast", group: ControlGroup::Image, min: 0, max: 100, default: 60, step: 1 },
    ControlSpec { name: "saturation", label: "Saturation", group: ControlGroup::Image, min: 0, max: 100, default: 50, step: 1 },
    ControlSpec { name: "sharpness", label: "Sharpness", group: ControlGroup::Image, min: 0, max: 100, default: 50, step: 1 },
    ControlSpec { name: AUTOFOCUS_CONTROL, label: "Autofocus", group: ControlGroup::Focus, min: 0, max: 1, default: 1, step: 1 },
];

/// Pan entry of [`CONTROLS`]
pub const PAN_SPEC: ControlSpec = CONTROLS[1];

/// Tilt entry of [`CONTROLS`]
pub const TILT_SPEC: ControlSpec = CONTROLS[2];

/// Look up a control by its `v4l2-ctl` name
#[must_use]
pub fn control_spec(name: &str) -> Option<&'static ControlSpec> {
    CONTROLS.iter().find(|spec| spec.name == name)
}

/// Controls belonging to one group, in display order
pub fn controls_in_group(group: ControlGroup) -> impl Iterator<Item = &'static ControlSpec> {
    CONTROLS.iter().filter(move |spec| spec.group == group)
}

/// Pixels from frame center before tracking reacts
pub const DEADZONE_PX: i32 = 30;

/// Exponential smoothing factor for the face offset (0-1)
pub const TRACK_SPEED: f64 = 0.3;

/// Smallest pan/tilt delta, in hardware units, worth sending to the device
pub const HYSTERESIS_THRESHOLD: i32 = 100;

/// Default pan units per unit of normalized offset
pub const DEFAULT_PAN_RANGE: i32 = 36_000;

/// Default tilt units per unit of normalized offset
pub const DEFAULT_TILT_RANGE: i32 = 36_000;

/// Haar cascade scale step between pyramid levels
pub const DETECT_SCALE_FACTOR: f64 = 1.1;

/// Neighbouring hits a candidate needs to be kept
pub const DETECT_MIN_NEIGHBORS: i32 = 5;

/// Smallest face, in pixels, the detector reports
pub const DETECT_MIN_FACE_SIZE: i32 = 60;

/// Requested capture size
pub const CAPTURE_WIDTH: i32 = 640;
pub const CAPTURE_HEIGHT: i32 = 360;

/// Preview size
pub const PREVIEW_WIDTH: i32 = 320;
pub const PREVIEW_HEIGHT: i32 = 180;

/// Default video device
pub const DEFAULT_DEVICE: &str = "/dev/video0";

/// Name of the preset that always exists
pub const DEFAULT_PRESET: &str = "Default";

/// `v4l2-ctl` timeout for get/set requests, in milliseconds
pub const CONTROL_TIMEOUT_MS: u64 = 2_000;

/// `v4l2-ctl` timeout for enumeration requests, in milliseconds
pub const LIST_TIMEOUT_MS: u64 = 5_000;
