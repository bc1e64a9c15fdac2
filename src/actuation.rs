//! Pan/tilt actuation.
//!
//! Turns tracker deltas into absolute pan/tilt positions: deltas below the
//! hysteresis threshold are dropped, the rest are added to the cached
//! position, clamped to the hardware range and written through the gateway.

use crate::{
    constants::{DEFAULT_PAN_RANGE, DEFAULT_TILT_RANGE, HYSTERESIS_THRESHOLD, PAN_SPEC, TILT_SPEC},
    error::{Error, Result},
    utils::safe_cast::add_clamped,
    v4l2::ControlGateway,
    values::CurrentValues,
};
use log::{debug, warn};

/// Absolute pan/tilt target produced from one tracker delta
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanTiltMove {
    /// Delta that produced this move
    pub delta: (i32, i32),
    /// New absolute pan position
    pub pan: i32,
    /// New absolute tilt position
    pub tilt: i32,
}

/// Outcome of writing a [`PanTiltMove`] to the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitResult {
    pub pan_ok: bool,
    pub tilt_ok: bool,
}

impl CommitResult {
    #[must_use]
    pub const fn all_ok(&self) -> bool {
        self.pan_ok && self.tilt_ok
    }
}

/// True when either axis moves by more than the hysteresis threshold
#[must_use]
pub const fn exceeds_hysteresis(delta: (i32, i32)) -> bool {
    delta.0.unsigned_abs() > HYSTERESIS_THRESHOLD.unsigned_abs()
        || delta.1.unsigned_abs() > HYSTERESIS_THRESHOLD.unsigned_abs()
}

/// Maps tracker deltas onto the pan/tilt controls
#[derive(Debug, Clone, Copy)]
pub struct PanTiltActuator {
    pan_range: i32,
    tilt_range: i32,
}

impl PanTiltActuator {
    /// Create an actuator with the given offset-to-units scale per axis
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for non-positive ranges.
    pub fn new(pan_range: i32, tilt_range: i32) -> Result<Self> {
        if pan_range <= 0 || tilt_range <= 0 {
            return Err(Error::InvalidInput(format!(
                "Pan/tilt ranges must be positive, got {pan_range}/{tilt_range}"
            )));
        }

        Ok(Self { pan_range, tilt_range })
    }

    /// Pan units per unit of normalized offset
    #[must_use]
    pub const fn pan_range(&self) -> i32 {
        self.pan_range
    }

    /// Tilt units per unit of normalized offset
    #[must_use]
    pub const fn tilt_range(&self) -> i32 {
        self.tilt_range
    }

    /// Absolute target for `delta`, or `None` when it is within hysteresis.
    ///
    /// Positions missing from `values` are treated as 0.
    #[must_use]
    pub fn plan(&self, values: &CurrentValues, delta: (i32, i32)) -> Option<PanTiltMove> {
        if !exceeds_hysteresis(delta) {
            debug!("Delta {:?} within hysteresis, discarded", delta);
            return None;
        }

        let current_pan = values.get_or_zero(PAN_SPEC.name);
        let current_tilt = values.get_or_zero(TILT_SPEC.name);

        Some(PanTiltMove {
            delta,
            pan: add_clamped(current_pan, delta.0, PAN_SPEC.min, PAN_SPEC.max),
            tilt: add_clamped(current_tilt, delta.1, TILT_SPEC.min, TILT_SPEC.max),
        })
    }

    /// Write pan then tilt and record both in `values`.
    ///
    /// The cache is updated even when a write fails; there is no read-back.
    pub fn commit<G: ControlGateway + ?Sized>(
        &self,
        gateway: &mut G,
        values: &mut CurrentValues,
        target: &PanTiltMove,
    ) -> CommitResult {
        let pan_ok = gateway.set(PAN_SPEC.name, target.pan);
        let tilt_ok = gateway.set(TILT_SPEC.name, target.tilt);

        if !pan_ok {
            warn!("Failed to set {} to {}", PAN_SPEC.name, target.pan);
        }
        if !tilt_ok {
            warn!("Failed to set {} to {}", TILT_SPEC.name, target.tilt);
        }

        values.insert(PAN_SPEC.name, target.pan);
        values.insert(TILT_SPEC.name, target.tilt);

        CommitResult { pan_ok, tilt_ok }
    }
}

impl Default for PanTiltActuator {
    fn default() -> Self {
        Self {
            pan_range: DEFAULT_PAN_RANGE,
            tilt_range: DEFAULT_TILT_RANGE,
        }
    }
}
