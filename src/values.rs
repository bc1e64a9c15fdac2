//! Cache of last-known control values mirrored with the hardware.

use crate::{constants::CONTROLS, v4l2::ControlGateway};
use log::{debug, info};
use std::collections::BTreeMap;

/// Control name -> last-known value.
///
/// Seeded from the device at startup and updated on every write, whether the
/// write came from the user or from the tracking loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentValues {
    values: BTreeMap<String, i32>,
}

impl CurrentValues {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read every known control from `gateway`. Controls that cannot be read
    /// are left out.
    pub fn seed_from<G: ControlGateway + ?Sized>(gateway: &G) -> Self {
        let mut values = Self::new();
        for spec in &CONTROLS {
            match gateway.get(spec.name) {
                Some(value) => values.insert(spec.name, value),
                None => debug!("Could not read {} from device", spec.name),
            }
        }
        info!("Read {} of {} controls from device", values.len(), CONTROLS.len());
        values
    }

    #[must_use]
    pub fn get(&self, control: &str) -> Option<i32> {
        self.values.get(control).copied()
    }

    /// Value of `control`, or 0 if it has never been read or written
    #[must_use]
    pub fn get_or_zero(&self, control: &str) -> i32 {
        self.get(control).unwrap_or(0)
    }

    pub fn insert(&mut self, control: &str, value: i32) {
        self.values.insert(control.to_string(), value);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i32)> {
        self.values.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Owned snapshot, e.g. for saving as a preset
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<String, i32> {
        self.values.clone()
    }
}
