//! Device interface and a simulated Z2 backend.
//!
//! The HID transport is provided by an external collaborator. The core only
//! talks to it through [`Device`], borrowing the handle for the duration of a
//! call. [`SimulatedDevice`] implements the same interface from a JSON state
//! document so that the CLI and tests can run without hardware.

use crate::battery::BatterySample;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Z2 product name as used in user-facing messages.
pub const Z2_NAME: &str = "Z2";

/// Request/response interface of the device collaborator.
///
/// Write failures carry the device's diagnostic text as-is.
pub trait Device {
    /// Read a raw battery sample.
    fn query_battery(&mut self) -> Result<BatterySample>;

    /// Current number of configured DPI profiles.
    fn query_profile_count(&mut self) -> Result<i32>;

    /// Make `index` the active DPI profile.
    fn write_profile_selection(&mut self, index: i32) -> std::result::Result<(), String>;

    /// Set the number of DPI profiles the device cycles through.
    fn write_profile_count(&mut self, count: i32) -> std::result::Result<(), String>;
}

/// A write the simulated device has received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Write {
    ProfileSelection(i32),
    ProfileCount(i32),
}

/// In-memory Z2 with the same observable behavior as the firmware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedDevice {
    pub battery: BatterySample,
    pub profile_count: i32,
    #[serde(default)]
    pub active_profile: i32,
    /// When set, every write fails with this text.
    #[serde(default)]
    pub write_error: Option<String>,
    /// When set, battery and capability queries fail as if unplugged.
    #[serde(default)]
    pub unreachable: bool,
    #[serde(skip)]
    writes: Vec<Write>,
}

impl SimulatedDevice {
    pub fn new(battery: BatterySample, profile_count: i32) -> Self {
        Self {
            battery,
            profile_count,
            active_profile: 0,
            write_error: None,
            unreachable: false,
            writes: Vec::new(),
        }
    }

    /// Make every subsequent write fail with `text`.
    pub fn failing_writes(mut self, text: impl Into<String>) -> Self {
        self.write_error = Some(text.into());
        self
    }

    /// Parse a device-state document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::DeviceState(e.to_string()))
    }

    /// Load a device-state document from disk.
    ///
    /// A missing file means the device is not present.
    pub fn open(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            debug!(path = %path.display(), error = %e, "Device state not readable");
            Error::DeviceUnavailable(format!("{Z2_NAME} not found"))
        })?;
        let device = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            profile_count = device.profile_count,
            "Opened simulated device"
        );
        Ok(device)
    }

    /// Writes received so far, oldest first.
    pub fn writes(&self) -> &[Write] {
        &self.writes
    }

    fn check_reachable(&self) -> Result<()> {
        if self.unreachable {
            return Err(Error::DeviceUnavailable(format!("{Z2_NAME} not found")));
        }
        Ok(())
    }

    fn check_write(&mut self, write: Write) -> std::result::Result<(), String> {
        self.writes.push(write);
        match &self.write_error {
            Some(text) => Err(text.clone()),
            None => Ok(()),
        }
    }
}

impl Device for SimulatedDevice {
    fn query_battery(&mut self) -> Result<BatterySample> {
        self.check_reachable()?;
        Ok(self.battery)
    }

    fn query_profile_count(&mut self) -> Result<i32> {
        self.check_reachable()?;
        Ok(self.profile_count)
    }

    fn write_profile_selection(&mut self, index: i32) -> std::result::Result<(), String> {
        self.check_write(Write::ProfileSelection(index))?;
        self.active_profile = index;
        Ok(())
    }

    fn write_profile_count(&mut self, count: i32) -> std::result::Result<(), String> {
        self.check_write(Write::ProfileCount(count))?;
        self.profile_count = count;
        // Firmware falls back to the last remaining profile.
        self.active_profile = self.active_profile.min(count - 1);
        Ok(())
    }
}
