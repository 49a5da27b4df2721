//! Battery voltage to percentage calibration.
//!
//! The Z2 reports a combined cell voltage as a raw 16-bit value. The
//! percentage is derived from an empirically measured discharge curve of
//! 21 control points, with linear interpolation between neighbours.
//!
//! Integer division truncates toward zero, matching the quantization the
//! device firmware itself shows. Values are never rounded.

use crate::device::Device;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A fixed `(voltage, percentage)` anchor on the discharge curve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationPoint {
    pub voltage: u16,
    pub percentage: u8,
}

const fn point(voltage: u16, percentage: u8) -> CalibrationPoint {
    CalibrationPoint {
        voltage,
        percentage,
    }
}

/// Discharge curve, ordered by strictly increasing voltage.
pub const CALIBRATION_CURVE: [CalibrationPoint; 21] = [
    point(0x0C7A, 0),
    point(0x0D16, 2),
    point(0x0D7A, 5),
    point(0x0DAC, 8),
    point(0x0DDE, 11),
    point(0x0E01, 15),
    point(0x0E1A, 18),
    point(0x0E28, 21),
    point(0x0E39, 23),
    point(0x0E4E, 28),
    point(0x0E60, 33),
    point(0x0E74, 39),
    point(0x0E92, 46),
    point(0x0EB0, 52),
    point(0x0ED8, 59),
    point(0x0F0A, 66),
    point(0x0F46, 73),
    point(0x0F8C, 80),
    point(0x0FDC, 87),
    point(0x1022, 93),
    point(0x1072, 100),
];

/// Map a raw voltage reading to a battery percentage.
///
/// Readings above the last control point saturate at 100. Readings below the
/// first control point are interpolated along the first segment and are not
/// clamped, so a very low reading can produce a negative value.
pub fn percentage_of(voltage: u16) -> i32 {
    let v = i32::from(voltage);

    for pair in CALIBRATION_CURVE.windows(2) {
        let (lower, upper) = (pair[0], pair[1]);
        if upper.voltage < voltage {
            continue;
        }

        let (lo_v, hi_v) = (i32::from(lower.voltage), i32::from(upper.voltage));
        let (lo_p, hi_p) = (i32::from(lower.percentage), i32::from(upper.percentage));
        return lo_p + ((hi_p - lo_p) * (v - lo_v)) / (hi_v - lo_v);
    }

    i32::from(CALIBRATION_CURVE[CALIBRATION_CURVE.len() - 1].percentage)
}

/// Raw battery telemetry as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatterySample {
    /// Reserved by the firmware.
    #[serde(default)]
    pub overflow: u8,
    pub charging: bool,
    /// Combined cell voltage reading.
    pub voltage: u16,
}

impl BatterySample {
    pub fn percentage(&self) -> i32 {
        percentage_of(self.voltage)
    }
}

/// Interpreted battery state, ready for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BatteryStatus {
    pub percentage: i32,
    pub charging: bool,
    pub voltage: u16,
}

impl From<BatterySample> for BatteryStatus {
    fn from(sample: BatterySample) -> Self {
        Self {
            percentage: sample.percentage(),
            charging: sample.charging,
            voltage: sample.voltage,
        }
    }
}

/// Query a battery sample from the device and interpret it.
pub fn read_battery(device: &mut dyn Device) -> Result<BatteryStatus> {
    let sample = device.query_battery()?;
    let status = BatteryStatus::from(sample);
    debug!(
        voltage = format_args!("0x{:04X}", sample.voltage),
        charging = sample.charging,
        percentage = status.percentage,
        "Battery sample"
    );
    Ok(status)
}
