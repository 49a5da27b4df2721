//! DPI profile selection and profile-count configuration.
//!
//! Every request is range-checked before it reaches the device. A rejected
//! request never touches the device; an accepted one is written and the
//! device's failure text, if any, is passed through unchanged.
//!
//! # Bounds
//! - **Profile index**: `0..=profile_count - 1`, where `profile_count` is read
//!   from the device right before the check.
//! - **Profile count**: `1..=6`, fixed by the hardware.

use crate::device::Device;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Minimum number of DPI profiles.
pub const PROFILE_COUNT_MIN: i32 = 1;
/// Maximum number of DPI profiles the Z2 can store.
pub const PROFILE_COUNT_MAX: i32 = 6;

/// Check a profile index against the device's current profile count.
pub fn validate_profile_index(index: i32, device_profile_count: i32) -> Result<i32> {
    let max = device_profile_count.saturating_sub(1);
    if index < 0 || index > max {
        return Err(Error::OutOfRange {
            field: "profile",
            value: index.into(),
            min: 0,
            max: max.into(),
        });
    }
    Ok(index)
}

/// Check a profile count against the hardware limits.
pub fn validate_profile_count(count: i32) -> Result<i32> {
    if !(PROFILE_COUNT_MIN..=PROFILE_COUNT_MAX).contains(&count) {
        return Err(Error::OutOfRange {
            field: "profile count",
            value: count.into(),
            min: PROFILE_COUNT_MIN.into(),
            max: PROFILE_COUNT_MAX.into(),
        });
    }
    Ok(count)
}

/// Validate and write a profile selection.
///
/// `device_profile_count` is the count the device reported for this
/// invocation; it is not re-read here.
pub fn select_profile(
    device: &mut dyn Device,
    index: i32,
    device_profile_count: i32,
) -> Result<i32> {
    let index = validate_profile_index(index, device_profile_count).inspect_err(|e| {
        warn!(index, device_profile_count, "Profile selection rejected: {e}");
    })?;

    device.write_profile_selection(index).map_err(|text| {
        warn!(index, error = %text, "Device failed profile selection");
        Error::Device(text)
    })?;

    info!(index, "Active profile set");
    Ok(index)
}

/// Validate and write a profile count.
pub fn set_profile_count(device: &mut dyn Device, count: i32) -> Result<i32> {
    let count = validate_profile_count(count).inspect_err(|e| {
        warn!(count, "Profile count rejected: {e}");
    })?;

    device.write_profile_count(count).map_err(|text| {
        warn!(count, error = %text, "Device failed profile count write");
        Error::Device(text)
    })?;

    info!(count, "Profile count set");
    Ok(count)
}

/// Changes requested in a single invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRequest {
    /// Profile index to activate.
    pub profile: Option<i32>,
    /// Number of profiles to configure.
    pub profile_count: Option<i32>,
}

impl ProfileRequest {
    pub fn is_empty(&self) -> bool {
        self.profile.is_none() && self.profile_count.is_none()
    }
}

/// What to do with the remaining change once one has failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Abort the invocation at the first failure.
    #[default]
    StopOnFirstFailure,
    /// Attempt every requested change regardless of earlier failures.
    ContinueOnFailure,
}

/// Result of one requested change.
#[derive(Debug)]
pub enum StepOutcome {
    Applied(i32),
    Failed(Error),
    /// Not attempted because an earlier change failed.
    Skipped,
}

impl StepOutcome {
    fn from_result(result: Result<i32>) -> Self {
        match result {
            Ok(v) => Self::Applied(v),
            Err(e) => Self::Failed(e),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Per-change outcomes of [`apply`]. `None` means the change was not requested.
#[derive(Debug, Default)]
pub struct ApplyReport {
    pub profile: Option<StepOutcome>,
    pub profile_count: Option<StepOutcome>,
}

impl ApplyReport {
    pub fn is_success(&self) -> bool {
        [&self.profile, &self.profile_count]
            .into_iter()
            .flatten()
            .all(|step| matches!(step, StepOutcome::Applied(_)))
    }

    /// Collapse into the first failure, in application order.
    pub fn into_result(self) -> Result<()> {
        for step in [self.profile, self.profile_count].into_iter().flatten() {
            if let StepOutcome::Failed(e) = step {
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Apply a request: profile selection first, then profile count.
///
/// The selection is checked against the profile count the device reports
/// before the count change of the same request is written.
pub fn apply(
    device: &mut dyn Device,
    request: &ProfileRequest,
    policy: FailurePolicy,
) -> ApplyReport {
    debug!(?request, ?policy, "Applying profile request");
    let mut report = ApplyReport::default();

    if let Some(index) = request.profile {
        let result = match device.query_profile_count() {
            Ok(count) => select_profile(device, index, count),
            Err(e) => Err(e),
        };
        report.profile = Some(StepOutcome::from_result(result));
    }

    if let Some(count) = request.profile_count {
        let halted = policy == FailurePolicy::StopOnFirstFailure
            && report.profile.as_ref().is_some_and(StepOutcome::is_failure);
        report.profile_count = Some(if halted {
            debug!(count, "Skipping profile count after earlier failure");
            StepOutcome::Skipped
        } else {
            StepOutcome::from_result(set_profile_count(device, count))
        });
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery::BatterySample;
    use crate::device::{SimulatedDevice, Write};

    fn device(profile_count: i32) -> SimulatedDevice {
        let battery = BatterySample {
            overflow: 0,
            charging: false,
            voltage: 0x0F00,
        };
        SimulatedDevice::new(battery, profile_count)
    }

    #[test]
    fn validate_profile_index_in_range() {
        for i in 0..6 {
            assert_eq!(validate_profile_index(i, 6).unwrap(), i);
        }
    }

    #[test]
    fn validate_profile_index_out_of_range() {
        assert!(validate_profile_index(-1, 6).is_err());
        assert!(validate_profile_index(6, 6).is_err());
        assert!(validate_profile_index(100, 6).is_err());
    }

    #[test]
    fn validate_profile_index_reports_inclusive_range() {
        let err = validate_profile_index(6, 6).unwrap_err();
        assert!(matches!(
            err,
            Error::OutOfRange {
                min: 0,
                max: 5,
                value: 6,
                ..
            }
        ));
        assert_eq!(err.to_string(), "profile 6 not in range of 0-5");
    }

    #[test]
    fn validate_profile_count_bounds() {
        for n in 1..=6 {
            assert_eq!(validate_profile_count(n).unwrap(), n);
        }
        assert!(validate_profile_count(0).is_err());
        assert!(validate_profile_count(7).is_err());
        assert!(validate_profile_count(-3).is_err());
    }

    #[test]
    fn validate_profile_count_reports_fixed_bounds() {
        let err = validate_profile_count(7).unwrap_err();
        assert_eq!(err.to_string(), "profile count 7 not in range of 1-6");
    }

    #[test]
    fn select_profile_writes_accepted_index() {
        let mut dev = device(6);
        assert_eq!(select_profile(&mut dev, 5, 6).unwrap(), 5);
        assert_eq!(dev.active_profile, 5);
        assert_eq!(dev.writes(), &[Write::ProfileSelection(5)]);
    }

    #[test]
    fn select_profile_rejection_skips_device() {
        let mut dev = device(6);
        assert!(select_profile(&mut dev, 6, 6).is_err());
        assert!(select_profile(&mut dev, -1, 6).is_err());
        assert!(dev.writes().is_empty());
    }

    #[test]
    fn select_profile_surfaces_device_text() {
        let mut dev = device(6).failing_writes("write failed");
        let err = select_profile(&mut dev, 2, 6).unwrap_err();
        assert!(matches!(&err, Error::Device(text) if text == "write failed"));
    }

    #[test]
    fn set_profile_count_writes_accepted_count() {
        let mut dev = device(1);
        assert_eq!(set_profile_count(&mut dev, 6).unwrap(), 6);
        assert_eq!(dev.profile_count, 6);
    }

    #[test]
    fn set_profile_count_rejection_skips_device() {
        let mut dev = device(1);
        assert!(set_profile_count(&mut dev, 0).is_err());
        assert!(set_profile_count(&mut dev, 7).is_err());
        assert!(dev.writes().is_empty());
    }

    #[test]
    fn set_profile_count_surfaces_device_text() {
        let mut dev = device(1).failing_writes("EEPROM busy");
        let err = set_profile_count(&mut dev, 3).unwrap_err();
        assert_eq!(err.to_string(), "EEPROM busy");
    }

    #[test]
    fn empty_request_applies_nothing() {
        let mut dev = device(3);
        let request = ProfileRequest::default();
        assert!(request.is_empty());
        let report = apply(&mut dev, &request, FailurePolicy::default());
        assert!(report.profile.is_none());
        assert!(report.profile_count.is_none());
        assert!(report.is_success());
        assert!(dev.writes().is_empty());
    }

    #[test]
    fn failure_policy_serializes_kebab_case() {
        let json = serde_json::to_string(&FailurePolicy::ContinueOnFailure).unwrap();
        assert_eq!(json, "\"continue-on-failure\"");
    }
}
