//! zaocfg-core: battery calibration and DPI profile configuration for the
//! Zaopin Z2 mouse.
//!
//! The HID transport is an external collaborator reached through
//! [`device::Device`]. This crate holds the logic on top of it: turning raw
//! voltage readings into a battery percentage, and validating profile
//! changes before they are written.

pub mod battery;
pub mod device;
pub mod error;
pub mod profile;
