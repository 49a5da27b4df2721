//! zaocfg CLI: battery readout and DPI profile configuration for the Z2.

use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use zaocfg_core::battery::{self, BatteryStatus};
use zaocfg_core::device::SimulatedDevice;
use zaocfg_core::profile::{self, FailurePolicy, ProfileRequest, StepOutcome};

#[derive(Parser)]
#[command(
    name = "zaocfg",
    version,
    about = "Zaopin Z2 battery and DPI profile configuration"
)]
struct Cli {
    /// Show the battery percentage.
    #[arg(short, long)]
    battery: bool,

    /// Set the active profile (0 to profile count - 1).
    #[arg(short = 'p', long, value_name = "INDEX", allow_negative_numbers = true)]
    set_profile: Option<i32>,

    /// Set the number of DPI profiles (1-6).
    #[arg(
        long,
        visible_alias = "pc",
        value_name = "COUNT",
        allow_negative_numbers = true
    )]
    set_profile_count: Option<i32>,

    /// Still attempt the profile count change if the profile change failed.
    #[arg(long)]
    continue_on_error: bool,

    /// Print a JSON report instead of text.
    #[arg(long)]
    json: bool,

    /// Device state document backing the Z2.
    #[arg(long, env = "ZAOCFG_DEVICE", default_value = "z2.json")]
    device_file: PathBuf,
}

impl Cli {
    fn request(&self) -> ProfileRequest {
        ProfileRequest {
            profile: self.set_profile,
            profile_count: self.set_profile_count,
        }
    }

    fn policy(&self) -> FailurePolicy {
        if self.continue_on_error {
            FailurePolicy::ContinueOnFailure
        } else {
            FailurePolicy::StopOnFirstFailure
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
enum StepJson {
    Applied { value: i32 },
    Failed { error: String },
    Skipped,
}

impl From<&StepOutcome> for StepJson {
    fn from(step: &StepOutcome) -> Self {
        match step {
            StepOutcome::Applied(value) => Self::Applied { value: *value },
            StepOutcome::Failed(e) => Self::Failed {
                error: e.to_string(),
            },
            StepOutcome::Skipped => Self::Skipped,
        }
    }
}

#[derive(Serialize)]
struct ReportJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    battery: Option<BatteryStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<StepJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile_count: Option<StepJson>,
}

fn print_step(step: &StepOutcome, applied: impl Fn(i32) -> String) {
    match step {
        StepOutcome::Applied(value) => println!("{}", applied(*value)),
        StepOutcome::Failed(e) => eprintln!("ERROR: {e}"),
        StepOutcome::Skipped => {}
    }
}

fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut device = SimulatedDevice::open(&cli.device_file)?;

    let battery = if cli.battery {
        Some(battery::read_battery(&mut device)?)
    } else {
        None
    };

    let report = profile::apply(&mut device, &cli.request(), cli.policy());

    if cli.json {
        let json = ReportJson {
            battery,
            profile: report.profile.as_ref().map(StepJson::from),
            profile_count: report.profile_count.as_ref().map(StepJson::from),
        };
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        if let Some(status) = &battery {
            println!("Battery: {}%", status.percentage);
        }
        if let Some(step) = &report.profile {
            print_step(step, |v| format!("Set profile to {v}"));
        }
        if let Some(step) = &report.profile_count {
            print_step(step, |v| format!("Set profile count to {v}"));
        }
    }

    if report.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
