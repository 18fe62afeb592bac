use std::path::PathBuf;

use crate::counter_model::FaultConfig;
use crate::error::{TbError, TbResult};
use crate::logger::Verbosity;

pub const WAVE_FILENAME: &str = "logs/waves.vcd";
/// Reset is released and the program may start after this many time steps.
pub const END_OF_RESET_TIME: u64 = 5;
pub const MAX_SIM_CYCLES: u64 = 2_000_000;
/// Cycles a program step may take before the run is aborted.
pub const WATCHDOG_TIMEOUT: u32 = 100;
/// Cycles between end of test and end of simulation.
pub const END_OF_TEST_TIMEOUT: u32 = 10;

#[derive(Clone, Debug)]
pub struct TbConfig {
    pub log_level: Verbosity,
    pub gen_waves: bool,
    pub wave_path: PathBuf,
    pub seed: u64,
    pub max_cycles: u64,
    pub watchdog_timeout: u32,
    pub end_of_test_timeout: u32,
    /// End the test once the scoreboard reports a mismatch or fault.
    pub stop_on_mismatch: bool,
    pub faults: FaultConfig,
}

impl Default for TbConfig {
    fn default() -> Self {
        Self {
            log_level: Verbosity::default(),
            gen_waves: false,
            wave_path: PathBuf::from(WAVE_FILENAME),
            seed: 0,
            max_cycles: MAX_SIM_CYCLES,
            watchdog_timeout: WATCHDOG_TIMEOUT,
            end_of_test_timeout: END_OF_TEST_TIMEOUT,
            stop_on_mismatch: true,
            faults: FaultConfig::default(),
        }
    }
}

impl TbConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Reject values that cannot describe a run.
    pub fn validate(&self) -> TbResult<()> {
        if !(0.0..=1.0).contains(&self.faults.stall_prob) {
            return Err(TbError::InvalidOption {
                option: "stall_prob",
                value: self.faults.stall_prob.to_string(),
            });
        }
        if self.faults.drop_read_every == Some(0) {
            return Err(TbError::InvalidOption {
                option: "drop_read_every",
                value: "0".to_string(),
            });
        }
        if self.max_cycles == 0 {
            return Err(TbError::InvalidOption {
                option: "max_cycles",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// "true" and "1" enable, anything else disables.
pub fn parse_flag(s: &str) -> bool {
    matches!(s.to_ascii_lowercase().as_str(), "true" | "1")
}
