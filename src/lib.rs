#[macro_use]
mod logger;
pub mod cnt_regs;
pub mod config;
pub mod counter_model;
pub mod driver;
pub mod error;
pub mod junit;
pub mod monitor;
pub mod prelude;
pub mod report;
pub mod scoreboard;
pub mod script;
pub mod sequencer;
pub mod signal;
pub mod sim_if;
pub mod testbench;
pub mod transaction;
pub mod utils;
pub mod watchdog;
pub mod wave;

pub use logger::{TbLogger, Verbosity};

pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
