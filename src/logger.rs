use std::fmt;
use std::str::FromStr;

use crate::error::TbError;

/// Testbench verbosity. A message tagged with level `l` is shown when the
/// configured level is `l` or above.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Low,
    #[default]
    Medium,
    High,
    Full,
    Debug,
}

impl Verbosity {
    /// Directive for the tracing subscriber so that debug-tagged messages
    /// survive the global filter.
    pub fn tracing_directive(&self) -> &'static str {
        match self {
            Verbosity::Debug => "debug",
            _ => "info",
        }
    }
}

impl FromStr for Verbosity {
    type Err = TbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        match lower.strip_prefix("log_").unwrap_or(&lower) {
            "low" | "0" => Ok(Verbosity::Low),
            "medium" | "1" => Ok(Verbosity::Medium),
            "high" | "2" => Ok(Verbosity::High),
            "full" | "3" => Ok(Verbosity::Full),
            "debug" | "4" => Ok(Verbosity::Debug),
            _ => Err(TbError::InvalidOption {
                option: "log_level",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verbosity::Low => "low",
            Verbosity::Medium => "medium",
            Verbosity::High => "high",
            Verbosity::Full => "full",
            Verbosity::Debug => "debug",
        };
        f.write_str(s)
    }
}

/// Verbosity-filtered front end to `tracing`. Cheap to copy into every
/// component. Errors and warnings bypass the filter.
#[derive(Clone, Copy, Debug, Default)]
pub struct TbLogger {
    level: Verbosity,
}

impl TbLogger {
    pub fn new(level: Verbosity) -> Self {
        Self { level }
    }

    pub fn level(&self) -> Verbosity {
        self.level
    }

    #[inline]
    pub fn enabled(&self, lvl: Verbosity) -> bool {
        lvl <= self.level
    }

    pub fn log(&self, lvl: Verbosity, msg: fmt::Arguments<'_>) {
        if !self.enabled(lvl) {
            return;
        }
        match lvl {
            Verbosity::Debug => tracing::debug!("{}", msg),
            _ => tracing::info!("{}", msg),
        }
    }

    pub fn success(&self, lvl: Verbosity, msg: fmt::Arguments<'_>) {
        if self.enabled(lvl) {
            tracing::info!(status = "ok", "{}", msg);
        }
    }

    pub fn warn(&self, msg: fmt::Arguments<'_>) {
        tracing::warn!("{}", msg);
    }

    pub fn error(&self, msg: fmt::Arguments<'_>) {
        tracing::error!("{}", msg);
    }
}

#[macro_export]
macro_rules! tb_log {
    ($logger:expr, $lvl:expr, $($arg:tt)+) => {
        $logger.log($lvl, format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! tb_success {
    ($logger:expr, $lvl:expr, $($arg:tt)+) => {
        $logger.success($lvl, format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! tb_warn {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warn(format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! tb_err {
    ($logger:expr, $($arg:tt)+) => {
        $logger.error(format_args!($($arg)+))
    };
}
