use thiserror::Error;

/// Setup and I/O failures. Faults observed during a run are not errors; they
/// are counted by the scoreboard and end up in the verdict.
#[derive(Debug, Error)]
pub enum TbError {
    #[error("invalid value '{value}' for option '{option}'")]
    InvalidOption { option: &'static str, value: String },
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("report generation failed: {0}")]
    Report(String),
}

pub type TbResult<T> = Result<T, TbError>;
