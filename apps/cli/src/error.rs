//! # CLI Error Type
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ConfigError ──┐                                                       │
//! │  DbError ──────┼──► CliError ──► "error: ..." on stderr + exit code    │
//! │  serde_json ───┘                                                       │
//! │                                                                         │
//! │  Exit codes: 1 = rejected command (fix the input and retry)            │
//! │              2 = bad configuration                                     │
//! │              3 = storage failure                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use stockbook_db::DbError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] DbError),

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Store(err) if err.is_user_error() => 1,
            CliError::Config(_) => 2,
            _ => 3,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
