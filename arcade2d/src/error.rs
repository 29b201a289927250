use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced while building or driving an [`ArcadeScene`](crate::ArcadeScene).
///
/// Gameplay hiccups (removing a gone entity, unknown contact pairs, backwards
/// timestamps) are not errors; they are absorbed by the loop.
#[derive(Debug, Error)]
pub enum ArcadeError {
    #[error("invalid scene config: `{field}` {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("scene has not been set up; call `did_move` first")]
    NotSetUp,

    #[error("scene config I/O failed for {}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scene config")]
    ParseConfig(#[from] serde_json::Error),
}

impl ArcadeError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ArcadeError>;
