use {std::path::PathBuf, thiserror::Error};

/// Failures that decide how the process exits.
///
/// Everything except [`ReleaseError::UserCancelled`] terminates the run with
/// status 1. Stages wrap these in `anyhow` context; the binary downcasts to
/// find out which one it got.
#[derive(Debug, Error)]
pub enum ReleaseError {
    #[error("invalid release configuration {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("{file}: {message}")]
    ConfigFormat { file: PathBuf, message: String },

    #[error("`{command}` failed ({status}): {stderr}")]
    ExternalCommand {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("{what} not found: {path}")]
    MissingArtifact { what: &'static str, path: PathBuf },

    #[error("cancelled by user")]
    UserCancelled,
}

impl ReleaseError {
    pub fn config_format(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ConfigFormat {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn is_cancelled(err: &anyhow::Error) -> bool {
        err.chain().any(|cause| {
            matches!(
                cause.downcast_ref::<ReleaseError>(),
                Some(ReleaseError::UserCancelled)
            )
        })
    }
}
