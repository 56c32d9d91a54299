//! Error types for nutmeg-av.

use std::path::PathBuf;
use std::process::ExitStatus;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while supervising an external tool.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The logical executable name could not be mapped to a runnable path.
    #[error("executable not found: {name}")]
    Resolution { name: String },

    /// The resolved path exists but cannot be executed.
    #[error("not an executable file: {}", path.display())]
    NotExecutable { path: PathBuf },

    /// An operation was requested with missing or invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The OS refused or failed to start the process.
    #[error("failed to launch {}: {message}", executable.display())]
    Launch { executable: PathBuf, message: String },

    /// The process exited with a non-zero status.
    #[error("{tool} exited with {status}: {stderr}")]
    ProcessFailed {
        tool: String,
        status: ExitStatus,
        stderr: String,
    },

    /// Captured output could not be interpreted.
    #[error("failed to interpret {tool} output: {message}")]
    Transformation { tool: String, message: String },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a resolution error.
    pub fn resolution(name: impl Into<String>) -> Self {
        Self::Resolution { name: name.into() }
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a launch error.
    pub fn launch(executable: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Launch {
            executable: executable.into(),
            message: message.into(),
        }
    }

    /// Create a transformation error.
    pub fn transformation(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transformation {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Whether this error is a resolution failure at construction time.
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution { .. } | Self::NotExecutable { .. })
    }
}

/// Cached copy of a failed outcome.
///
/// `std::io::Error` is not `Clone`, so I/O failures are folded into their
/// message when an outcome is replayed.
impl Clone for Error {
    fn clone(&self) -> Self {
        match self {
            Self::Resolution { name } => Self::Resolution { name: name.clone() },
            Self::NotExecutable { path } => Self::NotExecutable { path: path.clone() },
            Self::Configuration(msg) => Self::Configuration(msg.clone()),
            Self::Launch {
                executable,
                message,
            } => Self::Launch {
                executable: executable.clone(),
                message: message.clone(),
            },
            Self::ProcessFailed {
                tool,
                status,
                stderr,
            } => Self::ProcessFailed {
                tool: tool.clone(),
                status: *status,
                stderr: stderr.clone(),
            },
            Self::Transformation { tool, message } => Self::Transformation {
                tool: tool.clone(),
                message: message.clone(),
            },
            Self::Io(e) => Self::Io(std::io::Error::new(e.kind(), e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::resolution("ffprobe");
        assert_eq!(err.to_string(), "executable not found: ffprobe");

        let err = Error::configuration("command not defined");
        assert_eq!(err.to_string(), "configuration error: command not defined");

        let err = Error::launch("/usr/bin/ffmpeg", "permission denied");
        assert_eq!(
            err.to_string(),
            "failed to launch /usr/bin/ffmpeg: permission denied"
        );

        let err = Error::transformation("ffprobe", "missing `format`");
        assert_eq!(
            err.to_string(),
            "failed to interpret ffprobe output: missing `format`"
        );
    }

    #[test]
    fn test_is_resolution() {
        assert!(Error::resolution("x").is_resolution());
        assert!(Error::NotExecutable {
            path: PathBuf::from("/tmp/x")
        }
        .is_resolution());
        assert!(!Error::configuration("x").is_resolution());
    }

    #[test]
    fn test_clone_io_keeps_kind() {
        let err = Error::from(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "pipe closed",
        ));
        match err.clone() {
            Error::Io(e) => {
                assert_eq!(e.kind(), std::io::ErrorKind::BrokenPipe);
                assert!(e.to_string().contains("pipe closed"));
            }
            other => panic!("unexpected clone: {other:?}"),
        }
    }
}
