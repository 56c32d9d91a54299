//! ffmpeg-backed actions that produce a new file next to their input.
//!
//! - [`Intra`]: transcode to an all-intra H.264 intermediate for editing
//! - [`Trim`]: cut a time range out of a file without re-encoding
//!
//! Both verify after exit that the declared output exists and can embed
//! nested inspection reports of their input and output.

mod intra;
mod trim;

pub use intra::{intra, Intra, INTRA_SUFFIX};
pub use trim::{Trim, TrimRequest};

use crate::probe::{Inspector, ProbeReport};
use crate::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Logical executable name of ffmpeg.
pub const FFMPEG: &str = "ffmpeg";

/// Record describing a file produced by an action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscodeReport {
    /// Path of the produced file.
    pub output: PathBuf,
    /// Inspection of the input, when nested inspection is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_probe: Option<ProbeReport>,
    /// Inspection of the output, when nested inspection is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_probe: Option<ProbeReport>,
}

/// Output path next to `input`: its path without extension plus `suffix`.
///
/// ```
/// use std::path::{Path, PathBuf};
/// use nutmeg_av::actions::derive_output_path;
///
/// assert_eq!(
///     derive_output_path(Path::new("/videos/GOPR6248.MP4"), ".intra.mp4"),
///     PathBuf::from("/videos/GOPR6248.intra.mp4")
/// );
/// ```
pub fn derive_output_path(input: &Path, suffix: &str) -> PathBuf {
    let mut path = input.with_extension("").into_os_string();
    path.push(suffix);
    PathBuf::from(path)
}

/// Require `input` to be an existing file before anything is launched.
fn require_input(input: &Path) -> Result<()> {
    if input.is_file() {
        Ok(())
    } else {
        Err(Error::configuration(format!(
            "input file not found: {}",
            input.display()
        )))
    }
}

/// Check that `output` now exists and build the report.
///
/// With an inspector, input and output are inspected synchronously.
fn finish(input: &Path, output: &Path, inspect_with: Option<&Inspector>) -> Result<TranscodeReport> {
    if !output.is_file() {
        return Err(Error::transformation(
            FFMPEG,
            format!("output file not found: {}", output.display()),
        ));
    }

    let (input_probe, output_probe) = match inspect_with {
        Some(inspector) => (
            Some(inspector.probe(input)?),
            Some(inspector.probe(output)?),
        ),
        None => (None, None),
    };

    Ok(TranscodeReport {
        output: output.to_path_buf(),
        input_probe,
        output_probe,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_derive_output_path_keeps_directory() {
        assert_eq!(
            derive_output_path(Path::new("a/b/clip.mov"), ".clip-1.00-3.50.mp4"),
            PathBuf::from("a/b/clip.clip-1.00-3.50.mp4")
        );
    }

    #[test]
    fn test_derive_output_path_without_extension() {
        assert_eq!(
            derive_output_path(Path::new("raw"), ".intra.mp4"),
            PathBuf::from("raw.intra.mp4")
        );
    }

    #[test]
    fn test_derive_output_path_only_last_extension() {
        assert_eq!(
            derive_output_path(Path::new("take.1.mp4"), ".intra.mp4"),
            PathBuf::from("take.1.intra.mp4")
        );
    }

    #[test]
    fn test_finish_missing_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        std::fs::write(&input, b"").unwrap();

        let err = finish(&input, &dir.path().join("out.mp4"), None).unwrap_err();
        assert!(matches!(err, Error::Transformation { .. }));
    }

    #[test]
    fn test_finish_without_inspection() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.mp4");
        let output = dir.path().join("out.mp4");
        std::fs::write(&input, b"").unwrap();
        std::fs::write(&output, b"").unwrap();

        let report = finish(&input, &output, None).unwrap();
        assert_eq!(report.output, output);
        assert!(report.input_probe.is_none());
        assert!(report.output_probe.is_none());
    }

    #[test]
    fn test_require_input() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            require_input(&dir.path().join("missing.mp4")),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            require_input(dir.path()),
            Err(Error::Configuration(_))
        ));
    }
}
