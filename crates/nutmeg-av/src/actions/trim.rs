//! Stream-copy trimming of a time range.

use super::{derive_output_path, finish, require_input, TranscodeReport, FFMPEG};
use crate::capture::CapturedOutput;
use crate::probe::Inspector;
use crate::supervisor::Launchable;
use crate::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// A time range to cut out of an input file, in seconds.
///
/// The end is either an explicit stop time or a duration from the start;
/// when both are given the duration wins.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimRequest {
    /// File to trim.
    pub input: PathBuf,
    /// Start of the range.
    pub time_start: f64,
    /// Explicit end of the range.
    pub time_stop: Option<f64>,
    /// Length of the range.
    pub duration: Option<f64>,
}

impl TrimRequest {
    /// Start a request at `time_start` with no end yet.
    pub fn new(input: impl Into<PathBuf>, time_start: f64) -> Self {
        Self {
            input: input.into(),
            time_start,
            time_stop: None,
            duration: None,
        }
    }

    /// End the range at `time_stop`.
    pub fn stop(mut self, time_stop: f64) -> Self {
        self.time_stop = Some(time_stop);
        self
    }

    /// End the range `duration` seconds after the start.
    pub fn duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }

    /// The effective stop time.
    ///
    /// # Errors
    ///
    /// [`Error::Configuration`] if neither stop nor duration is set, or if
    /// the range is not a finite, non-empty interval starting at or after 0.
    pub fn effective_stop(&self) -> Result<f64> {
        let stop = match (self.duration, self.time_stop) {
            (Some(duration), _) => self.time_start + duration,
            (None, Some(stop)) => stop,
            (None, None) => {
                return Err(Error::configuration(
                    "must specify at least one of `time_stop` or `duration`",
                ))
            }
        };

        if !self.time_start.is_finite() || !stop.is_finite() || self.time_start < 0.0 {
            return Err(Error::configuration(format!(
                "invalid time range: {} to {}",
                self.time_start, stop
            )));
        }

        if stop <= self.time_start {
            return Err(Error::configuration(format!(
                "stop time {stop} must be after start time {}",
                self.time_start
            )));
        }

        Ok(stop)
    }
}

/// Output name for a range: `<name>.clip-<start>-<stop>.mp4`, two decimals.
pub fn trim_output_path(input: &Path, time_start: f64, time_stop: f64) -> PathBuf {
    derive_output_path(input, &format!(".clip-{time_start:.2}-{time_stop:.2}.mp4"))
}

/// Extract a clip between two times without re-encoding.
#[derive(Debug, Clone, Default)]
pub struct Trim {
    paths: Option<(PathBuf, PathBuf)>,
    inspect_with: Option<Inspector>,
}

impl Trim {
    /// Create a trim action.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect input and output once the trim finishes.
    ///
    /// Accepts a [`Resolver`](crate::Resolver) (inspecting with `ffprobe`) or an
    /// [`Inspector`] naming a specific ffprobe.
    pub fn inspect_with(mut self, inspector: impl Into<Inspector>) -> Self {
        self.inspect_with = Some(inspector.into());
        self
    }

    /// Output path of the most recently built command.
    pub fn output(&self) -> Option<&Path> {
        self.paths.as_ref().map(|(_, out)| out.as_path())
    }
}

impl Launchable for Trim {
    type Request = TrimRequest;
    type Output = TranscodeReport;

    fn build_command(&mut self, request: TrimRequest) -> Result<Vec<OsString>> {
        let time_stop = request.effective_stop()?;
        require_input(&request.input)?;

        let output = trim_output_path(&request.input, request.time_start, time_stop);

        let mut args: Vec<OsString> = ["-y", "-hide_banner", "-loglevel", "warning", "-i"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(request.input.clone().into_os_string());
        args.extend(
            [
                "-codec:a".to_string(),
                "copy".to_string(),
                "-codec:v".to_string(),
                "copy".to_string(),
                "-ss".to_string(),
                request.time_start.to_string(),
                "-to".to_string(),
                time_stop.to_string(),
            ]
            .into_iter()
            .map(OsString::from),
        );
        args.push(output.clone().into_os_string());

        self.paths = Some((request.input, output));
        Ok(args)
    }

    fn transform(&mut self, _captured: &CapturedOutput) -> Result<TranscodeReport> {
        let (input, output) = self
            .paths
            .as_ref()
            .ok_or_else(|| Error::transformation(FFMPEG, "no output path recorded"))?;
        finish(input, output, self.inspect_with.as_ref())
    }
}
