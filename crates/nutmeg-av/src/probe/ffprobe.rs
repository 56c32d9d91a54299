//! FFprobe invocation and output parsing.

use super::coerce::coerce_record;
use super::types::{ProbeReport, Record};
use crate::capture::CapturedOutput;
use crate::supervisor::Launchable;
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Logical executable name of ffprobe.
pub const FFPROBE: &str = "ffprobe";

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    format: Map<String, Value>,
    streams: Vec<Map<String, Value>>,
}

/// Query a media file for container and stream metadata.
#[derive(Debug, Clone, Default)]
pub struct Inspect {
    input: Option<PathBuf>,
}

impl Inspect {
    /// Create an inspection with no input yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Input of the most recently built command.
    pub fn input(&self) -> Option<&Path> {
        self.input.as_deref()
    }
}

impl Launchable for Inspect {
    type Request = PathBuf;
    type Output = ProbeReport;

    fn build_command(&mut self, input: PathBuf) -> Result<Vec<OsString>> {
        if !input.is_file() {
            return Err(Error::configuration(format!(
                "input file not found: {}",
                input.display()
            )));
        }

        let mut args: Vec<OsString> = [
            "-hide_banner",
            "-show_format",
            "-show_streams",
            "-print_format",
            "json",
            "-i",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(input.clone().into_os_string());

        self.input = Some(input);
        Ok(args)
    }

    fn transform(&mut self, captured: &CapturedOutput) -> Result<ProbeReport> {
        parse_probe_output(&captured.stdout_text())
    }
}

/// Parse ffprobe's `-print_format json` document into a [`ProbeReport`].
///
/// The document must contain a `format` object and a `streams` array of
/// objects. Every top-level value is coerced with [`super::coerce`].
pub fn parse_probe_output(text: &str) -> Result<ProbeReport> {
    let output: FfprobeOutput = serde_json::from_str(text)
        .map_err(|e| Error::transformation(FFPROBE, e.to_string()))?;

    Ok(ProbeReport {
        container: Record::new(coerce_record(output.format)),
        streams: output
            .streams
            .into_iter()
            .map(|s| Record::new(coerce_record(s)))
            .collect(),
    })
}
