//! All-intra H.264 transcode.

use super::{derive_output_path, finish, require_input, TranscodeReport, FFMPEG};
use crate::capture::CapturedOutput;
use crate::probe::Inspector;
use crate::supervisor::{Launchable, Supervisor};
use crate::{Error, Resolver, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Suffix replacing the input's extension in the output name.
pub const INTRA_SUFFIX: &str = ".intra.mp4";

/// Encoder settings for an every-frame-is-a-keyframe intermediate.
#[rustfmt::skip]
const ENCODE_ARGS: &[&str] = &[
    "-codec:a", "aac",
    "-codec:v", "libx264",
    "-tune", "fastdecode",
    "-preset", "ultrafast",
    "-pix_fmt", "yuvj420p",
    "-crf", "23",
    "-partitions", "all",
    "-direct-pred", "auto",
    "-psy", "0",
    "-g", "0",
    "-keyint_min", "0",
    "-x264opts", "filler",
    "-x264opts", "colorprim=bt709",
    "-x264opts", "transfer=bt709",
    "-x264opts", "colormatrix=bt709",
    "-x264opts", "force-cfr",
    "-movflags", "+faststart+rtphint+disable_chpl+separate_moof+default_base_moof",
];

/// Convert a video into an intermediate format suitable for editing.
///
/// The output is written next to the input as `<name>.intra.mp4`.
#[derive(Debug, Clone, Default)]
pub struct Intra {
    paths: Option<(PathBuf, PathBuf)>,
    inspect_with: Option<Inspector>,
}

impl Intra {
    /// Create a transcode action.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect input and output once the transcode finishes.
    ///
    /// Accepts a [`Resolver`] (inspecting with `ffprobe`) or an
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

impl Launchable for Intra {
    type Request = PathBuf;
    type Output = TranscodeReport;

    fn build_command(&mut self, input: PathBuf) -> Result<Vec<OsString>> {
        require_input(&input)?;
        let output = derive_output_path(&input, INTRA_SUFFIX);

        let mut args: Vec<OsString> = ["-y", "-hide_banner", "-loglevel", "info", "-i"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(input.clone().into_os_string());
        args.extend(ENCODE_ARGS.iter().copied().map(OsString::from));
        args.push(output.clone().into_os_string());

        self.paths = Some((input, output));
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

/// Transcode `input` and wait for the report.
pub fn intra(input: impl AsRef<Path>, resolver: &Resolver) -> Result<TranscodeReport> {
    let mut supervisor = Supervisor::new(FFMPEG, resolver, Intra::new()).map(|s| s.verbose(true))?;
    supervisor.run(input.as_ref().to_path_buf())?;
    supervisor
        .into_result()?
        .ok_or_else(|| Error::transformation(FFMPEG, "no output captured"))
}
