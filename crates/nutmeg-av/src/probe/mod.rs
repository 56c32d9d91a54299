//! Media inspection via ffprobe.
//!
//! [`Inspect`] is the [`Launchable`](crate::Launchable) that asks ffprobe for
//! container and stream metadata as JSON and turns it into a
//! [`ProbeReport`] whose values are coerced to numbers where possible.
//! [`Inspector`] runs the same inspection synchronously for nested use.

mod coerce;
mod ffprobe;
mod types;

pub use coerce::{coerce, coerce_record};
pub use ffprobe::{Inspect, FFPROBE};
pub use types::{ProbeReport, Record};

use crate::{Resolver, Result, Supervisor};
use std::path::Path;

/// Inspect a media file and wait for the report.
///
/// # Example
///
/// ```no_run
/// use nutmeg_av::{probe, Resolver};
///
/// let report = probe::probe("/path/to/video.mp4", &Resolver::from_env())?;
/// println!("{} streams", report.num_streams());
/// # Ok::<(), nutmeg_av::Error>(())
/// ```
pub fn probe(path: impl AsRef<Path>, resolver: &Resolver) -> Result<ProbeReport> {
    run_inspection(FFPROBE, path.as_ref(), resolver)
}

/// Synchronous inspection with a chosen ffprobe.
///
/// Used by actions that inspect their input and output once they finish.
/// The tool name goes through the resolver, so an existing absolute path is
/// used as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inspector {
    resolver: Resolver,
    tool: String,
}

impl Inspector {
    /// Inspect with `ffprobe` found through `resolver`.
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver,
            tool: FFPROBE.to_string(),
        }
    }

    /// Use `tool` (a name or a path) instead of `ffprobe`.
    pub fn tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = tool.into();
        self
    }

    /// The ffprobe name or path handed to the resolver.
    pub fn tool_name(&self) -> &str {
        &self.tool
    }

    /// Inspect `path` and wait for the report.
    pub fn probe(&self, path: impl AsRef<Path>) -> Result<ProbeReport> {
        run_inspection(&self.tool, path.as_ref(), &self.resolver)
    }
}

impl From<Resolver> for Inspector {
    fn from(resolver: Resolver) -> Self {
        Self::new(resolver)
    }
}

fn run_inspection(tool: &str, path: &Path, resolver: &Resolver) -> Result<ProbeReport> {
    let mut supervisor = Supervisor::new(tool, resolver, Inspect::new())?;
    supervisor.run(path.to_path_buf())?;
    supervisor
        .into_result()?
        .ok_or_else(|| crate::Error::transformation(FFPROBE, "no output captured"))
}
