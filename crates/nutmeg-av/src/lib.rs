//! # nutmeg-av
//!
//! Supervision of external media tools.
//!
//! This crate provides functionality for:
//! - Resolving tool names (ffprobe, ffmpeg) to executables on a search path
//! - Launching a tool in the background and polling, waiting on or killing it
//! - Capturing its output once after exit and interpreting it as typed data
//! - Inspecting media files, transcoding to an all-intra intermediate and
//!   trimming clips
//!
//! ## Features
//!
//! - `probe` (default) - Media inspection via ffprobe
//! - `transcode` (default) - Intra transcode and trim via ffmpeg
//! - `tracing` - Enable tracing support
//!
//! ## Example
//!
//! ```no_run
//! use nutmeg_av::{Resolver, Supervisor, Trim, TrimRequest};
//!
//! let resolver = Resolver::from_env();
//! let mut clip = Supervisor::new("ffmpeg", &resolver, Trim::new())?;
//! clip.run(TrimRequest::new("/path/to/video.mp4", 1.0).duration(2.5))?;
//!
//! while clip.is_running() {
//!     std::thread::sleep(std::time::Duration::from_millis(100));
//! }
//!
//! if let Some(report) = clip.result()? {
//!     println!("wrote {}", report.output.display());
//! }
//! # Ok::<(), nutmeg_av::Error>(())
//! ```

pub mod capture;
mod error;
pub mod supervisor;
pub mod tools;

#[cfg(feature = "probe")]
pub mod probe;

#[cfg(feature = "transcode")]
pub mod actions;

// Re-exports
pub use capture::CapturedOutput;
pub use error::{Error, Result};
pub use supervisor::{Launchable, ProcessState, Supervisor};
pub use tools::{check_tool, check_tools, Resolver, ToolInfo};

#[cfg(feature = "probe")]
pub use probe::{probe, Inspect, Inspector, ProbeReport, Record};

#[cfg(feature = "transcode")]
pub use actions::{intra, Intra, TranscodeReport, Trim, TrimRequest};
