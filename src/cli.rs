use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "nutmeg")]
#[command(author, version, about = "Run ffprobe/ffmpeg jobs and report their results")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Stop a tool that runs longer than this many seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe a media file and display container and stream information
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Transcode a video to an all-intra H.264 intermediate for editing
    Intra {
        /// Input video
        #[arg(required = true)]
        input: PathBuf,

        /// Inspect input and output when done
        #[arg(long)]
        inspect: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract a clip between two times without re-encoding
    Clip {
        /// Input video
        #[arg(required = true)]
        input: PathBuf,

        /// Start time in seconds
        #[arg(long, default_value_t = 0.0)]
        start: f64,

        /// Stop time in seconds
        #[arg(long)]
        stop: Option<f64>,

        /// Clip length in seconds (takes precedence over --stop)
        #[arg(long)]
        duration: Option<f64>,

        /// Inspect input and output when done
        #[arg(long)]
        inspect: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show which executable a tool name resolves to
    Resolve {
        /// Logical tool name, e.g. ffprobe
        name: String,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
