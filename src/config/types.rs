use nutmeg_av::{Inspector, Resolver};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub supervisor: SupervisorConfig,
}

impl Config {
    /// Build the executable resolver, falling back to the environment for
    /// anything not configured.
    pub fn resolver(&self) -> Resolver {
        let env = Resolver::from_env();

        let resolver = match &self.resolver.search_path {
            Some(paths) => Resolver::new(paths.iter().cloned()),
            None => Resolver::new(env.search_path().iter().cloned()),
        };

        match &self.resolver.extensions {
            Some(exts) => resolver.with_extensions(exts),
            None => resolver.with_extensions(env.extensions()),
        }
    }

    /// Nested inspection using the configured ffprobe.
    pub fn inspector(&self) -> Inspector {
        Inspector::new(self.resolver()).tool(self.tool_name("ffprobe"))
    }

    /// Name handed to the resolver for `tool`.
    ///
    /// A configured path that exists is used literally; otherwise the tool
    /// is looked up by its logical name.
    pub fn tool_name(&self, tool: &str) -> String {
        let configured = match tool {
            "ffmpeg" => self.tools.ffmpeg_path.as_deref(),
            "ffprobe" => self.tools.ffprobe_path.as_deref(),
            _ => None,
        };

        match configured {
            Some(path) if path.is_file() => path.to_string_lossy().into_owned(),
            Some(path) => {
                tracing::warn!(
                    "Configured {} path {:?} does not exist, searching PATH",
                    tool,
                    path
                );
                tool.to_string()
            }
            None => tool.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Directories searched for tools, in order (default: `PATH`)
    #[serde(default)]
    pub search_path: Option<Vec<PathBuf>>,

    /// Recognized executable extensions (default: `PATHEXT` on Windows)
    #[serde(default)]
    pub extensions: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SupervisorConfig {
    /// Log process lifecycle events at info level
    #[serde(default)]
    pub verbose: bool,

    /// Kill a tool that runs longer than this (default: no limit)
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// How often to poll a running tool, in milliseconds (default: 100)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Inspect input and output files after a transcode or clip
    #[serde(default)]
    pub inspect_outputs: bool,
}

fn default_poll_interval_ms() -> u64 {
    100
}

impl SupervisorConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            timeout_secs: None,
            poll_interval_ms: default_poll_interval_ms(),
            inspect_outputs: false,
        }
    }
}
