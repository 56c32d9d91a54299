//! External tool resolution and detection.
//!
//! The [`Resolver`] maps a logical executable name (e.g. `ffprobe`) to a
//! runnable path. Its search path and extension list are plain data so that
//! resolution is deterministic and can be tested without touching the real
//! environment; [`Resolver::from_env`] builds one from `PATH`/`PATHEXT`.

use crate::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Tools the specialized supervisors rely on, with their version flag.
const KNOWN_TOOLS: &[(&str, &str)] = &[("ffmpeg", "-version"), ("ffprobe", "-version")];

/// Maps logical executable names to filesystem paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolver {
    search_path: Vec<PathBuf>,
    extensions: Vec<String>,
}

impl Resolver {
    /// Create a resolver over an explicit, ordered list of directories.
    pub fn new<I, P>(search_path: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_path: search_path.into_iter().map(Into::into).collect(),
            extensions: Vec::new(),
        }
    }

    /// Set the recognized executable extensions (e.g. `.exe`, `.bat`).
    ///
    /// Extensions are compared case-insensitively and a missing leading dot
    /// is added.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| normalize_extension(e.as_ref()))
            .filter(|e| e.len() > 1)
            .collect();
        self
    }

    /// Build a resolver from the process environment.
    ///
    /// Uses `PATH` for the search path and, on Windows, `PATHEXT` for the
    /// extension list.
    pub fn from_env() -> Self {
        let search_path = std::env::var_os("PATH")
            .map(|p| std::env::split_paths(&p).collect::<Vec<_>>())
            .unwrap_or_default();

        let resolver = Self::new(search_path);

        if cfg!(windows) {
            let pathext = std::env::var_os("PATHEXT")
                .unwrap_or_else(|| OsString::from(".COM;.EXE;.BAT;.CMD"));
            let pathext = pathext.to_string_lossy().into_owned();
            resolver.with_extensions(pathext.split(';'))
        } else {
            resolver
        }
    }

    /// Ordered directories searched by [`resolve`](Self::resolve).
    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    /// Recognized executable extensions, lowercased with a leading dot.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Resolve a logical name to a path, or `None` if nothing matches.
    ///
    /// For each candidate extension in order, the name is first tried
    /// literally and then joined onto each search directory in order. The
    /// first existing file wins.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }

        for ext in self.candidate_extensions(name) {
            let exec_name = format!("{name}{ext}");

            let literal = Path::new(&exec_name);
            if literal.is_file() {
                return Some(literal.to_path_buf());
            }

            for dir in &self.search_path {
                let candidate = dir.join(&exec_name);
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }

        None
    }

    /// Resolve a name and require the result to be executable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Resolution`] if the name is not found and
    /// [`Error::NotExecutable`] if the match cannot be executed.
    pub fn require(&self, name: &str) -> Result<PathBuf> {
        let path = self.resolve(name).ok_or_else(|| Error::resolution(name))?;

        if !is_executable(&path) {
            return Err(Error::NotExecutable { path });
        }

        Ok(path)
    }

    fn candidate_extensions(&self, name: &str) -> Vec<&str> {
        if self.extensions.is_empty() {
            return vec![""];
        }

        let has_known_ext = Path::new(name)
            .extension()
            .map(|e| normalize_extension(&e.to_string_lossy()))
            .is_some_and(|e| self.extensions.contains(&e));

        if has_known_ext {
            vec![""]
        } else {
            self.extensions.iter().map(String::as_str).collect()
        }
    }
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{ext}")
    }
}

/// Whether `path` is a regular file the current user may execute.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Whether `path` is a regular file the current user may execute.
#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Information about an external tool.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolInfo {
    /// Name of the tool.
    pub name: String,
    /// Whether the tool is available.
    pub available: bool,
    /// Version string if available.
    pub version: Option<String>,
    /// Path to the tool executable.
    pub path: Option<PathBuf>,
}

/// Check if a tool resolves and report its version.
///
/// The version is the first line of stdout from `<tool> <version_arg>`.
pub fn check_tool(resolver: &Resolver, name: &str, version_arg: &str) -> ToolInfo {
    let Ok(path) = resolver.require(name) else {
        return ToolInfo {
            name: name.to_string(),
            available: false,
            version: None,
            path: None,
        };
    };

    let version = Command::new(&path)
        .arg(version_arg)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| {
            String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|s| s.to_string())
        });

    ToolInfo {
        name: name.to_string(),
        available: true,
        version,
        path: Some(path),
    }
}

/// Check ffmpeg and ffprobe.
pub fn check_tools(resolver: &Resolver) -> Vec<ToolInfo> {
    KNOWN_TOOLS
        .iter()
        .map(|&(name, version_arg)| check_tool(resolver, name, version_arg))
        .collect()
}
