//! Captured process output.

use serde::Serialize;

/// Standard output and standard error of a finished process, as lines.
///
/// Lines are split on `\n` and then on `\r`, so progress output that
/// overwrites itself in place (as ffmpeg's encoder status does) becomes a
/// sequence of discrete lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CapturedOutput {
    /// Lines written to standard output.
    pub stdout: Vec<String>,
    /// Lines written to standard error.
    pub stderr: Vec<String>,
}

impl CapturedOutput {
    /// Build captured output from raw stream bytes (lossy UTF-8).
    pub fn from_raw(stdout: &[u8], stderr: &[u8]) -> Self {
        Self {
            stdout: split_lines(&String::from_utf8_lossy(stdout)),
            stderr: split_lines(&String::from_utf8_lossy(stderr)),
        }
    }

    /// Standard output lines joined with a single space.
    pub fn stdout_text(&self) -> String {
        self.stdout.join(" ")
    }

    /// The last `n` non-empty stderr lines, newline separated.
    pub fn stderr_tail(&self, n: usize) -> String {
        let lines: Vec<&str> = self
            .stderr
            .iter()
            .map(|l| l.trim_end())
            .filter(|l| !l.is_empty())
            .collect();
        let start = lines.len().saturating_sub(n);
        lines[start..].join("\n")
    }
}

/// Split text on `\n`, then each piece on `\r`.
///
/// Interior empty lines are preserved; an empty piece left behind by a
/// trailing terminator is not.
pub fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for line in text.split_terminator('\n') {
        if line.is_empty() {
            lines.push(String::new());
            continue;
        }
        lines.extend(line.split_terminator('\r').map(str::to_string));
    }
    lines
}
