//! Lifecycle supervision of one external process.
//!
//! A [`Supervisor`] owns a single external tool invocation: it launches the
//! process without blocking, answers liveness queries, and on the first call
//! to [`Supervisor::result`] captures the process's entire stdout/stderr and
//! hands it to the [`Launchable`] capability for interpretation. The
//! interpreted value is cached until the next launch.
//!
//! # Example
//!
//! ```no_run
//! use nutmeg_av::{Inspect, Resolver, Supervisor};
//!
//! let resolver = Resolver::from_env();
//! let mut probe = Supervisor::new("ffprobe", &resolver, Inspect::new())?;
//! probe.run("/path/to/video.mp4".into())?;
//!
//! // ... do other work while ffprobe runs ...
//!
//! if let Some(report) = probe.result()? {
//!     println!("{} streams", report.num_streams());
//! }
//! # Ok::<(), nutmeg_av::Error>(())
//! ```

use crate::capture::CapturedOutput;
use crate::tools::Resolver;
use crate::{Error, Result};
use std::ffi::OsString;
use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

/// Number of stderr lines kept in a [`Error::ProcessFailed`] message.
const STDERR_TAIL_LINES: usize = 5;

/// Emit a lifecycle event at `info` when verbose, `debug` otherwise.
macro_rules! lifecycle {
    ($verbose:expr, $($arg:tt)+) => {
        #[cfg(feature = "tracing")]
        {
            if $verbose {
                tracing::info!($($arg)+);
            } else {
                tracing::debug!($($arg)+);
            }
        }
        #[cfg(not(feature = "tracing"))]
        {
            let _ = $verbose;
        }
    };
}

/// A tool invocation the [`Supervisor`] can drive.
///
/// Implementors validate a request and turn it into an argument vector, and
/// later interpret the captured output of the finished process.
pub trait Launchable {
    /// Input to [`build_command`](Self::build_command).
    type Request;
    /// Typed value produced from captured output.
    type Output;

    /// Validate `request` and build the arguments passed to the executable.
    ///
    /// Any error returned here prevents a launch; validation failures should
    /// be reported as [`Error::Configuration`].
    fn build_command(&mut self, request: Self::Request) -> Result<Vec<OsString>>;

    /// Interpret the captured output of a successfully exited process.
    fn transform(&mut self, captured: &CapturedOutput) -> Result<Self::Output>;
}

/// Observable lifecycle state of a [`Supervisor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// No command and no process.
    Idle,
    /// A command is set but nothing has been launched.
    Armed,
    /// The process is alive.
    Running,
    /// The process has exited; output may or may not be captured yet.
    Exited,
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessState::Idle => write!(f, "idle"),
            ProcessState::Armed => write!(f, "armed"),
            ProcessState::Running => write!(f, "running"),
            ProcessState::Exited => write!(f, "exited"),
        }
    }
}

/// Thread draining one output pipe into memory.
type Reader = JoinHandle<io::Result<Vec<u8>>>;

/// A launched OS process plus the threads draining its pipes.
struct Handle {
    child: Child,
    stdout: Option<Reader>,
    stderr: Option<Reader>,
}

impl Handle {
    /// Join both readers, even if the first one failed.
    fn collect_output(&mut self) -> io::Result<CapturedOutput> {
        let (stdout, stderr) = (self.stdout.take(), self.stderr.take());
        let stdout = join_reader(stdout);
        let stderr = join_reader(stderr);
        Ok(CapturedOutput::from_raw(&stdout?, &stderr?))
    }
}

fn spawn_reader<R>(name: &str, pipe: Option<R>) -> io::Result<Option<Reader>>
where
    R: Read + Send + 'static,
{
    let Some(mut pipe) = pipe else {
        return Ok(None);
    };

    let handle = thread::Builder::new()
        .name(format!("nutmeg-{name}"))
        .spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf)?;
            Ok(buf)
        })?;

    Ok(Some(handle))
}

fn spawn_readers(child: &mut Child) -> io::Result<(Option<Reader>, Option<Reader>)> {
    let stdout = spawn_reader("stdout", child.stdout.take())?;
    let stderr = spawn_reader("stderr", child.stderr.take())?;
    Ok((stdout, stderr))
}

fn join_reader(handle: Option<Reader>) -> io::Result<Vec<u8>> {
    match handle {
        Some(h) => h
            .join()
            .map_err(|_| io::Error::other("output reader thread panicked"))?,
        None => Ok(Vec::new()),
    }
}

/// Capture state for the current launch.
enum Capture<T> {
    Pending,
    Captured {
        output: CapturedOutput,
        status: ExitStatus,
        outcome: Result<T>,
    },
}

/// Supervises one external process and caches its interpreted result.
///
/// All state-changing operations take `&mut self`, so a single supervisor
/// cannot be driven from two places at once. Independent supervisors may be
/// moved to separate threads.
pub struct Supervisor<L: Launchable> {
    executable: PathBuf,
    tool: String,
    launchable: L,
    command: Vec<OsString>,
    handle: Option<Handle>,
    capture: Capture<L::Output>,
    verbose: bool,
}

impl<L: Launchable> Supervisor<L> {
    /// Resolve `name` and create an idle supervisor around `launchable`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Resolution`] if the name does not resolve and
    /// [`Error::NotExecutable`] if the match is not an executable file.
    pub fn new(name: &str, resolver: &Resolver, launchable: L) -> Result<Self> {
        let executable = resolver.require(name)?;
        let tool = executable
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string());

        Ok(Self {
            executable,
            tool,
            launchable,
            command: Vec::new(),
            handle: None,
            capture: Capture::Pending,
            verbose: false,
        })
    }

    /// Log lifecycle events at `info` instead of `debug`.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Resolved path of the supervised executable.
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// Tool name used in errors and logs (executable file stem).
    pub fn tool(&self) -> &str {
        &self.tool
    }

    /// The launch capability.
    pub fn launchable(&self) -> &L {
        &self.launchable
    }

    /// Arguments of the active command (without the executable).
    pub fn command(&self) -> &[OsString] {
        &self.command
    }

    /// Replace the active command's arguments.
    ///
    /// Takes effect on the next [`launch`](Self::launch).
    pub fn set_command<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.command = args.into_iter().map(Into::into).collect();
    }

    /// Build the command for `request` and launch it.
    ///
    /// If a process is already running, nothing is rebuilt and its pid is
    /// returned.
    ///
    /// # Errors
    ///
    /// Validation failures from [`Launchable::build_command`] are returned
    /// before any launch is attempted.
    pub fn run(&mut self, request: L::Request) -> Result<u32> {
        if let Some(pid) = self.running_pid() {
            lifecycle!(self.verbose, pid, tool = %self.tool, "process already running");
            return Ok(pid);
        }

        let args = self.launchable.build_command(request)?;
        self.command = args;
        self.launch()
    }

    /// Start the active command without waiting for it to finish.
    ///
    /// Clears any previously captured output and cached result. If the
    /// process is already running this is a no-op returning its pid.
    ///
    /// # Errors
    ///
    /// - [`Error::Configuration`] if no command is set.
    /// - [`Error::Launch`] if the OS fails to start the process.
    pub fn launch(&mut self) -> Result<u32> {
        if self.command.is_empty() {
            return Err(Error::configuration("command not defined"));
        }

        if let Some(pid) = self.running_pid() {
            lifecycle!(self.verbose, pid, tool = %self.tool, "process already running");
            return Ok(pid);
        }

        self.handle = None;
        self.capture = Capture::Pending;

        lifecycle!(
            self.verbose,
            executable = %self.executable.display(),
            args = ?self.command,
            "launching process"
        );

        let mut child = Command::new(&self.executable)
            .args(&self.command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::launch(&self.executable, e.to_string()))?;

        let (stdout, stderr) = match spawn_readers(&mut child) {
            Ok(readers) => readers,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::launch(&self.executable, e.to_string()));
            }
        };

        if let Err(e) = child.try_wait() {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::launch(&self.executable, e.to_string()));
        }

        let pid = child.id();
        self.handle = Some(Handle {
            child,
            stdout,
            stderr,
        });

        lifecycle!(self.verbose, pid, tool = %self.tool, "process started");
        Ok(pid)
    }

    /// Current lifecycle state. Polls the OS without blocking.
    pub fn state(&mut self) -> ProcessState {
        if self.handle.is_none() {
            return if self.command.is_empty() {
                ProcessState::Idle
            } else {
                ProcessState::Armed
            };
        }

        if self.is_running() {
            ProcessState::Running
        } else {
            ProcessState::Exited
        }
    }

    /// Whether the process is alive. Never blocks.
    pub fn is_running(&mut self) -> bool {
        match self.handle.as_mut() {
            Some(handle) => matches!(handle.child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// OS process id while a handle exists.
    pub fn pid(&self) -> Option<u32> {
        self.handle.as_ref().map(|h| h.child.id())
    }

    /// Block until the process exits. No-op without a process.
    ///
    /// Does not capture output; see [`result`](Self::result).
    pub fn wait(&mut self) -> Result<()> {
        if let Some(handle) = self.handle.as_mut() {
            handle.child.wait()?;
        }
        Ok(())
    }

    /// Forcibly terminate a running process and return to idle.
    ///
    /// Blocks until the OS reports the process dead, then clears the handle,
    /// the command, captured output and the cached result. Does nothing if
    /// the process is not running.
    pub fn stop(&mut self) -> Result<()> {
        if !self.is_running() {
            lifecycle!(self.verbose, tool = %self.tool, "process not running, nothing to stop");
            return Ok(());
        }

        if let Some(mut handle) = self.handle.take() {
            if let Err(e) = handle.child.kill() {
                // The process may exit between the liveness check and kill.
                if e.kind() != io::ErrorKind::InvalidInput {
                    self.handle = Some(handle);
                    return Err(e.into());
                }
            }
            handle.child.wait()?;
        }

        self.command.clear();
        self.capture = Capture::Pending;

        lifecycle!(self.verbose, tool = %self.tool, "process stopped");
        Ok(())
    }

    /// Captured output and interpreted result of the current launch.
    ///
    /// Blocks while the process is running. Returns `Ok(None)` if nothing
    /// has been launched. The first call after exit captures stdout/stderr
    /// and runs [`Launchable::transform`]; later calls return the cached
    /// value (or the cached failure) without doing either again.
    ///
    /// # Errors
    ///
    /// - [`Error::ProcessFailed`] if the process exited unsuccessfully.
    /// - [`Error::Transformation`] if the output could not be interpreted.
    ///
    /// In both cases [`captured`](Self::captured) still returns the output.
    /// A failure to read the pipes is cached as well, with empty output.
    ///
    /// Capture ends when the output pipes close, not when the process
    /// exits. A background grandchild that inherited stdout or stderr keeps
    /// this call blocked after [`is_running`](Self::is_running) has turned
    /// false, and a caller-side timeout built on `is_running()` cannot
    /// bound that wait.
    pub fn result(&mut self) -> Result<Option<&L::Output>> {
        let Some(handle) = self.handle.as_mut() else {
            return Ok(None);
        };

        if let Capture::Pending = self.capture {
            let status = handle.child.wait()?;
            let (output, collected) = match handle.collect_output() {
                Ok(output) => (output, Ok(())),
                Err(e) => (CapturedOutput::default(), Err(Error::from(e))),
            };

            lifecycle!(
                self.verbose,
                tool = %self.tool,
                %status,
                stdout_lines = output.stdout.len(),
                stderr_lines = output.stderr.len(),
                "captured process output"
            );

            let outcome = if let Err(e) = collected {
                Err(e)
            } else if status.success() {
                self.launchable
                    .transform(&output)
                    .map_err(|e| match e {
                        e @ Error::Transformation { .. } => e,
                        other => Error::transformation(&self.tool, other.to_string()),
                    })
            } else {
                Err(Error::ProcessFailed {
                    tool: self.tool.clone(),
                    status,
                    stderr: output.stderr_tail(STDERR_TAIL_LINES),
                })
            };

            #[cfg(feature = "tracing")]
            {
                if let Err(ref e) = outcome {
                    tracing::warn!(tool = %self.tool, error = %e, "process result unavailable");
                }
            }

            self.capture = Capture::Captured {
                output,
                status,
                outcome,
            };
        }

        match &self.capture {
            Capture::Captured {
                outcome: Ok(value), ..
            } => Ok(Some(value)),
            Capture::Captured {
                outcome: Err(e), ..
            } => Err(e.clone()),
            Capture::Pending => Ok(None),
        }
    }

    /// Consume the supervisor and take ownership of its result.
    pub fn into_result(mut self) -> Result<Option<L::Output>> {
        self.result()?;
        match std::mem::replace(&mut self.capture, Capture::Pending) {
            Capture::Captured { outcome, .. } => outcome.map(Some),
            Capture::Pending => Ok(None),
        }
    }

    /// Output captured for the current launch, if any.
    pub fn captured(&self) -> Option<&CapturedOutput> {
        match &self.capture {
            Capture::Captured { output, .. } => Some(output),
            Capture::Pending => None,
        }
    }

    /// Exit status recorded when output was captured.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        match &self.capture {
            Capture::Captured { status, .. } => Some(*status),
            Capture::Pending => None,
        }
    }

    fn running_pid(&mut self) -> Option<u32> {
        if self.is_running() {
            self.pid()
        } else {
            None
        }
    }
}

impl<L: Launchable> fmt::Debug for Supervisor<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("executable", &self.executable)
            .field("command", &self.command)
            .field("pid", &self.pid())
            .field("captured", &self.captured().is_some())
            .field("verbose", &self.verbose)
            .finish()
    }
}
