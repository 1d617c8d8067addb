use std::ffi::OsStr;
use std::io::{self, Read};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Bounds applied to a captured run.
#[derive(Debug, Clone)]
pub struct Limits {
    pub timeout: Duration,
    /// Set to `true` from another thread (e.g. a Ctrl+C handler) to kill the child.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Limits {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

/// Output of a finished child process.
#[derive(Debug)]
pub struct Captured {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

/// How a captured run ended.
#[derive(Debug)]
pub enum Outcome {
    Finished(Captured),
    TimedOut { stdout: String, stderr: String },
    Cancelled,
}

/// Run a command to completion, capturing stdout and stderr.
///
/// Both streams are drained on reader threads so a chatty child never
/// blocks on a full pipe. The child is killed when the timeout elapses or
/// the cancel flag is raised.
pub fn run_captured<S: AsRef<OsStr>>(
    program: &Path,
    args: &[S],
    working_dir: &Path,
    env: &[(String, String)],
    limits: &Limits,
) -> io::Result<Outcome> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    for (key, value) in env {
        cmd.env(key, value);
    }

    // Own process group, so a timeout also takes down grandchildren that hold the pipes
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let started = Instant::now();
    let mut child = cmd.spawn()?;

    let stdout_handle = child.stdout.take().map(drain);
    let stderr_handle = child.stderr.take().map(drain);

    let status = loop {
        if limits.cancelled() {
            kill(&mut child);
            join(stdout_handle);
            join(stderr_handle);
            return Ok(Outcome::Cancelled);
        }

        if let Some(status) = child.try_wait()? {
            // Background processes left by the build still hold the pipes
            kill_group(&child);
            break status;
        }

        if started.elapsed() >= limits.timeout {
            kill(&mut child);
            return Ok(Outcome::TimedOut {
                stdout: join(stdout_handle),
                stderr: join(stderr_handle),
            });
        }

        thread::sleep(POLL_INTERVAL);
    };

    let elapsed = started.elapsed();
    Ok(Outcome::Finished(Captured {
        status,
        stdout: join(stdout_handle),
        stderr: join(stderr_handle),
        elapsed,
    }))
}

fn drain<R: Read + Send + 'static>(mut stream: R) -> JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).ok();
        String::from_utf8_lossy(&buf).to_string()
    })
}

fn join(handle: Option<JoinHandle<String>>) -> String {
    handle.and_then(|h| h.join().ok()).unwrap_or_default()
}

fn kill(child: &mut Child) {
    kill_group(child);
    child.kill().ok();
    child.wait().ok();
}

/// SIGKILL the process group the child leads
#[cfg(unix)]
fn kill_group(child: &Child) {
    let Ok(pid) = libc::pid_t::try_from(child.id()) else {
        return;
    };
    // SAFETY: kill(2) takes plain integers and touches no memory of ours.
    // ESRCH once the group is empty is ignored.
    unsafe {
        libc::kill(-pid, libc::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_group(_child: &Child) {}

/// Format a program and its args for messages and logs
pub fn format_command<S: AsRef<OsStr>>(program: &str, args: &[S]) -> String {
    std::iter::once(program.to_string())
        .chain(args.iter().map(|s| s.as_ref().to_string_lossy().to_string()))
        .collect::<Vec<_>>()
        .join(" ")
}
