// SPDX-License-Identifier: MPL-2.0
//! External-process renderer built on an OS thumbnail utility.
//!
//! The tool is invoked as `<program> -t -s <edge> -o <dir> <input>` (the
//! `qlmanage` command line) and is expected to leave `<input-file-name>.png`
//! in `<dir>`. That file is then moved to the requested output path.
//!
//! Each invocation works in its own `.temp-XXXXXX` directory next to the
//! output, so concurrent conversions into one directory do not collide.

use super::{ConversionRequest, Renderer};
use crate::config::{Config, TEMP_DIR_PREFIX};
use crate::error::{Error, Result};
use std::fs;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tracing::{debug, warn};

/// How often a child with a timeout is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// The thumbnail-utility strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailRenderer {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl ThumbnailRenderer {
    /// `timeout: None` waits for the tool indefinitely.
    pub fn new(program: impl Into<PathBuf>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.thumbnail_program(), config.thumbnail_timeout())
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Runs the tool into `work_dir` and moves its result to `output`.
    fn render_into(&self, request: &ConversionRequest, work_dir: &Path, output: &Path) -> Result<()> {
        let edge = request.scale.thumbnail_edge();
        let mut command = Command::new(&self.program);
        command
            .arg("-t")
            .arg("-s")
            .arg(edge.to_string())
            .arg("-o")
            .arg(work_dir)
            .arg(&request.input_path)
            .stdin(Stdio::null());
        debug!(program = %self.program.display(), edge, "running thumbnail tool");

        self.run(&mut command)?;

        let file_name = request
            .input_path
            .file_name()
            .ok_or_else(|| Error::InputNotFound(request.input_path.display().to_string()))?;
        let mut generated_name = file_name.to_os_string();
        generated_name.push(".png");
        let generated = work_dir.join(generated_name);

        if !generated.is_file() {
            return Err(Error::Subprocess("output not found".into()));
        }

        fs::rename(&generated, output).map_err(|e| {
            Error::FileSystem(format!(
                "cannot move {} to {}: {e}",
                generated.display(),
                output.display()
            ))
        })
    }

    fn run(&self, command: &mut Command) -> Result<()> {
        let spawn_error = |e: std::io::Error| {
            Error::Subprocess(format!("cannot run {}: {e}", self.program.display()))
        };

        let (status, stderr) = match self.timeout {
            None => {
                let output = command.output().map_err(spawn_error)?;
                (output.status, String::from_utf8_lossy(&output.stderr).into_owned())
            }
            Some(timeout) => {
                let mut child = command
                    .stdout(Stdio::null())
                    .stderr(Stdio::piped())
                    .spawn()
                    .map_err(spawn_error)?;
                // Drained on its own thread so a chatty tool cannot fill the pipe and stall.
                let stderr_reader = child.stderr.take().map(|mut pipe| {
                    thread::spawn(move || {
                        let mut bytes = Vec::new();
                        let _ = pipe.read_to_end(&mut bytes);
                        bytes
                    })
                });
                let status = wait_with_timeout(&mut child, timeout)?;
                let stderr = stderr_reader
                    .and_then(|reader| reader.join().ok())
                    .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                    .unwrap_or_default();
                (status, stderr)
            }
        };

        if status.success() {
            Ok(())
        } else {
            let stderr = stderr.trim();
            Err(Error::Subprocess(if stderr.is_empty() {
                format!("{} exited with {status}", self.program.display())
            } else {
                format!("{} exited with {status}: {stderr}", self.program.display())
            }))
        }
    }
}

impl Renderer for ThumbnailRenderer {
    fn name(&self) -> &'static str {
        "thumbnail"
    }

    fn render(&self, request: &ConversionRequest) -> Result<PathBuf> {
        let output = request.output_path();
        let parent = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let work_dir = tempfile::Builder::new()
            .prefix(TEMP_DIR_PREFIX)
            .tempdir_in(parent)
            .map_err(|e| {
                Error::FileSystem(format!(
                    "cannot create working directory in {}: {e}",
                    parent.display()
                ))
            })?;

        let result = self.render_into(request, work_dir.path(), &output);
        discard_temp_dir(work_dir);
        result.map(|()| output)
    }
}

/// Kills the child once `timeout` has elapsed.
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<ExitStatus> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {}
            Err(e) => return Err(Error::Subprocess(format!("cannot wait for tool: {e}"))),
        }
        if Instant::now() >= deadline {
            // Best effort: the child may have exited in the meantime.
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::Subprocess(format!(
                "timed out after {}s",
                timeout.as_secs_f64()
            )));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Removes the working directory. Failures are logged, never returned.
fn discard_temp_dir(work_dir: TempDir) {
    let path = work_dir.path().to_path_buf();
    match work_dir.close() {
        Ok(()) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "working directory already gone");
        }
        Err(err) => {
            warn!(path = %path.display(), "failed to remove working directory: {err}");
        }
    }
}
