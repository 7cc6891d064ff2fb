//! External tool runner
//!
//! Every external capability (decoder, resampler, loudness meter, mixer,
//! player) is a subprocess. `ExternalTool` spawns it with a null stdin,
//! captures both output streams and bounds the wait with a timeout. A child
//! that outlives its timeout is killed.

use crate::error::{LevelError, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

/// Longest stderr excerpt carried in a `ToolFailed` error
const STDERR_EXCERPT_LINES: usize = 8;

/// Captured output of a finished tool
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Standard output, lossily decoded
    pub stdout: String,
    /// Standard error, lossily decoded
    pub stderr: String,
}

impl ToolOutput {
    /// Both streams, stderr first (tools like ffmpeg log there)
    pub fn combined(&self) -> String {
        let mut combined = String::with_capacity(self.stdout.len() + self.stderr.len() + 1);
        combined.push_str(&self.stderr);
        if !self.stderr.is_empty() && !self.stderr.ends_with('\n') {
            combined.push('\n');
        }
        combined.push_str(&self.stdout);
        combined
    }
}

/// A named external program with a per-invocation timeout
#[derive(Debug, Clone)]
pub struct ExternalTool {
    name: String,
    program: PathBuf,
    timeout: Duration,
}

impl ExternalTool {
    /// Create a tool handle
    pub fn new(name: impl Into<String>, program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            timeout,
        }
    }

    /// Display name used in errors and logs
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Program path or bare command name
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Invocation timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run the tool to completion and require a zero exit status
    ///
    /// # Errors
    /// - `ToolMissing` if the program cannot be spawned
    /// - `ToolTimeout` if it does not exit within the timeout
    /// - `ToolFailed` if it exits non-zero
    pub async fn run<I, S>(&self, args: I) -> Result<ToolOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        debug!(tool = %self.name, program = ?self.program, "Running external tool");

        let child = cmd.spawn().map_err(|e| LevelError::ToolMissing {
            tool: self.name.clone(),
            reason: e.to_string(),
        })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| LevelError::ToolTimeout {
                tool: self.name.clone(),
                timeout: self.timeout,
            })??;

        let result = ToolOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if !output.status.success() {
            return Err(LevelError::ToolFailed {
                tool: self.name.clone(),
                status: output.status.to_string(),
                stderr: stderr_excerpt(&result.stderr),
            });
        }

        Ok(result)
    }
}

/// Last few non-empty lines of stderr
fn stderr_excerpt(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_EXCERPT_LINES);
    lines[start..].join("\n")
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(timeout: Duration) -> ExternalTool {
        ExternalTool::new("sh", "sh", timeout)
    }

    #[tokio::test]
    async fn test_run_captures_output() {
        let output = sh(Duration::from_secs(5))
            .run(["-c", "echo out; echo err >&2"])
            .await
            .unwrap();
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
        assert_eq!(output.combined(), "err\nout\n");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_tool_failed() {
        let err = sh(Duration::from_secs(5))
            .run(["-c", "echo broken >&2; exit 3"])
            .await
            .unwrap_err();
        match err {
            LevelError::ToolFailed { tool, stderr, .. } => {
                assert_eq!(tool, "sh");
                assert_eq!(stderr, "broken");
            }
            other => panic!("Expected ToolFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let err = sh(Duration::from_millis(100))
            .run(["-c", "sleep 5"])
            .await
            .unwrap_err();
        assert!(matches!(err, LevelError::ToolTimeout { .. }));
        assert!(err.is_tool_error());
    }

    #[tokio::test]
    async fn test_missing_program() {
        let tool = ExternalTool::new(
            "nope",
            "/nonexistent/levelplay-tool",
            Duration::from_secs(1),
        );
        let err = tool.run(["--version"]).await.unwrap_err();
        assert!(matches!(err, LevelError::ToolMissing { .. }));
    }

    #[test]
    fn test_stderr_excerpt_keeps_tail() {
        let stderr: String = (0..20).map(|i| format!("line {}\n", i)).collect();
        let excerpt = stderr_excerpt(&stderr);
        assert!(excerpt.starts_with("line 12"));
        assert!(excerpt.ends_with("line 19"));
    }
}
