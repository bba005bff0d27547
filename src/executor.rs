//! A tool for executing external programs (yt-dlp, ffmpeg).

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

/// Represents a command executor.
///
/// # Example
///
/// ```rust,no_run
/// # use std::path::PathBuf;
/// # use tubesave::executor::Executor;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let executor = Executor::new(PathBuf::from("ffmpeg"), vec!["-version".to_string()]);
///
/// let output = executor.execute().await?;
/// println!("Output: {}", output.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Executor {
    /// The path to the command executable.
    pub executable_path: PathBuf,
    /// The arguments to pass to the command.
    pub args: Vec<String>,
    /// Optional upper bound on the process lifetime. Unset means wait forever.
    pub timeout: Option<Duration>,
}

/// Represents the output of a process.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutput {
    /// The stdout of the process.
    pub stdout: String,
    /// The stderr of the process.
    pub stderr: String,
    /// The exit code of the process.
    pub code: i32,
}

impl Executor {
    pub fn new(executable_path: PathBuf, args: Vec<String>) -> Self {
        Self {
            executable_path,
            args,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Executes the command and returns the output.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Command`] if the program could not be launched or exited
    /// with a non-zero status, and [`Error::Timeout`] if a timeout was set and hit.
    pub async fn execute(&self) -> Result<ProcessOutput> {
        log::debug!(
            "Executing {} {:?}",
            self.executable_path.display(),
            self.args
        );

        let mut command = tokio::process::Command::new(&self.executable_path);
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        command.kill_on_drop(true);

        #[cfg(target_os = "windows")]
        {
            command.creation_flags(0x08000000);
        }

        command.args(&self.args);
        let child = command.spawn().map_err(|e| {
            Error::Command(format!(
                "Failed to launch {}: {}",
                self.executable_path.display(),
                e
            ))
        })?;

        // wait_with_output drains both pipes while waiting, so large JSON on stdout can't stall the child.
        let output = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, child.wait_with_output()).await {
                Ok(result) => result?,
                Err(_) => {
                    log::warn!("Process timed out after {:?}, killing it", timeout);
                    return Err(Error::Timeout(timeout));
                }
            },
            None => child.wait_with_output().await?,
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        let code = output.status.code().unwrap_or(-1);
        if output.status.success() {
            return Ok(ProcessOutput {
                stdout,
                stderr,
                code,
            });
        }

        Err(Error::Command(format!(
            "Process failed with code {}: {}",
            code,
            stderr.trim()
        )))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> Executor {
        Executor::new(
            PathBuf::from("sh"),
            vec!["-c".to_string(), script.to_string()],
        )
    }

    #[tokio::test]
    async fn captures_stdout_on_success() {
        let output = shell("echo hello").execute().await.unwrap();
        assert_eq!(output.code, 0);
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn non_zero_exit_is_a_command_error() {
        let err = shell("echo broken >&2; exit 3").execute().await.unwrap_err();
        match err {
            Error::Command(message) => {
                assert!(message.contains("code 3"));
                assert!(message.contains("broken"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_binary_is_a_launch_failure() {
        let executor = Executor::new(PathBuf::from("/definitely/not/here/ffmpeg"), vec![]);
        let err = executor.execute().await.unwrap_err();
        assert!(matches!(err, Error::Command(ref m) if m.contains("Failed to launch")));
    }

    #[tokio::test]
    async fn timeout_kills_slow_process() {
        let executor = shell("sleep 5").with_timeout(Duration::from_millis(100));
        let err = executor.execute().await.unwrap_err();
        assert!(matches!(err, Error::Timeout(_)));
    }
}
