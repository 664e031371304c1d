use crate::command::CommandOutput;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Whether captured output is also printed once the command finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    Quiet,
    Show,
}

/// Runs external programs with a fixed timeout, capturing stdout and stderr.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    timeout: Duration,
}

impl CommandRunner {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run `program` with `args`. Non-zero exits, timeouts and spawn errors are logged and come
    /// back as an unsuccessful [`CommandOutput`]; this never returns an error.
    pub async fn run(&self, program: &str, args: &[&str], echo: Echo) -> CommandOutput {
        let cmdline = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        tracing::debug!("executing command: {cmdline}");

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Err(_) => {
                tracing::error!("command timed out after {:?}: {cmdline}", self.timeout);
                return CommandOutput::failed(format!("timed out after {:?}", self.timeout));
            }
            Ok(Err(err)) => {
                tracing::error!("error executing command '{cmdline}': {err}");
                return CommandOutput::failed(err.to_string());
            }
            Ok(Ok(output)) => output,
        };

        let result = CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        if echo == Echo::Show {
            if !result.stdout.is_empty() {
                println!("{}", result.stdout.trim_end());
            }
            if !result.stderr.is_empty() {
                eprintln!("{}", result.stderr.trim_end());
            }
        }

        if !result.success {
            tracing::warn!("command failed with {}: {cmdline}", output.status);
            if !result.stderr.trim().is_empty() {
                tracing::warn!("error output: {}", result.stderr.trim());
            }
        }
        result
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_output() {
        let runner = CommandRunner::new(Duration::from_secs(5));
        let out = runner
            .run("sh", &["-c", "echo hello; echo oops >&2"], Echo::Quiet)
            .await;
        assert!(out.success);
        assert_eq!(out.stdout, "hello\n");
        assert_eq!(out.stderr, "oops\n");
    }

    #[tokio::test]
    async fn nonzero_exit_is_failure() {
        let runner = CommandRunner::new(Duration::from_secs(5));
        let out = runner
            .run("sh", &["-c", "echo broken >&2; exit 3"], Echo::Quiet)
            .await;
        assert!(!out.success);
        assert_eq!(out.stderr.trim(), "broken");
    }

    #[tokio::test]
    async fn timeout_is_failure() {
        let runner = CommandRunner::new(Duration::from_millis(100));
        let out = runner.run("sleep", &["5"], Echo::Quiet).await;
        assert!(!out.success);
        assert!(out.stderr.contains("timed out"));
    }

    #[tokio::test]
    async fn missing_program_is_failure() {
        let runner = CommandRunner::new(Duration::from_secs(5));
        let out = runner
            .run("vhostcrab-no-such-program", &[], Echo::Quiet)
            .await;
        assert!(!out.success);
        assert!(!out.stderr.is_empty());
    }
}
