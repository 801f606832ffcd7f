//! Subprocess-backed [`StepRunner`].

use super::{CommandSpec, ExitOutcome, Step, StepRunner};
use crate::config::ReleaseConfig;
use crate::error::{ConfigurationError, ReleaseError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};

/// Runs steps as real subprocesses in a working directory
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    config: ReleaseConfig,
    work_dir: PathBuf,
}

impl ProcessRunner {
    /// Runner executing in `work_dir`
    pub fn new(config: ReleaseConfig, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            work_dir: work_dir.into(),
        }
    }

    fn check_tool(&self, tool: &str) -> Result<()> {
        if tool.starts_with("./") || tool.starts_with("../") {
            let path = self.work_dir.join(tool);
            if !is_executable(&path) {
                return Err(ConfigurationError::ToolNotExecutable {
                    tool: tool.to_string(),
                }
                .into());
            }
            return Ok(());
        }

        which::which(tool).map_err(|_| ConfigurationError::MissingTool {
            tool: tool.to_string(),
        })?;
        Ok(())
    }

    fn resolve_program(&self, spec: &CommandSpec) -> PathBuf {
        if spec.program.starts_with("./") || spec.program.starts_with("../") {
            self.work_dir.join(&spec.program)
        } else {
            PathBuf::from(&spec.program)
        }
    }
}

impl StepRunner for ProcessRunner {
    fn check_tools(&self, tools: &[&str]) -> Result<()> {
        for tool in tools {
            self.check_tool(tool)?;
        }
        Ok(())
    }

    async fn run(&self, step: &Step) -> Result<ExitOutcome> {
        let spec = step.command(&self.config);
        log::debug!("> {}", spec.display());

        let mut command = tokio::process::Command::new(self.resolve_program(&spec));
        command
            .args(&spec.args)
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let spawn_error = |source: std::io::Error| ReleaseError::Spawn {
            command: spec.display(),
            source,
        };

        let outcome = if spec.stream_output {
            let status = command
                .stdout(Stdio::inherit())
                .stderr(Stdio::inherit())
                .status()
                .await
                .map_err(spawn_error)?;
            ExitOutcome {
                code: status.code(),
                stdout: String::new(),
                output: String::new(),
            }
        } else {
            let mut child = command
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn()
                .map_err(&spawn_error)?;

            let mut stdout_lines = child
                .stdout
                .take()
                .map(|out| BufReader::new(out).lines());
            let mut stderr_lines = child
                .stderr
                .take()
                .map(|err| BufReader::new(err).lines());
            let mut stdout = String::new();
            let mut combined = String::new();

            while stdout_lines.is_some() || stderr_lines.is_some() {
                tokio::select! {
                    Some(line) = next_line(&mut stdout_lines) => {
                        stdout.push_str(&line);
                        stdout.push('\n');
                        combined.push_str(&line);
                        combined.push('\n');
                    }
                    Some(line) = next_line(&mut stderr_lines) => {
                        combined.push_str(&line);
                        combined.push('\n');
                    }
                    else => break,
                }
            }

            let status = child.wait().await.map_err(&spawn_error)?;
            ExitOutcome {
                code: status.code(),
                stdout,
                output: combined,
            }
        };

        log::debug!("< {} exited with {:?}", step.label(), outcome.code);
        Ok(outcome)
    }
}

/// Next line from a pipe, closing it at end of stream
///
/// A closed pipe never yields again, so a `select!` keeps draining the other one.
async fn next_line<R>(lines: &mut Option<Lines<R>>) -> Option<String>
where
    R: AsyncBufRead + Unpin,
{
    let Some(reader) = lines.as_mut() else {
        return std::future::pending().await;
    };
    match reader.next_line().await {
        Ok(Some(line)) => Some(line),
        Ok(None) | Err(_) => {
            *lines = None;
            None
        }
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
