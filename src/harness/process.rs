use crate::errors::{CheckerError, CheckerResult};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread::JoinHandle;
use std::time::Duration;
use wait_timeout::ChildExt;

const STDERR_TAIL_BYTES: usize = 2048;
const TERMINATE_GRACE: Duration = Duration::from_millis(1500);

/// Program plus leading arguments used to launch a tool, e.g. `["python3"]`
/// or `["bash", "fixtures/mock-python.sh"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Builds a spec running this launcher with `extra` appended, in `cwd`.
    pub fn spec<I, S>(&self, extra: I, cwd: &Path) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = self.args.clone();
        args.extend(extra.into_iter().map(Into::into));
        CommandSpec {
            program: self.program.clone(),
            args,
            cwd: cwd.to_path_buf(),
        }
    }
}

impl TryFrom<Vec<String>> for ToolCommand {
    type Error = String;

    fn try_from(mut value: Vec<String>) -> Result<Self, Self::Error> {
        if value.is_empty() || value[0].trim().is_empty() {
            return Err("tool command cannot be empty".to_string());
        }
        let program = value.remove(0);
        Ok(Self {
            program,
            args: value,
        })
    }
}

impl From<ToolCommand> for Vec<String> {
    fn from(value: ToolCommand) -> Self {
        let mut argv = vec![value.program];
        argv.extend(value.args);
        argv
    }
}

#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl CommandSpec {
    pub fn display(&self) -> String {
        let mut rendered = self.program.clone();
        for arg in &self.args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        rendered
    }

    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).current_dir(&self.cwd);
        command
    }
}

#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    pub fn stderr_tail(&self) -> &str {
        let trimmed = self.stderr.trim_end();
        if trimmed.len() <= STDERR_TAIL_BYTES {
            return trimmed;
        }
        let mut start = trimmed.len() - STDERR_TAIL_BYTES;
        while !trimmed.is_char_boundary(start) {
            start += 1;
        }
        &trimmed[start..]
    }
}

/// Runs `spec` to completion and captures its output. A non-zero exit status
/// is not an error here; checkers exit non-zero whenever they report
/// diagnostics.
pub fn run_captured(spec: &CommandSpec, timeout: Option<Duration>) -> CheckerResult<CapturedOutput> {
    tracing::debug!(command = %spec.display(), cwd = %spec.cwd.to_string_lossy(), "spawning tool");

    let mut child = spec
        .to_command()
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|err| CheckerError::Spawn(format!("{}: {}", spec.program, err)))?;

    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let status = match timeout {
        Some(limit) => match child.wait_timeout(limit)? {
            Some(status) => status,
            None => {
                terminate_then_kill(&mut child, TERMINATE_GRACE);
                return Err(CheckerError::Timeout(format!(
                    "{} did not finish within {}s",
                    spec.display(),
                    limit.as_secs()
                )));
            }
        },
        None => child.wait()?,
    };

    Ok(CapturedOutput {
        exit_code: status.code(),
        stdout: collect(stdout)?,
        stderr: collect(stderr)?,
    })
}

/// Like [`run_captured`] but treats a non-zero exit status as a failure.
pub fn run_checked(spec: &CommandSpec, timeout: Option<Duration>) -> CheckerResult<CapturedOutput> {
    let output = run_captured(spec, timeout)?;
    if !output.success() {
        return Err(CheckerError::CommandFailed(format!(
            "`{}` exited with status {:?}: {}",
            spec.display(),
            output.exit_code,
            output.stderr_tail()
        )));
    }
    Ok(output)
}

/// Sends SIGTERM (on unix), gives the child `grace` to exit, then kills it.
pub fn terminate_then_kill(child: &mut Child, grace: Duration) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;
        let _ = kill(Pid::from_raw(child.id() as i32), Signal::SIGTERM);
    }

    if let Ok(Some(_)) = child.wait_timeout(grace) {
        return;
    }

    let _ = child.kill();
    let _ = child.wait();
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> JoinHandle<std::io::Result<Vec<u8>>> {
    std::thread::spawn(move || {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Ok(buffer)
    })
}

fn collect(handle: Option<JoinHandle<std::io::Result<Vec<u8>>>>) -> CheckerResult<String> {
    let Some(handle) = handle else {
        return Ok(String::new());
    };
    let bytes = handle
        .join()
        .map_err(|_| CheckerError::Io("output reader thread panicked".to_string()))??;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
