use crate::config::ToolEnvironment;
use crate::errors::{CheckerError, CheckerResult};
use crate::harness::process::terminate_then_kill;
use crate::normalize::error_log::PytypeError;
use serde::Deserialize;
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Stdio};
use std::time::Duration;
use wait_timeout::ChildExt;

const BRIDGE_SOURCE: &str = include_str!("pytype_bridge.py");
const SHUTDOWN_GRACE: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisReply {
    Analyzed {
        file: String,
        errors: Vec<PytypeError>,
    },
    Failed {
        file: String,
        exception: String,
        message: String,
    },
}

impl AnalysisReply {
    pub fn file(&self) -> &str {
        match self {
            Self::Analyzed { file, .. } | Self::Failed { file, .. } => file,
        }
    }
}

/// A pytype process holding one options object and one loader for the
/// duration of a `run_tests` call. Files are analyzed one at a time; the
/// loader is never shared across sessions.
pub struct AnalysisSession {
    child: Child,
    stdin: Option<ChildStdin>,
    replies: BufReader<ChildStdout>,
}

impl AnalysisSession {
    pub fn start(env: &ToolEnvironment) -> CheckerResult<Self> {
        let spec = env.python.spec(
            ["-c", BRIDGE_SOURCE, env.pytype_python_version.as_str()],
            &env.work_dir,
        );
        let mut child = spec
            .to_command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|err| CheckerError::Spawn(format!("pytype analysis session: {}", err)))?;

        let stdin = child.stdin.take();
        let Some(stdout) = child.stdout.take() else {
            terminate_then_kill(&mut child, SHUTDOWN_GRACE);
            return Err(CheckerError::Spawn("pytype analysis session has no stdout".to_string()));
        };

        tracing::debug!(pid = child.id(), "started pytype analysis session");
        Ok(Self {
            child,
            stdin,
            replies: BufReader::new(stdout),
        })
    }

    pub fn analyze(&mut self, file_name: &str) -> CheckerResult<AnalysisReply> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| CheckerError::Io("pytype analysis session is closed".to_string()))?;
        writeln!(stdin, "{}", file_name)?;
        stdin.flush()?;

        let mut line = String::new();
        if self.replies.read_line(&mut line)? == 0 {
            return Err(CheckerError::MalformedOutput(format!(
                "pytype analysis session exited while analyzing {}",
                file_name
            )));
        }

        let reply: AnalysisReply = serde_json::from_str(line.trim_end())?;
        if reply.file() != file_name {
            return Err(CheckerError::MalformedOutput(format!(
                "pytype analysis session answered for {} while analyzing {}",
                reply.file(),
                file_name
            )));
        }
        Ok(reply)
    }
}

impl Drop for AnalysisSession {
    fn drop(&mut self) {
        // Closing stdin ends the bridge's read loop.
        drop(self.stdin.take());
        match self.child.wait_timeout(SHUTDOWN_GRACE) {
            Ok(Some(_)) => {}
            _ => terminate_then_kill(&mut self.child, SHUTDOWN_GRACE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AnalysisReply, BRIDGE_SOURCE};

    #[test]
    fn parses_both_reply_shapes() {
        let analyzed: AnalysisReply = serde_json::from_str(
            r#"{"status":"analyzed","file":"a.py","errors":[{"lineno":3,"message":"Name 'x' is not defined","text":"File \"a.py\", line 3, in <module>: Name 'x' is not defined [name-error]"}]}"#,
        )
        .expect("analyzed");
        match analyzed {
            AnalysisReply::Analyzed { file, errors } => {
                assert_eq!(file, "a.py");
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].lineno, 3);
                assert!(errors[0].text.starts_with("File \"a.py\", line 3"));
            }
            other => panic!("unexpected reply: {:?}", other),
        }

        let failed: AnalysisReply = serde_json::from_str(
            r#"{"status":"failed","file":"b.py","exception":"SyntaxError","message":"invalid syntax"}"#,
        )
        .expect("failed");
        assert_eq!(failed.file(), "b.py");
    }

    #[test]
    fn bridge_reuses_one_loader() {
        assert_eq!(BRIDGE_SOURCE.matches("create_loader(").count(), 1);
        assert!(BRIDGE_SOURCE.contains("loader=loader"));
        assert!(BRIDGE_SOURCE.contains("unique_sorted_errors()"));
    }
}
