use std::process::Stdio;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, instrument, warn};

mod session;

pub use session::ScanSession;

use crate::command::NmapCommand;
use crate::highlight;

/// Receives decorated output lines as they are produced.
pub trait OutputSink: Send {
    fn line(&mut self, rendered: &str);
}

/// Default sink: print each line immediately.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn line(&mut self, rendered: &str) {
        println!("{rendered}");
    }
}

/// Errors emitted by the process runner.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("lost the child's {0} pipe")]
    MissingPipe(&'static str),
    #[error("i/o failure while streaming scan output: {0}")]
    Stream(#[from] std::io::Error),
}

/// How a scan finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanStatus {
    Completed {
        exit_code: Option<i32>,
        /// Aggregated standard-error text, present only when non-empty.
        /// Always reported after every streamed stdout line.
        stderr: Option<String>,
    },
    /// Termination was requested mid-stream; the child has been killed and
    /// already-printed output stands.
    Interrupted,
}

/// Launches the external scanning tool and streams its stdout line-by-line
/// through the highlight table, racing each read against cancellation.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: String,
}

impl ProcessRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    #[instrument(name = "run_scan", skip_all, fields(program = %self.program))]
    pub async fn run(
        &self,
        command: &NmapCommand,
        session: &ScanSession,
        sink: &mut dyn OutputSink,
    ) -> Result<ScanStatus, RunnerError> {
        let args = command.to_args();
        debug!(?args, "spawning scan process");

        let (cancel, _active) = session.begin();
        let mut child = Command::new(&self.program)
            .args(&args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunnerError::Launch {
                program: self.program.clone(),
                source,
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or(RunnerError::MissingPipe("stdout"))?;
        let mut lines = BufReader::new(stdout).lines();

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    let _ = child.kill().await;
                    let _ = child.wait().await;
                    warn!("termination requested; child killed");
                    return Ok(ScanStatus::Interrupted);
                }
                next = lines.next_line() => match next? {
                    Some(line) => sink.line(&highlight::render(line.trim_end())),
                    None => break,
                },
            }
        }

        // stderr is drained only after stdout signals completion, so error
        // text always prints after all streamed output.
        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf).await;
                buf
            })
        });

        // A child may close stdout and keep running; the drain phase still
        // honors termination requests.
        let waited = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            status = child.wait() => Some(status),
        };
        let Some(status) = waited else {
            let _ = child.kill().await;
            let _ = child.wait().await;
            warn!("termination requested; child killed");
            return Ok(ScanStatus::Interrupted);
        };
        let status = status?;
        debug!(exit = ?status.code(), "scan process finished");

        let stderr_buf = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => String::new(),
        };
        let stderr = Some(stderr_buf.trim().to_string()).filter(|s| !s.is_empty());
        Ok(ScanStatus::Completed {
            exit_code: status.code(),
            stderr,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::command::Target;
    use std::time::{Duration, Instant};

    #[derive(Default)]
    struct Collector {
        lines: Vec<String>,
    }

    impl OutputSink for Collector {
        fn line(&mut self, rendered: &str) {
            self.lines.push(rendered.to_string());
        }
    }

    fn shell_command(script: &str) -> NmapCommand {
        // `sh -c <script>` ignores the trailing target/verbosity arguments
        let mut command = NmapCommand::new("127.0.0.1".parse::<Target>().unwrap());
        command.push_flag("-c");
        command.push_flag(script);
        command
    }

    #[tokio::test]
    async fn streams_lines_in_emission_order() {
        let runner = ProcessRunner::new("sh");
        let session = ScanSession::new();
        let mut sink = Collector::default();
        let command = shell_command(
            "echo 'Starting Nmap 7.95'; echo '22/tcp open ssh'; echo '23/tcp closed telnet'",
        );

        let status = runner.run(&command, &session, &mut sink).await.unwrap();
        assert!(matches!(
            status,
            ScanStatus::Completed {
                exit_code: Some(0),
                stderr: None
            }
        ));
        assert_eq!(sink.lines.len(), 3);
        assert!(sink.lines[0].contains("Starting Nmap 7.95"));
        assert!(sink.lines[1].contains("[+] 22/tcp open ssh"));
        assert!(sink.lines[2].contains("[-] 23/tcp closed telnet"));
    }

    #[tokio::test]
    async fn stderr_is_aggregated_after_streaming() {
        let runner = ProcessRunner::new("sh");
        let session = ScanSession::new();
        let mut sink = Collector::default();
        let command = shell_command("echo 'out line'; echo 'first error' >&2; echo 'second error' >&2");

        let status = runner.run(&command, &session, &mut sink).await.unwrap();
        match status {
            ScanStatus::Completed { stderr, .. } => {
                let stderr = stderr.expect("stderr should be captured");
                assert!(stderr.contains("first error"));
                assert!(stderr.contains("second error"));
            }
            other => panic!("unexpected status {other:?}"),
        }
        assert_eq!(sink.lines, vec!["out line"]);
    }

    #[tokio::test]
    async fn nonzero_exit_codes_are_reported() {
        let runner = ProcessRunner::new("sh");
        let session = ScanSession::new();
        let mut sink = Collector::default();
        let command = shell_command("exit 3");

        let status = runner.run(&command, &session, &mut sink).await.unwrap();
        assert!(matches!(
            status,
            ScanStatus::Completed {
                exit_code: Some(3),
                stderr: None
            }
        ));
    }

    #[tokio::test]
    async fn missing_executable_is_a_launch_error() {
        let runner = ProcessRunner::new("definitely-not-a-real-scanner");
        let session = ScanSession::new();
        let mut sink = Collector::default();
        let command = shell_command("true");

        let err = runner
            .run(&command, &session, &mut sink)
            .await
            .expect_err("spawn should fail");
        assert!(matches!(err, RunnerError::Launch { .. }));
        assert!(err.to_string().contains("definitely-not-a-real-scanner"));
        assert!(sink.lines.is_empty());
    }

    #[tokio::test]
    async fn termination_request_kills_the_child_mid_stream() {
        let runner = ProcessRunner::new("sh");
        let session = ScanSession::new();
        let handle = session.clone();
        let command = shell_command("echo 'first'; sleep 10; echo 'second'");

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            handle.request_termination();
        });

        let started = Instant::now();
        let mut sink = Collector::default();
        let status = runner.run(&command, &session, &mut sink).await.unwrap();

        assert_eq!(status, ScanStatus::Interrupted);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(sink.lines, vec!["first"]);
        assert!(!session.is_scanning());
    }

    #[tokio::test]
    async fn termination_request_kills_a_child_that_closed_stdout() {
        let runner = ProcessRunner::new("sh");
        let session = ScanSession::new();
        let handle = session.clone();
        let command = shell_command("echo 'only line'; exec 1>&-; sleep 8");

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            handle.request_termination();
        });

        let started = Instant::now();
        let mut sink = Collector::default();
        let status = runner.run(&command, &session, &mut sink).await.unwrap();

        assert_eq!(status, ScanStatus::Interrupted);
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(sink.lines, vec!["only line"]);
    }

    #[tokio::test]
    async fn stale_termination_request_does_not_abort_the_next_scan() {
        let runner = ProcessRunner::new("sh");
        let session = ScanSession::new();
        // requested between runs, so no run ever consumes it
        session.request_termination();

        let mut sink = Collector::default();
        let command = shell_command("echo 'fresh run'");
        let status = runner.run(&command, &session, &mut sink).await.unwrap();

        assert!(matches!(
            status,
            ScanStatus::Completed {
                exit_code: Some(0),
                ..
            }
        ));
        assert_eq!(sink.lines, vec!["fresh run"]);
    }
}
