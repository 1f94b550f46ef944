// src/exec/relay.rs

//! Relay process events to a console-like writer.

use std::io::Write;

use tracing::warn;

use crate::errors::Result;
use crate::exec::runner::{ExitOutcome, RunEvent, RunHandle, StreamKind};

/// How a relayed run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Exited(ExitOutcome),
    Cancelled,
    /// The event stream ended without a terminal event.
    Lost,
}

impl Termination {
    /// Exit code to hand back to whatever invoked us.
    ///
    /// The child's own code is passed through; signals map to `128 + n` and
    /// cancellation to `130`, the shell conventions.
    pub fn process_exit_code(&self) -> i32 {
        match self {
            Termination::Exited(ExitOutcome::Code(code)) => *code,
            Termination::Exited(ExitOutcome::Signal(sig)) => 128 + sig,
            Termination::Exited(ExitOutcome::Unknown) | Termination::Lost => 1,
            Termination::Cancelled => 130,
        }
    }
}

/// What was relayed for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub stdout_chunks: usize,
    pub stderr_chunks: usize,
    pub termination: Termination,
}

/// Write every event of `handle` to `out` as it arrives.
///
/// - chunks: `stdout: <chunk>` / `stderr: <chunk>` (lossy UTF-8)
/// - terminal: `child process exited with code N` and friends
///
/// A non-zero exit code is reported, not treated as an error.
pub async fn relay_events<W: Write>(handle: &mut RunHandle, out: &mut W) -> Result<RunSummary> {
    let mut stdout_chunks = 0;
    let mut stderr_chunks = 0;
    let mut termination = Termination::Lost;

    while let Some(event) = handle.next_event().await {
        match event {
            RunEvent::Stdout(chunk) => {
                write_chunk(out, StreamKind::Stdout, &chunk)?;
                stdout_chunks += 1;
            }
            RunEvent::Stderr(chunk) => {
                write_chunk(out, StreamKind::Stderr, &chunk)?;
                stderr_chunks += 1;
            }
            RunEvent::Exited(outcome) => {
                writeln!(out, "{}", describe_exit(outcome))?;
                termination = Termination::Exited(outcome);
                break;
            }
            RunEvent::Cancelled => {
                writeln!(out, "child process was cancelled")?;
                termination = Termination::Cancelled;
                break;
            }
        }
        out.flush()?;
    }
    out.flush()?;

    if termination == Termination::Lost {
        warn!("process event stream ended without an exit status");
    }

    Ok(RunSummary {
        stdout_chunks,
        stderr_chunks,
        termination,
    })
}

fn write_chunk<W: Write>(out: &mut W, kind: StreamKind, chunk: &[u8]) -> std::io::Result<()> {
    let text = String::from_utf8_lossy(chunk);
    let text = text.strip_suffix('\n').unwrap_or(&text[..]);
    writeln!(out, "{kind}: {text}")
}

fn describe_exit(outcome: ExitOutcome) -> String {
    match outcome {
        ExitOutcome::Code(code) => format!("child process exited with code {code}"),
        ExitOutcome::Signal(sig) => format!("child process terminated by signal {sig}"),
        ExitOutcome::Unknown => "child process exited with unknown status".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::{mpsc, oneshot};

    fn scripted(events: Vec<RunEvent>) -> RunHandle {
        let (tx, rx) = mpsc::channel(events.len().max(1));
        for e in events {
            tx.try_send(e).unwrap();
        }
        let (cancel_tx, _cancel_rx) = oneshot::channel();
        RunHandle::new(rx, cancel_tx, None)
    }

    #[tokio::test]
    async fn writes_prefixed_chunks_and_exit_line() {
        let mut handle = scripted(vec![
            RunEvent::Stdout(b"hello\n".to_vec()),
            RunEvent::Stderr(b"warn".to_vec()),
            RunEvent::Exited(ExitOutcome::Code(3)),
        ]);
        let mut out = Vec::new();

        let summary = relay_events(&mut handle, &mut out).await.unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "stdout: hello\nstderr: warn\nchild process exited with code 3\n"
        );
        assert_eq!(summary.stdout_chunks, 1);
        assert_eq!(summary.stderr_chunks, 1);
        assert_eq!(summary.termination.process_exit_code(), 3);
    }

    #[tokio::test]
    async fn missing_terminal_event_is_reported_as_lost() {
        let mut handle = scripted(vec![RunEvent::Stdout(b"partial".to_vec())]);
        let mut out = Vec::new();

        let summary = relay_events(&mut handle, &mut out).await.unwrap();
        assert_eq!(summary.termination, Termination::Lost);
        assert_eq!(summary.termination.process_exit_code(), 1);
    }

    #[test]
    fn exit_codes_follow_shell_conventions() {
        assert_eq!(Termination::Exited(ExitOutcome::Code(0)).process_exit_code(), 0);
        assert_eq!(Termination::Exited(ExitOutcome::Signal(9)).process_exit_code(), 137);
        assert_eq!(Termination::Cancelled.process_exit_code(), 130);
    }
}
