// src/exec/runner.rs

//! Launch the external process and turn its lifecycle into events.

use std::fmt;
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::errors::{FrecklaunchError, Result};

const CHUNK_SIZE: usize = 8 * 1024;
const EVENT_BUFFER: usize = 64;

/// Which output stream a chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    fn event(self, chunk: Vec<u8>) -> RunEvent {
        match self {
            StreamKind::Stdout => RunEvent::Stdout(chunk),
            StreamKind::Stderr => RunEvent::Stderr(chunk),
        }
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => f.write_str("stdout"),
            StreamKind::Stderr => f.write_str("stderr"),
        }
    }
}

/// How the process ended on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    Code(i32),
    /// Killed by a signal (unix only).
    Signal(i32),
    /// The platform reported neither a code nor a signal, or waiting failed.
    Unknown,
}

impl ExitOutcome {
    pub fn success(&self) -> bool {
        matches!(self, ExitOutcome::Code(0))
    }
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return ExitOutcome::Code(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitOutcome::Signal(signal);
            }
        }
        ExitOutcome::Unknown
    }
}

/// Something that happened to a running process.
///
/// Per stream, chunks arrive in the order they were read. Exactly one of
/// `Exited` / `Cancelled` is sent, and it is always the last event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    Stdout(Vec<u8>),
    Stderr(Vec<u8>),
    Exited(ExitOutcome),
    Cancelled,
}

impl RunEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunEvent::Exited(_) | RunEvent::Cancelled)
    }
}

/// Requests that a running process be killed.
#[derive(Debug)]
pub struct Canceller {
    tx: oneshot::Sender<()>,
}

impl Canceller {
    /// Kill the process. Returns `false` if the run had already finished.
    pub fn cancel(self) -> bool {
        self.tx.send(()).is_ok()
    }
}

/// Handle to one launched process.
///
/// Dropping the handle does not stop the process; use [`RunHandle::cancel`]
/// or a [`Canceller`] for that.
#[derive(Debug)]
pub struct RunHandle {
    events: mpsc::Receiver<RunEvent>,
    cancel: Option<oneshot::Sender<()>>,
    pid: Option<u32>,
}

impl RunHandle {
    /// Assemble a handle from its channels. Backends other than the real
    /// process launcher use this to feed events of their own.
    pub fn new(
        events: mpsc::Receiver<RunEvent>,
        cancel: oneshot::Sender<()>,
        pid: Option<u32>,
    ) -> Self {
        Self {
            events,
            cancel: Some(cancel),
            pid,
        }
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Take the cancel side out of the handle, e.g. to move it into a
    /// signal handler. Only the first call returns `Some`.
    pub fn take_canceller(&mut self) -> Option<Canceller> {
        self.cancel.take().map(|tx| Canceller { tx })
    }

    /// Kill the process. Returns `false` if the canceller was already taken
    /// or the run had already finished.
    pub fn cancel(&mut self) -> bool {
        self.take_canceller().is_some_and(Canceller::cancel)
    }

    /// Next event, or `None` once the terminal event has been consumed.
    pub async fn next_event(&mut self) -> Option<RunEvent> {
        self.events.recv().await
    }

    /// Drain all events up to and including the terminal one.
    pub async fn collect(mut self) -> Vec<RunEvent> {
        let mut out = Vec::new();
        while let Some(event) = self.next_event().await {
            let done = event.is_terminal();
            out.push(event);
            if done {
                break;
            }
        }
        out
    }
}

/// Launch `program` with `payload` as its only argument.
///
/// No shell is involved, so nothing in the payload is interpreted. Fails with
/// [`FrecklaunchError::SpawnFailed`] if the program cannot be started, in
/// which case no events are ever produced.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_process(program: &str, payload: &str) -> Result<RunHandle> {
    info!(program, payload_bytes = payload.len(), "starting external process");

    let mut cmd = Command::new(program);
    cmd.arg(payload)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|source| {
        debug!(program, error = %source, "spawn failed");
        FrecklaunchError::SpawnFailed {
            program: program.to_string(),
            source,
        }
    })?;

    let pid = child.id();
    debug!(program, ?pid, "external process started");

    let (tx, rx) = mpsc::channel::<RunEvent>(EVENT_BUFFER);
    let (cancel_tx, cancel_rx) = oneshot::channel::<()>();

    let mut pumps = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        pumps.push(tokio::spawn(pump(stdout, StreamKind::Stdout, tx.clone())));
    }
    if let Some(stderr) = child.stderr.take() {
        pumps.push(tokio::spawn(pump(stderr, StreamKind::Stderr, tx.clone())));
    }

    tokio::spawn(supervise(child, pumps, tx, cancel_rx, program.to_string()));

    Ok(RunHandle::new(rx, cancel_tx, pid))
}

/// Forward raw chunks from one output stream until EOF.
///
/// If the receiver goes away we keep reading and discard, so the child
/// never blocks on a full pipe.
async fn pump<R>(mut reader: R, kind: StreamKind, tx: mpsc::Sender<RunEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut forwarding = true;

    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if forwarding && tx.send(kind.event(buf[..n].to_vec())).await.is_err() {
                    debug!(stream = %kind, "event receiver dropped; discarding output");
                    forwarding = false;
                }
            }
            Err(e) => {
                warn!(stream = %kind, error = %e, "error reading process output; closing stream");
                break;
            }
        }
    }

    debug!(stream = %kind, "output stream closed");
}

/// Own the child until it exits or is cancelled, then send the terminal
/// event after every chunk the pumps forwarded.
///
/// A cancel request is honoured until the terminal event is sent, including
/// while the pumps drain output a descendant of the child still writes.
async fn supervise(
    mut child: Child,
    mut pumps: Vec<JoinHandle<()>>,
    tx: mpsc::Sender<RunEvent>,
    mut cancel_rx: oneshot::Receiver<()>,
    program: String,
) {
    let mut cancel_open = true;

    let exited = tokio::select! {
        status = child.wait() => Some(exit_event(&program, status)),

        cancel = &mut cancel_rx => match cancel {
            Ok(()) => {
                info!(program = %program, "cancellation requested; killing process");
                if let Err(e) = child.kill().await {
                    warn!(program = %program, error = %e, "failed to kill process on cancellation");
                }
                None
            }
            Err(_) => {
                debug!(program = %program, "canceller dropped; waiting for process exit");
                cancel_open = false;
                Some(exit_event(&program, child.wait().await))
            }
        },
    };

    let terminal = match exited {
        None => cancel_pumps(&pumps),
        Some(event) if cancel_open => tokio::select! {
            _ = join_pumps(&mut pumps) => event,

            cancel = &mut cancel_rx => match cancel {
                Ok(()) => {
                    info!(
                        program = %program,
                        "cancellation requested after exit; dropping remaining output"
                    );
                    cancel_pumps(&pumps)
                }
                Err(_) => {
                    join_pumps(&mut pumps).await;
                    event
                }
            },
        },
        Some(event) => {
            join_pumps(&mut pumps).await;
            event
        }
    };

    if tx.send(terminal).await.is_err() {
        debug!(program = %program, "event receiver dropped before terminal event");
    }
}

async fn join_pumps(pumps: &mut [JoinHandle<()>]) {
    for pump in pumps.iter_mut() {
        let _ = pump.await;
    }
}

/// Descendants of the child may still hold the pipes open, so the pumps are
/// aborted rather than drained.
fn cancel_pumps(pumps: &[JoinHandle<()>]) -> RunEvent {
    for pump in pumps.iter() {
        pump.abort();
    }
    RunEvent::Cancelled
}

fn exit_event(program: &str, status: std::io::Result<ExitStatus>) -> RunEvent {
    match status {
        Ok(status) => {
            let outcome = ExitOutcome::from(status);
            info!(
                program,
                ?outcome,
                success = outcome.success(),
                "external process exited"
            );
            RunEvent::Exited(outcome)
        }
        Err(e) => {
            error!(program, error = %e, "waiting for external process failed");
            RunEvent::Exited(ExitOutcome::Unknown)
        }
    }
}
