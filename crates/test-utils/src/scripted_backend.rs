use std::io;
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, oneshot};
use frecklaunch::errors::{FrecklaunchError, Result};
use frecklaunch::exec::{ProcessBackend, RunEvent, RunHandle};

/// One recorded call to [`ProcessBackend::launch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    pub program: String,
    pub payload: String,
}

/// A fake backend that:
/// - records every launch (program + payload)
/// - replays a fixed list of events for each launch, or
/// - fails to spawn, like a missing executable would.
pub struct ScriptedBackend {
    events: Vec<RunEvent>,
    fail_spawn: bool,
    launches: Arc<Mutex<Vec<Launch>>>,
}

impl ScriptedBackend {
    pub fn new(events: Vec<RunEvent>) -> Self {
        Self {
            events,
            fail_spawn: false,
            launches: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_spawn: true,
            ..Self::new(Vec::new())
        }
    }

    pub fn launches(&self) -> Arc<Mutex<Vec<Launch>>> {
        Arc::clone(&self.launches)
    }
}

impl ProcessBackend for ScriptedBackend {
    fn launch(&mut self, program: &str, payload: &str) -> Result<RunHandle> {
        {
            let mut guard = self.launches.lock().unwrap();
            guard.push(Launch {
                program: program.to_string(),
                payload: payload.to_string(),
            });
        }

        if self.fail_spawn {
            return Err(FrecklaunchError::SpawnFailed {
                program: program.to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "scripted spawn failure"),
            });
        }

        let (tx, rx) = mpsc::channel(16);
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();
        let events = self.events.clone();

        tokio::spawn(async move {
            let mut cancel_rx = cancel_rx;
            for event in events {
                if cancel_rx.try_recv().is_ok() {
                    let _ = tx.send(RunEvent::Cancelled).await;
                    return;
                }
                if tx.send(event).await.is_err() {
                    return;
                }
            }
        });

        Ok(RunHandle::new(rx, cancel_tx, None))
    }
}
