// Background worker for the generation pipeline.
//
// Generation is CPU-bound and takes seconds, so interactive callers run it
// off their own thread. `spawn_generation` starts exactly one named worker
// thread that executes `pipeline::generate_level_with_cancel` to completion
// and sends the single result over an `mpsc` channel. The returned
// `GenerationHandle` can poll (`try_result`), block (`wait`), or request
// cancellation (`cancel`). Cancellation is coarse: the GA checks the flag at
// generation boundaries and returns its current population, ranked, with
// `TerminationReason::Cancelled`.
//
// If the worker dies without sending (a panic inside the pipeline), the
// handle reports `GenerationError::WorkerLost`.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use tracing::debug;

use crate::config::Constraints;
use crate::error::GenerationError;
use crate::pipeline::{GeneratedLevel, generate_level_with_cancel};
use crate::weather::WeatherSample;

type Outcome = Result<GeneratedLevel, GenerationError>;

/// Handle to a running generation.
pub struct GenerationHandle {
    cancel: Arc<AtomicBool>,
    result: Receiver<Outcome>,
    thread: Option<thread::JoinHandle<()>>,
}

impl GenerationHandle {
    /// Ask the worker to stop at the next generation boundary.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    /// Non-blocking poll. `None` while the worker is still running. The
    /// result is delivered once; polling again afterwards reports
    /// `WorkerLost`.
    pub fn try_result(&mut self) -> Option<Outcome> {
        match self.result.try_recv() {
            Ok(outcome) => {
                self.join();
                Some(outcome)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.join();
                Some(Err(GenerationError::WorkerLost))
            }
        }
    }

    /// Block until the worker finishes.
    pub fn wait(mut self) -> Outcome {
        let outcome = self
            .result
            .recv()
            .unwrap_or(Err(GenerationError::WorkerLost));
        self.join();
        outcome
    }

    fn join(&mut self) {
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

/// Start the pipeline on a background thread.
pub fn spawn_generation(
    constraints: Constraints,
    weather: Option<WeatherSample>,
) -> io::Result<GenerationHandle> {
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_clone = cancel.clone();
    let (tx, rx) = mpsc::channel();

    let thread = thread::Builder::new()
        .name("tidemark-generation".into())
        .spawn(move || {
            let outcome =
                generate_level_with_cancel(&constraints, weather.as_ref(), Some(cancel_clone));
            if tx.send(outcome).is_err() {
                debug!(target: "tidemark::worker", "result dropped: handle already gone");
            }
        })?;

    Ok(GenerationHandle {
        cancel,
        result: rx,
        thread: Some(thread),
    })
}
