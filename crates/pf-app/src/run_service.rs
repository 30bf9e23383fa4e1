//! Run execution service.
//!
//! Every run owns a dedicated worker thread holding its `Simulation`. The
//! handle talks to it over a command channel; each command carries its own
//! reply channel. Cancellation goes through a shared `CancelToken` and the
//! latest progress snapshot through a shared slot, so both work while the
//! worker is busy stepping.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use pf_project::RunParams;
use pf_results::{MeshSummary, ResultBundle, RunId, RunManifest, compute_run_id};
use pf_sim::{CancelToken, ProgressEvent, RunStatus, SimRecord, SimResult, Simulation};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::runtime_compile;

pub const SOLVER_VERSION: &str = env!("CARGO_PKG_VERSION");

enum Command {
    Step {
        reply: Sender<SimResult<ProgressEvent>>,
    },
    Run {
        progress: Option<Sender<ProgressEvent>>,
        reply: Sender<SimResult<RunStatus>>,
    },
    Cancel {
        reply: Sender<SimResult<()>>,
    },
    Finish {
        reply: Sender<SimRecord>,
    },
}

/// Handle to one run on its worker thread.
///
/// All methods take `&self`, so a handle can be shared with another thread
/// that cancels the run while this one waits for it.
#[derive(Debug)]
pub struct RunHandle {
    id: Uuid,
    manifest: RunManifest,
    commands: Sender<Command>,
    cancel: CancelToken,
    latest: Arc<Mutex<ProgressEvent>>,
    worker: Option<JoinHandle<()>>,
}

/// Validate and compile `params`, then start an idle run on a new worker.
pub fn start(params: &RunParams) -> AppResult<RunHandle> {
    let runtime = runtime_compile::compile_params(params)?;
    let sim = runtime.simulation()?;

    let id = Uuid::new_v4();
    let manifest = RunManifest {
        run_id: compute_run_id(params, SOLVER_VERSION),
        name: params.name.clone(),
        started_at: chrono::Utc::now().to_rfc3339(),
        finished_at: None,
        solver_version: SOLVER_VERSION.to_string(),
        mesh: MeshSummary {
            nr: params.mesh.nr,
            ntheta: params.mesh.ntheta,
            nz: params.mesh.nz,
            cells: runtime.mesh.len(),
        },
        dt_s: runtime.options.dt,
        total_time_s: runtime.options.total_time,
        steps: runtime.options.step_count(),
    };

    let cancel = CancelToken::new();
    let latest = Arc::new(Mutex::new(sim.progress()));
    let (tx, rx) = mpsc::channel();
    let worker = {
        let cancel = cancel.clone();
        let latest = latest.clone();
        thread::Builder::new()
            .name(format!("pf-run-{}", &id.simple().to_string()[..8]))
            .spawn(move || worker_loop(sim, rx, cancel, latest))
    }
        .map_err(|e| AppError::Compile(format!("failed to spawn run worker: {e}")))?;

    info!(
        handle = %id,
        run_id = %manifest.run_id,
        cells = manifest.mesh.cells,
        steps = manifest.steps,
        "run worker started"
    );

    Ok(RunHandle {
        id,
        manifest,
        commands: tx,
        cancel,
        latest,
        worker: Some(worker),
    })
}

fn worker_loop(
    mut sim: Simulation,
    commands: Receiver<Command>,
    cancel: CancelToken,
    latest: Arc<Mutex<ProgressEvent>>,
) {
    let publish = |event: ProgressEvent| {
        *latest.lock().unwrap_or_else(PoisonError::into_inner) = event;
    };
    // Replies go to callers that may have given up waiting; send errors are
    // ignored.
    while let Ok(command) = commands.recv() {
        match command {
            Command::Step { reply } => {
                let outcome = sim.advance_one_step();
                publish(sim.progress());
                let _ = reply.send(outcome);
            }
            Command::Run { progress, reply } => {
                let outcome = sim.run_to_completion(&cancel, |event| {
                    publish(event.clone());
                    if let Some(tx) = &progress {
                        let _ = tx.send(event.clone());
                    }
                });
                publish(sim.progress());
                let _ = reply.send(outcome);
            }
            Command::Cancel { reply } => {
                let outcome = sim.cancel();
                publish(sim.progress());
                let _ = reply.send(outcome);
            }
            Command::Finish { reply } => {
                let _ = reply.send(sim.into_results());
                return;
            }
        }
    }
    debug!("run worker channel closed");
}

impl RunHandle {
    /// Identifier of this handle; distinct for every started run.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Content hash of the parameters and solver version.
    pub fn run_id(&self) -> &RunId {
        &self.manifest.run_id
    }

    pub fn manifest(&self) -> &RunManifest {
        &self.manifest
    }

    /// Advance the run by one step, waiting for the step to finish.
    pub fn advance_one_step(&self) -> AppResult<ProgressEvent> {
        let (reply, rx) = mpsc::channel();
        self.send(Command::Step { reply })?;
        Ok(self.receive(rx)??)
    }

    /// Step until the run is terminal or cancelled. Returns the final status.
    pub fn run_to_completion(&self) -> AppResult<RunStatus> {
        let (reply, rx) = mpsc::channel();
        self.send(Command::Run {
            progress: None,
            reply,
        })?;
        Ok(self.receive(rx)??)
    }

    /// Like [`RunHandle::run_to_completion`], calling `on_progress` on this
    /// thread for every step the worker reports.
    pub fn run_with_progress(
        &self,
        mut on_progress: impl FnMut(&ProgressEvent),
    ) -> AppResult<RunStatus> {
        let (reply, rx) = mpsc::channel();
        let (progress, events) = mpsc::channel();
        self.send(Command::Run {
            progress: Some(progress),
            reply,
        })?;
        // The worker drops its progress sender once the run returns.
        for event in events {
            on_progress(&event);
        }
        Ok(self.receive(rx)??)
    }

    /// Request cancellation. A busy run stops at its next step boundary; an
    /// idle one is cancelled immediately. Cancelling a cancelled run is a
    /// no-op; a completed or failed run rejects it.
    pub fn cancel(&self) -> AppResult<()> {
        self.cancel.cancel();
        let (reply, rx) = mpsc::channel();
        self.send(Command::Cancel { reply })?;
        Ok(self.receive(rx)??)
    }

    /// Latest progress snapshot. Never waits for a step in progress.
    pub fn progress(&self) -> ProgressEvent {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Consume the handle and collect the recorded frames, metrics and
    /// warnings. A run that is still idle or running keeps its status.
    pub fn results(mut self) -> AppResult<ResultBundle> {
        let (reply, rx) = mpsc::channel();
        self.send(Command::Finish { reply })?;
        let record = self.receive(rx)?;
        if let Some(worker) = self.worker.take() {
            worker.join().map_err(|_| self.worker_gone())?;
        }

        let mut manifest = self.manifest.clone();
        manifest.finished_at = Some(chrono::Utc::now().to_rfc3339());
        info!(
            handle = %self.id,
            status = %record.status,
            frames = record.times.len(),
            "run results collected"
        );
        Ok(ResultBundle::from_record(manifest, record))
    }

    fn send(&self, command: Command) -> AppResult<()> {
        self.commands.send(command).map_err(|_| self.worker_gone())
    }

    fn receive<T>(&self, rx: Receiver<T>) -> AppResult<T> {
        rx.recv().map_err(|_| self.worker_gone())
    }

    fn worker_gone(&self) -> AppError {
        AppError::WorkerGone {
            run: self.id.to_string(),
        }
    }
}

impl Drop for RunHandle {
    fn drop(&mut self) {
        // Stops a run in progress; the worker exits once the channel closes.
        if self.worker.is_some() {
            self.cancel.cancel();
        }
    }
}
