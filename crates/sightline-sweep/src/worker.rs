//! Background sweep worker. Hosts the progressive scheduler on its own thread.
//!
//! Commands arrive via `mpsc` channel. Between batches the thread waits on
//! that channel for `batch_delay`, so a new start or a cancel is picked up at
//! the next batch boundary. Start requests are debounced: a burst of restarts
//! (marker drags, pans, zooms) only launches the last one.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use tracing::debug;

use sightline_core::config::SweepConfig;
use sightline_terrain::provider::ElevationProvider;

use crate::scheduler::{ProgressiveScheduler, SweepPlan};
use crate::update::{SweepState, VisibilitySink, VisibilityUpdate};

/// Commands sent from the host to the worker thread.
#[derive(Debug)]
pub enum SweepCommand {
    /// Start (or restart) a progressive sweep after the debounce period.
    Start(SweepPlan),
    /// Cancel the pending or running sweep.
    Cancel,
    /// Shut down the worker thread.
    Shutdown,
}

/// Handle to a running worker. Dropping it shuts the thread down.
pub struct SweepWorker {
    command_tx: mpsc::Sender<SweepCommand>,
    latest: Arc<Mutex<Option<VisibilityUpdate>>>,
    thread: Option<JoinHandle<()>>,
}

/// Spawn the worker thread. Updates are delivered on the returned receiver.
pub fn spawn_sweep_worker<P>(
    provider: P,
    config: &SweepConfig,
) -> io::Result<(SweepWorker, mpsc::Receiver<VisibilityUpdate>)>
where
    P: ElevationProvider + Send + 'static,
{
    let (command_tx, command_rx) = mpsc::channel::<SweepCommand>();
    let (update_tx, update_rx) = mpsc::channel::<VisibilityUpdate>();
    let latest = Arc::new(Mutex::new(None));

    let scheduler = ProgressiveScheduler::new(config.seed);
    let debounce = config.restart_debounce();
    let thread_latest = Arc::clone(&latest);

    let thread = std::thread::Builder::new()
        .name("sightline-sweep".into())
        .spawn(move || {
            let mut host = WorkerLoop {
                scheduler,
                debounce,
                pending: None,
                sink: update_tx,
                latest: thread_latest,
            };
            host.run(&provider, command_rx);
        })?;

    Ok((
        SweepWorker {
            command_tx,
            latest,
            thread: Some(thread),
        },
        update_rx,
    ))
}

impl SweepWorker {
    /// Request a (debounced) fresh sweep. Returns false if the worker is gone.
    pub fn start(&self, plan: SweepPlan) -> bool {
        self.command_tx.send(SweepCommand::Start(plan)).is_ok()
    }

    pub fn cancel(&self) -> bool {
        self.command_tx.send(SweepCommand::Cancel).is_ok()
    }

    /// Most recent update published by the worker.
    pub fn latest(&self) -> Option<VisibilityUpdate> {
        self.latest.lock().ok().and_then(|guard| guard.clone())
    }

    /// Stop the thread and wait for it to exit.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        let _ = self.command_tx.send(SweepCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for SweepWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

struct WorkerLoop {
    scheduler: ProgressiveScheduler,
    debounce: Duration,
    /// Start request waiting out its debounce period.
    pending: Option<(Instant, SweepPlan)>,
    sink: mpsc::Sender<VisibilityUpdate>,
    latest: Arc<Mutex<Option<VisibilityUpdate>>>,
}

impl WorkerLoop {
    /// Runs until Shutdown command or channel disconnect.
    fn run<P>(&mut self, provider: &P, command_rx: mpsc::Receiver<SweepCommand>)
    where
        P: ElevationProvider + ?Sized,
    {
        loop {
            // 1. Launch a debounced start once its quiet period is over
            if let Some((due, plan)) = self.pending {
                if Instant::now() >= due {
                    self.pending = None;
                    self.scheduler.start(plan);
                }
            }

            // 2. One batch, then publish the whole accumulated set
            if self.scheduler.state() == SweepState::Running {
                self.scheduler.run_batch(provider);
                let update = self.scheduler.update();
                self.publish(update);
            }

            // 3. Wait for the next command, at most until the next batch is due
            let command = match self.wait_budget() {
                Some(timeout) => match command_rx.recv_timeout(timeout) {
                    Ok(command) => Some(command),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => return,
                },
                None => match command_rx.recv() {
                    Ok(command) => Some(command),
                    Err(_) => return,
                },
            };

            // 4. Apply it plus anything else already queued
            let mut next = command;
            while let Some(command) = next {
                if !self.apply(command) {
                    return;
                }
                next = command_rx.try_recv().ok();
            }
        }
    }

    /// How long to wait for commands; None means block until one arrives.
    fn wait_budget(&self) -> Option<Duration> {
        if self.scheduler.state() == SweepState::Running {
            let delay = self
                .scheduler
                .plan()
                .map_or(Duration::ZERO, |plan| plan.batch_delay);
            return Some(delay);
        }
        self.pending
            .map(|(due, _)| due.saturating_duration_since(Instant::now()))
    }

    /// Returns false on shutdown.
    fn apply(&mut self, command: SweepCommand) -> bool {
        match command {
            SweepCommand::Start(plan) => {
                // The old picture is invalid as soon as a restart is requested
                if self.scheduler.cancel() {
                    let update = self.scheduler.update();
                    self.publish(update);
                }
                debug!(debounce_ms = self.debounce.as_millis() as u64, "sweep start queued");
                self.pending = Some((Instant::now() + self.debounce, plan));
            }
            SweepCommand::Cancel => {
                self.pending = None;
                if self.scheduler.cancel() {
                    let update = self.scheduler.update();
                    self.publish(update);
                }
            }
            SweepCommand::Shutdown => return false,
        }
        true
    }

    /// Latest slot first, so a receiver that sees the update can also read it back.
    fn publish(&mut self, update: VisibilityUpdate) {
        if let Ok(mut lock) = self.latest.lock() {
            *lock = Some(update.clone());
        }
        self.sink.on_visibility_update(&update);
    }
}
