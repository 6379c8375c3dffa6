use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info};

use crate::canvas::{self, SharedCanvas, SimulationHint};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(32);

type TickListener = Arc<dyn Fn() + Send + Sync>;

struct Worker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// Ticks the canvas simulation at a fixed cadence on a background thread.
///
/// `suspend` returns only after the worker has exited, so no tick can land
/// after it. `resume` catches up with one immediate tick before restarting.
pub struct SimulationScheduler {
    canvas: SharedCanvas,
    interval: Duration,
    on_tick: Option<TickListener>,
    worker: Option<Worker>,
}

impl SimulationScheduler {
    pub fn new(canvas: SharedCanvas, interval: Duration) -> Self {
        Self {
            canvas,
            interval,
            on_tick: None,
            worker: None,
        }
    }

    /// Called after every tick that changed the bubble set.
    pub fn with_listener(mut self, listener: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_tick = Some(Arc::new(listener));
        self
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    pub fn start(&mut self) {
        if self.worker.is_some() {
            return;
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let canvas = Arc::clone(&self.canvas);
        let interval = self.interval;
        let on_tick = self.on_tick.clone();

        let handle = thread::spawn(move || {
            loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let changed = canvas::lock(&canvas).scheduled_tick();
                        if changed && let Some(listener) = &on_tick {
                            listener();
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        info!(interval_ms = interval.as_millis() as u64, "simulation started");
        self.worker = Some(Worker { stop_tx, handle });
    }

    pub fn suspend(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        let _ = worker.stop_tx.send(());
        if worker.handle.join().is_err() {
            debug!("simulation worker panicked");
        }
        debug!("simulation suspended");
    }

    pub fn resume(&mut self) {
        let changed = canvas::lock(&self.canvas).tick();
        if changed && let Some(listener) = &self.on_tick {
            listener();
        }
        self.start();
    }

    pub fn apply(&mut self, hint: SimulationHint) {
        match hint {
            SimulationHint::Suspend => self.suspend(),
            SimulationHint::Resume => self.resume(),
        }
    }
}

impl Drop for SimulationScheduler {
    fn drop(&mut self) {
        self.suspend();
    }
}
