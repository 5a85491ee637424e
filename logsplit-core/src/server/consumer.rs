use crate::dispatch::{BatchReport, DispatchError, Dispatcher};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{error, info, warn};

/// Value of the control key that pauses consumption.
pub const PAUSED: &str = "0";

/// Result of one turn of the consumer loop.
#[derive(Debug, PartialEq, Eq)]
pub enum Tick {
    /// The control key holds the pause value; nothing was read.
    Paused,
    Polled(BatchReport),
    /// The source failed; the caller should wait before the next turn.
    Backoff,
}

/// Drives a registered [`Dispatcher`] until shutdown.
pub struct Consumer {
    dispatcher: Dispatcher,
    control_key: Option<String>,
    idle: Duration,
    paused: bool,
}

impl Consumer {
    pub fn new(dispatcher: Dispatcher, control_key: Option<String>, idle: Duration) -> Self {
        Self {
            dispatcher,
            control_key,
            idle,
            paused: false,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Check the control key, logging pause and resume transitions. A
    /// control key that cannot be read does not pause the loop.
    pub fn is_paused(&mut self) -> bool {
        let Some(key) = &self.control_key else {
            return false;
        };

        let paused = match self.dispatcher.store().read_flag(key) {
            Ok(value) => value.as_deref() == Some(PAUSED),
            Err(e) => {
                warn!(control_key = %key, error = %e, "failed to read control key");
                false
            }
        };

        if paused != self.paused {
            if paused {
                info!(control_key = %key, "consumer paused");
            } else {
                info!(control_key = %key, "consumer resumed");
            }
            self.paused = paused;
        }

        paused
    }

    /// Run one turn: honour the pause gate, poll, and ask for redelivery of
    /// failed entries once the source has nothing new.
    ///
    /// Source failures are logged and reported as [`Tick::Backoff`]; any
    /// other dispatch error means the dispatcher can no longer run and is
    /// returned.
    pub fn tick(&mut self) -> Result<Tick, DispatchError> {
        if self.is_paused() {
            return Ok(Tick::Paused);
        }

        match self.dispatcher.poll() {
            Ok(report) => {
                if report.is_empty() && self.dispatcher.outstanding() > 0 {
                    if let Err(e) = self.dispatcher.redeliver_failed() {
                        warn!(error = %e, "failed to request redelivery");
                    }
                }
                Ok(Tick::Polled(report))
            }
            Err(DispatchError::Source(e)) => {
                error!(error = %e, "reading from source failed; backing off");
                Ok(Tick::Backoff)
            }
            Err(e) => Err(e),
        }
    }

    /// Loop until `shutdown` is set.
    pub fn run(&mut self, shutdown: &AtomicBool) -> Result<(), DispatchError> {
        info!("consumer loop started");

        while !shutdown.load(Ordering::SeqCst) {
            match self.tick()? {
                Tick::Paused | Tick::Backoff => thread::sleep(self.idle),
                Tick::Polled(report) if report.failed > 0 => thread::sleep(self.idle),
                Tick::Polled(_) => {}
            }
        }

        info!("consumer loop stopped");
        Ok(())
    }
}
