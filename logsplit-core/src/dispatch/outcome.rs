use crate::event::DecodeError;
use crate::fanout::StepFailure;

/// What happened to one delivered entry.
#[derive(Debug)]
pub enum EventOutcome {
    /// All fan-out steps completed.
    Processed,
    /// This consumer already fanned the entry out.
    Duplicate,
    /// Body trimmed from the source log before it could be read.
    Trimmed,
    /// Could not be decoded; dropped.
    Rejected(DecodeError),
    /// A fan-out step failed; earlier steps' writes remain.
    Failed(StepFailure),
}

impl EventOutcome {
    /// Failed entries are left pending for redelivery; all others are done.
    pub fn acknowledge(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Tally of one [`poll`](crate::dispatch::Dispatcher::poll).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub delivered: usize,
    pub processed: usize,
    pub duplicates: usize,
    pub trimmed: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl BatchReport {
    pub(crate) fn record(&mut self, outcome: &EventOutcome) {
        match outcome {
            EventOutcome::Processed => self.processed += 1,
            EventOutcome::Duplicate => self.duplicates += 1,
            EventOutcome::Trimmed => self.trimmed += 1,
            EventOutcome::Rejected(_) => self.rejected += 1,
            EventOutcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.delivered == 0
    }
}
