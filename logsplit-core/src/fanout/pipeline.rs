use crate::event::Event;
use crate::fanout::{AggregateRecorder, ArchiveWriter, FanoutStep, SeverityRouter, StepFailure};
use crate::store::LogStore;
use std::sync::Arc;

/// Ordered list of fan-out steps, run to completion or first failure.
pub struct FanoutPipeline {
    steps: Vec<Arc<dyn FanoutStep>>,
}

impl FanoutPipeline {
    pub fn new(steps: Vec<Arc<dyn FanoutStep>>) -> Self {
        Self { steps }
    }

    /// Router, recorder, archive: the fixed production order.
    pub fn standard(max_stream_len: u64, archive: ArchiveWriter) -> Self {
        Self::new(vec![
            Arc::new(SeverityRouter::new(max_stream_len)),
            Arc::new(AggregateRecorder),
            Arc::new(archive),
        ])
    }

    #[cfg(test)]
    pub(crate) fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn run(&self, store: &dyn LogStore, event: &Event) -> Result<(), StepFailure> {
        let mut committed = Vec::with_capacity(self.steps.len());

        for step in &self.steps {
            match step.apply(store, event) {
                Ok(()) => committed.push(step.name()),
                Err(error) => return Err(StepFailure { committed, error }),
            }
        }

        Ok(())
    }
}
