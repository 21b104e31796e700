// src/acquisition/stage.rs
//! Interrupt-released producer stage
//!
//! Released once per sample-clock tick, the stage reads exactly one sample
//! from the acquisition capability and pushes it into the ring buffer. The
//! downstream signal fires unconditionally, even when the read failed: the
//! pipeline never stalls on a single bad sample, a failed read is simply not
//! enqueued. Throughput is prioritized over completeness.

use crate::hal::traits::SampleSource;
use crate::pipeline::context::PipelineContext;
use std::sync::Arc;
use tracing::{debug, warn};

/// Producer stage feeding the raw sample ring buffer
pub struct AcquisitionStage {
    source: Box<dyn SampleSource>,
}

impl AcquisitionStage {
    /// Create the stage around an acquisition capability
    pub fn new(source: Box<dyn SampleSource>) -> Self {
        Self { source }
    }

    /// Perform one tick of work: read, enqueue on success, always signal
    ///
    /// Returns whether a sample was enqueued.
    pub fn acquire_once(&mut self, ctx: &PipelineContext) -> bool {
        let enqueued = match self.source.read_sample() {
            Ok(sample) => {
                ctx.sample_buffer.lock().push(sample);
                true
            }
            Err(err) => {
                ctx.count_dropped_read();
                warn!(error = %err, "sample read failed, skipping");
                false
            }
        };

        // Downstream wake-up is tick-driven, not success-driven.
        ctx.signals.preprocessing.raise();
        enqueued
    }

    /// Stage loop: block on the sample-clock signal, acquire, repeat
    pub fn run(mut self, ctx: Arc<PipelineContext>) {
        debug!("acquisition stage entering loop");
        loop {
            ctx.signals.sample_ready.wait();
            if ctx.shutdown.is_set() {
                break;
            }
            self.acquire_once(&ctx);
        }
        debug!("acquisition stage exited");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SystemConfig;
    use crate::hal::simulator::{FlakySampleSource, SineSampleSource};
    use crate::utils::time::MockTimeProvider;

    fn context() -> PipelineContext {
        PipelineContext::new(
            SystemConfig::default(),
            Arc::new(MockTimeProvider::new(0)),
        )
    }

    #[test]
    fn test_acquire_once_enqueues_and_signals() {
        let ctx = context();
        let mut stage = AcquisitionStage::new(Box::new(SineSampleSource::new(500)));

        assert!(stage.acquire_once(&ctx));
        assert_eq!(ctx.sample_buffer.lock().len(), 1);
        assert!(ctx.signals.preprocessing.try_consume());
    }

    #[test]
    fn test_failed_read_still_signals() {
        let ctx = context();
        // fail_every = 1: every read fails
        let mut stage = AcquisitionStage::new(Box::new(FlakySampleSource::new(
            SineSampleSource::new(500),
            1,
        )));

        assert!(!stage.acquire_once(&ctx));
        assert_eq!(ctx.sample_buffer.lock().len(), 0);
        assert_eq!(ctx.dropped_reads(), 1);
        // The downstream signal fires regardless of the read outcome.
        assert!(ctx.signals.preprocessing.try_consume());
    }

    #[test]
    fn test_signal_does_not_queue() {
        let ctx = context();
        let mut stage = AcquisitionStage::new(Box::new(SineSampleSource::new(500)));

        stage.acquire_once(&ctx);
        stage.acquire_once(&ctx);

        // Two raises collapse into a single pending wake.
        assert!(ctx.signals.preprocessing.try_consume());
        assert!(!ctx.signals.preprocessing.try_consume());
    }
}
