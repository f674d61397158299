use crate::{Config, Handle, MetricsSnapshot, Mode, Queue, QueueError};

/// Request/response channel between one orchestrator and a pool of workers.
///
/// `inputs` is MCSP (the orchestrator produces, workers race to consume);
/// `outputs` is SCMP (workers produce, the orchestrator consumes). The two
/// queues share nothing, so every queue invariant holds for each of them
/// independently.
///
/// The orchestrator registers itself as the sole input producer in
/// [`reset`](Self::reset) and registers each worker as an output producer
/// with [`add_worker`](Self::add_worker) before the worker starts.
#[derive(Debug)]
pub struct Duplex<I = u64, O = u64> {
    inputs: Queue<I>,
    outputs: Queue<O>,
}

impl<I: Handle, O: Handle> Duplex<I, O> {
    /// Creates a channel whose queues both use `config`, already reset.
    pub fn new(config: Config) -> Self {
        Self::with_configs(config, config)
    }

    /// Creates a channel with separate input and output configurations.
    ///
    /// The calling thread becomes the orchestrator.
    pub fn with_configs(inputs: Config, outputs: Config) -> Self {
        let mut duplex = Self {
            inputs: Queue::new(inputs, Mode::Mcsp),
            outputs: Queue::new(outputs, Mode::Scmp),
        };
        duplex.reset();
        duplex
    }

    /// Resets both queues and registers the orchestrator as input producer.
    pub fn reset(&mut self) {
        self.inputs.reset();
        self.outputs.reset();
        self.inputs.add_producer();

        log::debug!(
            "phasering: duplex reset (inputs={}, outputs={})",
            self.inputs.capacity(),
            self.outputs.capacity()
        );
    }

    // ---------------------------------------------------------------------
    // ORCHESTRATOR API
    // ---------------------------------------------------------------------

    /// Sends a work item to the pool. `false` means retry.
    #[inline]
    pub fn push_input(&self, value: I) -> bool {
        self.inputs.push(value)
    }

    /// Collects a result from the pool, if one is ready.
    #[inline]
    pub fn pop_output(&self) -> Option<O> {
        self.outputs.pop()
    }

    /// Registers a worker as an output producer. Call before it starts.
    ///
    /// Panics when the output queue has no admission slack left.
    pub fn add_worker(&self) {
        self.outputs.add_producer();
    }

    /// Fallible form of [`add_worker`](Self::add_worker).
    pub fn try_add_worker(&self) -> Result<(), QueueError> {
        self.outputs.try_add_producer()
    }

    /// Deregisters a worker. Call after it stops.
    pub fn remove_worker(&self) {
        self.outputs.remove_producer();
    }

    /// Fallible form of [`remove_worker`](Self::remove_worker).
    pub fn try_remove_worker(&self) -> Result<(), QueueError> {
        self.outputs.try_remove_producer()
    }

    // ---------------------------------------------------------------------
    // WORKER API
    // ---------------------------------------------------------------------

    /// Takes the next work item, if one is ready and this worker wins it.
    #[inline]
    pub fn pop_input(&self) -> Option<I> {
        self.inputs.pop()
    }

    /// Returns a result to the orchestrator. `false` means retry.
    #[inline]
    pub fn push_output(&self, value: O) -> bool {
        self.outputs.push(value)
    }

    // ---------------------------------------------------------------------
    // STATUS
    // ---------------------------------------------------------------------

    /// The MCSP work queue.
    pub fn inputs(&self) -> &Queue<I> {
        &self.inputs
    }

    /// The SCMP result queue.
    pub fn outputs(&self) -> &Queue<O> {
        &self.outputs
    }

    /// Number of registered workers.
    pub fn worker_count(&self) -> usize {
        self.outputs.producer_count()
    }

    /// Counter snapshots as `(inputs, outputs)`.
    pub fn metrics(&self) -> (MetricsSnapshot, MetricsSnapshot) {
        (self.inputs.metrics(), self.outputs.metrics())
    }
}
