//! Background execution of pipeline runs.
//!
//! Each job runs the whole pipeline sequentially on one pool thread; jobs
//! share nothing mutable, so several can run at once.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc;
use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, error};

use crate::error::{panic_message, PanoramaError, Result};
use crate::io::OutputArtifact;
use crate::pipeline::config::PanoramaConfig;
use crate::pipeline::{run_pipeline_with, InputSource, NoOpReporter, ProgressReporter};
use crate::stitch::{create_compositors, Compositor};

/// One pipeline invocation, owned by the worker once submitted.
pub struct PanoramaJob {
    pub inputs: InputSource,
    pub config: PanoramaConfig,
    pub compositors: Vec<Arc<dyn Compositor>>,
    pub reporter: Arc<dyn ProgressReporter>,
}

impl PanoramaJob {
    /// Job using the built-in compositors for the configured strategies.
    pub fn new(inputs: InputSource, config: PanoramaConfig) -> Self {
        let compositors = create_compositors(&config.stitching.strategies);
        Self {
            inputs,
            config,
            compositors,
            reporter: Arc::new(NoOpReporter),
        }
    }

    pub fn with_compositors(mut self, compositors: Vec<Arc<dyn Compositor>>) -> Self {
        self.compositors = compositors;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    fn run(self) -> Result<OutputArtifact> {
        run_pipeline_with(self.inputs, &self.config, &self.compositors, self.reporter)
    }
}

/// Pool of named threads that pipeline jobs run on.
pub struct PanoramaWorker {
    pool: ThreadPool,
}

impl PanoramaWorker {
    /// `num_threads == 0` lets rayon pick one thread per core.
    pub fn new(num_threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("panorama-worker-{i}"))
            .build()
            .map_err(|e| PanoramaError::Config(format!("cannot start worker pool: {e}")))?;
        Ok(Self { pool })
    }

    pub fn num_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Queue a job and return immediately. The receiver yields exactly one
    /// result once the job finishes; a panicking job yields `Internal`.
    pub fn submit(&self, job: PanoramaJob) -> mpsc::Receiver<Result<OutputArtifact>> {
        let (tx, rx) = mpsc::channel();
        debug!(inputs = job.inputs.len(), "Submitting panorama job");
        self.pool.spawn(move || {
            let result = catch_unwind(AssertUnwindSafe(|| job.run())).unwrap_or_else(|payload| {
                let message = panic_message(payload.as_ref());
                error!(%message, "Panorama job panicked");
                Err(PanoramaError::Internal(format!("job panicked: {message}")))
            });
            let _ = tx.send(result);
        });
        rx
    }
}
